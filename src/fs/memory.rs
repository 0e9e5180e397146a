use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use super::{AttributeChange, DirEntryInfo, FileSystem};
use crate::error::IconError;

/// Attribute flags tracked per node by [`MemoryFs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    pub hidden: bool,
    pub system: bool,
    pub read_only: bool,
}

impl Attributes {
    fn apply(&mut self, change: AttributeChange) {
        if let Some(v) = change.hidden {
            self.hidden = v;
        }
        if let Some(v) = change.system {
            self.system = v;
        }
        if let Some(v) = change.read_only {
            self.read_only = v;
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    attributes: Attributes,
}

#[derive(Debug)]
struct State {
    cwd: PathBuf,
    nodes: BTreeMap<PathBuf, Node>,
    short_paths: HashMap<PathBuf, PathBuf>,
    denied_attributes: HashSet<PathBuf>,
}

/// An in-memory directory tree implementing [`FileSystem`].
///
/// Clones share the same tree, so a test can hand one clone to the pipeline and
/// keep another to inspect the result. Listings are sorted by name. Like
/// Windows, writing over or copying onto a hidden or system file is refused,
/// and read-only files cannot be deleted.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    state: Rc<RefCell<State>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let root = PathBuf::from(std::path::MAIN_SEPARATOR_STR);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root.clone(),
            Node {
                kind: NodeKind::Dir,
                attributes: Attributes::default(),
            },
        );
        Self {
            state: Rc::new(RefCell::new(State {
                cwd: root,
                nodes,
                short_paths: HashMap::new(),
                denied_attributes: HashSet::new(),
            })),
        }
    }

    /// Set the directory relative paths are resolved against. It is created if missing.
    pub fn set_current_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize(path.as_ref());
        self.add_dir(&path);
        self.state.borrow_mut().cwd = path;
    }

    /// Create a directory and any missing ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize(path.as_ref());
        let mut state = self.state.borrow_mut();
        for ancestor in path.ancestors() {
            state.nodes.entry(ancestor.to_path_buf()).or_insert(Node {
                kind: NodeKind::Dir,
                attributes: Attributes::default(),
            });
        }
    }

    /// Create or replace a file, creating missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = self.normalize(path.as_ref());
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.state.borrow_mut().nodes.insert(
            path,
            Node {
                kind: NodeKind::File(contents.into()),
                attributes: Attributes::default(),
            },
        );
    }

    /// File contents, or `None` for missing paths and directories.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = self.normalize(path.as_ref());
        match &self.state.borrow().nodes.get(&path)?.kind {
            NodeKind::File(bytes) => Some(bytes.clone()),
            NodeKind::Dir => None,
        }
    }

    pub fn attributes(&self, path: impl AsRef<Path>) -> Option<Attributes> {
        let path = self.normalize(path.as_ref());
        self.state.borrow().nodes.get(&path).map(|n| n.attributes)
    }

    /// Register the short form returned by [`FileSystem::short_path`] for `long`.
    pub fn set_short_path(&self, long: impl AsRef<Path>, short: impl Into<PathBuf>) {
        let long = self.normalize(long.as_ref());
        self.state.borrow_mut().short_paths.insert(long, short.into());
    }

    /// Make every attribute change on `path` fail.
    pub fn deny_attributes(&self, path: impl AsRef<Path>) {
        let path = self.normalize(path.as_ref());
        self.state.borrow_mut().denied_attributes.insert(path);
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        let joined = if path.has_root() {
            path.to_path_buf()
        } else {
            self.state.borrow().cwd.join(path)
        };
        let mut out = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                Component::Normal(name) => out.push(name),
            }
        }
        out
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )
    }

    fn check_writable_target(state: &State, path: &Path) -> io::Result<()> {
        match state.nodes.get(path) {
            Some(Node {
                kind: NodeKind::Dir,
                ..
            }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            )),
            Some(node) if node.attributes.hidden || node.attributes.system => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is hidden or system", path.display()),
            )),
            _ => match path.parent().and_then(|p| state.nodes.get(p)) {
                Some(Node {
                    kind: NodeKind::Dir,
                    ..
                }) => Ok(()),
                _ => Err(Self::not_found(path.parent().unwrap_or(path))),
            },
        }
    }
}

impl FileSystem for MemoryFs {
    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.normalize(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize(path);
        self.state.borrow().nodes.contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize(path);
        matches!(
            self.state.borrow().nodes.get(&path),
            Some(Node {
                kind: NodeKind::Dir,
                ..
            })
        )
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let path = self.normalize(path);
        if !self.is_dir(&path) {
            return Err(Self::not_found(&path));
        }
        let state = self.state.borrow();
        Ok(state
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path.as_path()))
            .map(|(p, node)| DirEntryInfo {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir: matches!(node.kind, NodeKind::Dir),
            })
            .collect())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.contents(path).ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let path = self.normalize(path);
        let mut state = self.state.borrow_mut();
        Self::check_writable_target(&state, &path)?;
        let attributes = state
            .nodes
            .get(&path)
            .map(|n| n.attributes)
            .unwrap_or_default();
        state.nodes.insert(
            path,
            Node {
                kind: NodeKind::File(contents.to_vec()),
                attributes,
            },
        );
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let bytes = self.read(from)?;
        self.write(to, &bytes)
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        let a = self.normalize(a);
        a == self.normalize(b) && self.state.borrow().nodes.contains_key(&a)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let path = self.normalize(path);
        let mut state = self.state.borrow_mut();
        let read_only = match state.nodes.get(&path) {
            Some(Node {
                kind: NodeKind::File(_),
                attributes,
            }) => attributes.read_only,
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("{} is a directory", path.display()),
                ));
            }
            None => return Err(Self::not_found(&path)),
        };
        if read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        state.nodes.remove(&path);
        Ok(())
    }

    fn set_attributes(&self, path: &Path, change: AttributeChange) -> Result<(), IconError> {
        let path = self.normalize(path);
        let mut state = self.state.borrow_mut();
        let denied = state.denied_attributes.contains(&path);
        let attribute_error = |reason: &str| IconError::Attribute {
            path: path.clone(),
            flags: change.describe(),
            reason: reason.to_string(),
        };
        if denied {
            return Err(attribute_error("access denied"));
        }
        match state.nodes.get_mut(&path) {
            Some(node) => {
                node.attributes.apply(change);
                Ok(())
            }
            None => Err(attribute_error("file not found")),
        }
    }

    fn short_path(&self, path: &Path) -> Option<PathBuf> {
        let path = self.normalize(path);
        self.state.borrow().short_paths.get(&path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_creates_parents() {
        let fs = MemoryFs::new();
        fs.add_file("/root/b/c/folder.png", b"png".to_vec());

        assert!(fs.is_dir(Path::new("/root")));
        assert!(fs.is_dir(Path::new("/root/b/c")));
        assert!(!fs.is_dir(Path::new("/root/b/c/folder.png")));
        assert_eq!(fs.contents("/root/b/c/folder.png").unwrap(), b"png");
    }

    #[test]
    fn relative_paths_resolve_against_current_dir() {
        let fs = MemoryFs::new();
        fs.set_current_dir("/work");
        fs.add_dir("photos");

        assert!(fs.is_dir(Path::new("/work/photos")));
        assert_eq!(
            fs.absolute(Path::new("photos/../photos/./x")).unwrap(),
            PathBuf::from("/work/photos/x")
        );
    }

    #[test]
    fn list_dir_returns_only_immediate_children_sorted() {
        let fs = MemoryFs::new();
        fs.add_dir("/root/b/c");
        fs.add_dir("/root/a");
        fs.add_file("/root/folder.png", b"x".to_vec());

        let names: Vec<String> = fs
            .list_dir(Path::new("/root"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "folder.png"]);
    }

    #[test]
    fn hidden_files_refuse_overwrite() {
        let fs = MemoryFs::new();
        fs.add_file("/d/desktop.ini", b"old".to_vec());
        fs.set_attributes(Path::new("/d/desktop.ini"), AttributeChange::HIDE_AS_SYSTEM)
            .unwrap();

        let err = fs.write(Path::new("/d/desktop.ini"), b"new").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        fs.set_attributes(Path::new("/d/desktop.ini"), AttributeChange::UNHIDE_SYSTEM)
            .unwrap();
        fs.write(Path::new("/d/desktop.ini"), b"new").unwrap();
        assert_eq!(fs.contents("/d/desktop.ini").unwrap(), b"new");
    }

    #[test]
    fn same_file_compares_normalized_paths() {
        let fs = MemoryFs::new();
        fs.add_file("/d/folder.ico", b"ico".to_vec());
        fs.add_dir("/d/sub");

        assert!(fs.same_file(Path::new("/d/sub/../folder.ico"), Path::new("/d/folder.ico")));
        assert!(!fs.same_file(Path::new("/d/folder.ico"), Path::new("/d/other.ico")));
        assert!(!fs.same_file(Path::new("/d/missing.ico"), Path::new("/d/missing.ico")));
    }

    #[test]
    fn write_requires_existing_parent() {
        let fs = MemoryFs::new();
        let err = fs.write(Path::new("/nope/file"), b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn denied_attributes_fail() {
        let fs = MemoryFs::new();
        fs.add_dir("/d");
        fs.deny_attributes("/d");
        let err = fs
            .set_attributes(Path::new("/d"), AttributeChange::READ_ONLY)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Attribute);
        assert!(!fs.attributes("/d").unwrap().read_only);
    }
}
