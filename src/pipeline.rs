use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Config, DEFAULT_ICON_SIZES};
use crate::convert::{self, IconConverter, build_converter};
use crate::customize;
use crate::desktop_ini::DesktopIni;
use crate::error::IconError;
use crate::fs::{FileSystem, OsFileSystem};
use crate::resolve;

/// Result of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    /// The resolved root folder.
    pub root: PathBuf,
    /// The resolved source image used for the root.
    pub image: PathBuf,
    /// The root's `folder.ico`.
    pub icon: PathBuf,
    /// Intermediate icon written next to the source image, if a conversion ran.
    pub converted: Option<PathBuf>,
    /// Every folder customized, in processing order (root first).
    pub folders: Vec<PathBuf>,
}

/// Result of a successful uninstall.
#[derive(Debug, Clone, Serialize)]
pub struct UninstallReport {
    pub root: PathBuf,
    /// Every folder processed, in processing order (root first).
    pub folders: Vec<PathBuf>,
    /// Folders whose `desktop.ini` was actually deleted.
    pub removed: Vec<PathBuf>,
}

/// Customization state of one folder.
#[derive(Debug, Clone, Serialize)]
pub struct FolderStatus {
    pub folder: PathBuf,
    /// `true` when the folder has a `desktop.ini`.
    pub customized: bool,
    /// The parsed icon entry, when `desktop.ini` references one.
    pub desktop_ini: Option<DesktopIni>,
}

/// Install/uninstall driver bound to a filesystem and a converter.
///
/// # Example
///
/// ```rust,no_run
/// use folder_icon::config::Config;
/// use folder_icon::pipeline::Pipeline;
/// use std::path::Path;
///
/// # fn example() -> Result<(), folder_icon::error::IconError> {
/// let pipeline = Pipeline::builder().from_config(&Config::default()).build();
///
/// // Uses folder.png / folder.jpg / folder.ico from the folder itself
/// let report = pipeline.install(Path::new(r"C:\Photos"), None, true)?;
/// println!("Customized {} folder(s)", report.folders.len());
///
/// pipeline.uninstall(Path::new(r"C:\Photos"), true)?;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    fs: Box<dyn FileSystem>,
    converter: Box<dyn IconConverter>,
    sizes: Vec<u32>,
    short_paths: bool,
}

/// Builder for [`Pipeline`]. Defaults to the real filesystem and ImageMagick.
pub struct PipelineBuilder {
    fs: Option<Box<dyn FileSystem>>,
    converter: Option<Box<dyn IconConverter>>,
    sizes: Vec<u32>,
    short_paths: bool,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            fs: None,
            converter: None,
            sizes: DEFAULT_ICON_SIZES.to_vec(),
            short_paths: true,
        }
    }
}

impl PipelineBuilder {
    /// Take the filesystem, converter, icon sizes and short-path setting from `config`.
    pub fn from_config(mut self, config: &Config) -> Self {
        self.fs = Some(Box::new(OsFileSystem::from_config(&config.shell)));
        self.converter = Some(build_converter(&config.converter));
        self.sizes = config.converter.sizes.clone();
        self.short_paths = config.shell.short_paths;
        self
    }

    pub fn file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Some(Box::new(fs));
        self
    }

    pub fn converter(mut self, converter: impl IconConverter + 'static) -> Self {
        self.converter = Some(Box::new(converter));
        self
    }

    pub fn sizes(mut self, sizes: Vec<u32>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn short_paths(mut self, enabled: bool) -> Self {
        self.short_paths = enabled;
        self
    }

    pub fn build(self) -> Pipeline {
        let config = Config::default();
        Pipeline {
            fs: self
                .fs
                .unwrap_or_else(|| Box::new(OsFileSystem::from_config(&config.shell))),
            converter: self
                .converter
                .unwrap_or_else(|| build_converter(&config.converter)),
            sizes: self.sizes,
            short_paths: self.short_paths,
        }
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Install a custom icon on `folder`, and on every subfolder when `recursive`.
    ///
    /// With no `image`, the folder's own `folder.png`/`folder.jpg`/`folder.jpeg`/
    /// `folder.ico` is used. On a recursive install the root is converted once and
    /// its `folder.ico` is copied into every descendant. The first failure stops
    /// the walk; folders already processed stay customized.
    pub fn install(
        &self,
        folder: &Path,
        image: Option<&Path>,
        recursive: bool,
    ) -> Result<InstallReport, IconError> {
        let root = resolve::resolve_folder(self.fs.as_ref(), folder)?;
        let root_image = resolve::resolve_image(self.fs.as_ref(), &root, image)?;
        let prepared = convert::prepare_icon(
            self.fs.as_ref(),
            self.converter.as_ref(),
            &root_image,
            &root,
            &self.sizes,
        )?;
        customize::apply_customization(self.fs.as_ref(), &root, &prepared.path, self.short_paths)?;

        let mut folders = vec![root.clone()];
        if recursive {
            let shared_icon = prepared.path.clone();
            folders.extend(self.walk_descendants(&root, |dir| {
                self.install_folder(dir, &shared_icon).map(|_| ())
            })?);
        }

        Ok(InstallReport {
            root,
            image: root_image,
            icon: prepared.path,
            converted: prepared.converted,
            folders,
        })
    }

    /// Install a single folder from an already-resolved image, without recursion.
    ///
    /// Returns the folder's `folder.ico`.
    pub fn install_folder(&self, folder: &Path, image: &Path) -> Result<PathBuf, IconError> {
        let folder = resolve::resolve_folder(self.fs.as_ref(), folder)?;
        let image = resolve::resolve_image(self.fs.as_ref(), &folder, Some(image))?;
        let prepared = convert::prepare_icon(
            self.fs.as_ref(),
            self.converter.as_ref(),
            &image,
            &folder,
            &self.sizes,
        )?;
        customize::apply_customization(self.fs.as_ref(), &folder, &prepared.path, self.short_paths)?;
        Ok(prepared.path)
    }

    /// Remove the customization from `folder`, and from every subfolder when `recursive`.
    ///
    /// Folders without `desktop.ini` are not an error. `folder.ico` files are kept.
    pub fn uninstall(&self, folder: &Path, recursive: bool) -> Result<UninstallReport, IconError> {
        let root = resolve::resolve_folder(self.fs.as_ref(), folder)?;
        let mut removed = Vec::new();

        let mut uninstall_one = |dir: &Path| -> Result<(), IconError> {
            if customize::remove_customization(self.fs.as_ref(), dir)? {
                removed.push(dir.to_path_buf());
            }
            Ok(())
        };

        uninstall_one(&root)?;
        let mut folders = vec![root.clone()];
        if recursive {
            folders.extend(self.walk_descendants(&root, &mut uninstall_one)?);
        }

        Ok(UninstallReport {
            root,
            folders,
            removed,
        })
    }

    /// Report whether `folder` (and, when `recursive`, each subfolder) is customized.
    pub fn status(&self, folder: &Path, recursive: bool) -> Result<Vec<FolderStatus>, IconError> {
        let root = resolve::resolve_folder(self.fs.as_ref(), folder)?;
        let mut statuses = Vec::new();

        let mut inspect = |dir: &Path| -> Result<(), IconError> {
            statuses.push(FolderStatus {
                folder: dir.to_path_buf(),
                customized: customize::is_customized(self.fs.as_ref(), dir),
                desktop_ini: customize::read_customization(self.fs.as_ref(), dir)?,
            });
            Ok(())
        };

        inspect(&root)?;
        if recursive {
            self.walk_descendants(&root, &mut inspect)?;
        }
        Ok(statuses)
    }

    /// Visit every directory below `root`, depth-first, parents before children,
    /// siblings in listing order. Symbolic links are not followed.
    ///
    /// Stops at the first error. Returns the visited directories in order.
    fn walk_descendants(
        &self,
        root: &Path,
        mut visit: impl FnMut(&Path) -> Result<(), IconError>,
    ) -> Result<Vec<PathBuf>, IconError> {
        let mut visited = Vec::new();
        let mut stack = self.subdirectories(root)?;
        stack.reverse();

        while let Some(dir) = stack.pop() {
            visit(&dir)?;
            let mut children = self.subdirectories(&dir)?;
            children.reverse();
            stack.extend(children);
            visited.push(dir);
        }
        Ok(visited)
    }

    fn subdirectories(&self, dir: &Path) -> Result<Vec<PathBuf>, IconError> {
        let entries = self
            .fs
            .list_dir(dir)
            .map_err(|e| IconError::io("list", dir, e))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.path)
            .collect())
    }
}
