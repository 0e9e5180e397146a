//! Filesystem access behind a trait.
//!
//! Every side effect the installer performs goes through [`FileSystem`], so the
//! same procedure runs against the real disk ([`OsFileSystem`]) or an in-memory
//! tree ([`MemoryFs`]) in tests.

mod memory;
mod os;

pub use memory::{Attributes, MemoryFs};
pub use os::OsFileSystem;
pub(crate) use os::background_command;

use std::io;
use std::path::{Path, PathBuf};

use crate::error::IconError;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: String,
    /// `true` only for real directories; symbolic links are never reported as directories.
    pub is_dir: bool,
}

/// A requested change to the Windows hidden/system/read-only attributes.
///
/// `None` leaves a flag untouched, `Some(true)` sets it, `Some(false)` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeChange {
    pub hidden: Option<bool>,
    pub system: Option<bool>,
    pub read_only: Option<bool>,
}

impl AttributeChange {
    /// Applied to `desktop.ini` after writing it.
    pub const HIDE_AS_SYSTEM: Self = Self {
        hidden: Some(true),
        system: Some(true),
        read_only: None,
    };
    /// Applied to `desktop.ini` before rewriting or deleting it.
    pub const UNHIDE_SYSTEM: Self = Self {
        hidden: Some(false),
        system: Some(false),
        read_only: None,
    };
    pub const READ_ONLY: Self = Self {
        hidden: None,
        system: None,
        read_only: Some(true),
    };
    pub const WRITABLE: Self = Self {
        hidden: None,
        system: None,
        read_only: Some(false),
    };

    /// Arguments for the `attrib` command, e.g. `["+h", "+s"]`.
    pub fn attrib_args(&self) -> Vec<&'static str> {
        let mut args = Vec::new();
        match self.hidden {
            Some(true) => args.push("+h"),
            Some(false) => args.push("-h"),
            None => {}
        }
        match self.system {
            Some(true) => args.push("+s"),
            Some(false) => args.push("-s"),
            None => {}
        }
        match self.read_only {
            Some(true) => args.push("+r"),
            Some(false) => args.push("-r"),
            None => {}
        }
        args
    }

    pub fn describe(&self) -> String {
        self.attrib_args().join(" ")
    }
}

/// The filesystem operations needed to install and remove folder icons.
pub trait FileSystem {
    /// Make `path` absolute against the current directory, normalizing it lexically.
    fn absolute(&self, path: &Path) -> io::Result<PathBuf>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// Immediate entries of a directory, in listing order.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    /// Create or truncate `path` and write `contents`.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
    /// Whether `a` and `b` name the same existing file, however they are spelled.
    fn same_file(&self, a: &Path, b: &Path) -> bool;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn set_attributes(&self, path: &Path, change: AttributeChange) -> Result<(), IconError>;
    /// The 8.3 short form of `path`, if the platform provides one.
    fn short_path(&self, path: &Path) -> Option<PathBuf>;
}
