use std::path::PathBuf;
use thiserror::Error;

/// Broad category of an [`IconError`], used by callers that branch on failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Folder or image path does not exist, or the folder is not a directory.
    NotFound,
    /// The icon conversion tool is missing or failed.
    Conversion,
    /// Changing hidden/system/read-only attributes failed.
    Attribute,
    /// A plain filesystem operation (copy, write, delete, list) failed.
    Io,
}

/// Errors raised while installing, uninstalling or inspecting a folder icon.
#[derive(Debug, Error)]
pub enum IconError {
    #[error("Folder '{}' does not exist.", .0.display())]
    FolderNotFound(PathBuf),

    #[error("No 'folder.png', 'folder.jpg', or 'folder.ico' found in '{}'.", .0.display())]
    NoDefaultImage(PathBuf),

    #[error("Image file '{}' does not exist.", .0.display())]
    ImageNotFound(PathBuf),

    #[error("{program} conversion failed: {reason}. Make sure '{program}' is in your PATH.")]
    Conversion { program: String, reason: String },

    #[error("Failed to set attributes {flags} on '{}': {reason}", path.display())]
    Attribute {
        path: PathBuf,
        flags: String,
        reason: String,
    },

    #[error("Failed to {action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IconError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FolderNotFound(_) | Self::NoDefaultImage(_) | Self::ImageNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Attribute { .. } => ErrorKind::Attribute,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Shorthand for wrapping an `io::Error` with the action and path that failed.
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
