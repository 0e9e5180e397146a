use std::path::{Path, PathBuf};

use crate::error::IconError;
use crate::fs::FileSystem;

/// File names picked up automatically when no image is given (compared case-insensitively).
pub const DEFAULT_IMAGE_NAMES: &[&str] = &["folder.png", "folder.jpg", "folder.jpeg", "folder.ico"];

/// Resolve `folder` to an absolute path and check that it is an existing directory.
pub fn resolve_folder(fs: &dyn FileSystem, folder: &Path) -> Result<PathBuf, IconError> {
    let abs = fs
        .absolute(folder)
        .map_err(|_| IconError::FolderNotFound(folder.to_path_buf()))?;
    if !fs.is_dir(&abs) {
        return Err(IconError::FolderNotFound(abs));
    }
    Ok(abs)
}

/// Find the first default-named image directly inside `folder`, in listing order.
pub fn find_default_image(fs: &dyn FileSystem, folder: &Path) -> Result<PathBuf, IconError> {
    let entries = fs
        .list_dir(folder)
        .map_err(|e| IconError::io("list", folder, e))?;
    entries
        .into_iter()
        .find(|entry| !entry.is_dir && is_default_image_name(&entry.name))
        .map(|entry| entry.path)
        .ok_or_else(|| IconError::NoDefaultImage(folder.to_path_buf()))
}

/// Resolve the image for `folder`, falling back to [`find_default_image`] when
/// `image` is `None`. `folder` must already be resolved.
pub fn resolve_image(
    fs: &dyn FileSystem,
    folder: &Path,
    image: Option<&Path>,
) -> Result<PathBuf, IconError> {
    let image = match image {
        Some(p) => p.to_path_buf(),
        None => {
            let found = find_default_image(fs, folder)?;
            log::info!("Found image '{}' in the folder.", found.display());
            found
        }
    };
    let abs = fs
        .absolute(&image)
        .map_err(|_| IconError::ImageNotFound(image.clone()))?;
    if !fs.exists(&abs) {
        return Err(IconError::ImageNotFound(abs));
    }
    Ok(abs)
}

fn is_default_image_name(name: &str) -> bool {
    DEFAULT_IMAGE_NAMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}
