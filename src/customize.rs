//! Writing and removing a folder's customization: `desktop.ini` plus attributes.
//!
//! None of these steps roll back. If a later step fails, earlier effects stay
//! on disk and the error of the failing step is returned.

use std::path::{Path, PathBuf};

use crate::desktop_ini::{CONFIG_FILE_NAME, DesktopIni};
use crate::error::IconError;
use crate::fs::{AttributeChange, FileSystem};

/// Path of `desktop.ini` inside `folder`.
pub fn config_file_path(folder: &Path) -> PathBuf {
    folder.join(CONFIG_FILE_NAME)
}

/// A folder is customized exactly when its `desktop.ini` exists.
pub fn is_customized(fs: &dyn FileSystem, folder: &Path) -> bool {
    fs.exists(&config_file_path(folder))
}

/// The path written into `desktop.ini` for `icon`: its short form when enabled
/// and available, otherwise the long path.
pub fn icon_reference(fs: &dyn FileSystem, icon: &Path, short_paths: bool) -> String {
    if short_paths {
        match fs.short_path(icon) {
            Some(short) if !short.as_os_str().is_empty() && short != icon => {
                log::debug!("Using short path {} for {}", short.display(), icon.display());
                return short.to_string_lossy().into_owned();
            }
            _ => log::debug!("No short path for {}, using long path", icon.display()),
        }
    }
    icon.to_string_lossy().into_owned()
}

/// Write `desktop.ini` for `icon`, hide it, and mark `folder` read-only.
///
/// Returns the path of the written `desktop.ini`.
pub fn apply_customization(
    fs: &dyn FileSystem,
    folder: &Path,
    icon: &Path,
    short_paths: bool,
) -> Result<PathBuf, IconError> {
    let ini_path = config_file_path(folder);
    let ini = DesktopIni::for_icon(icon_reference(fs, icon, short_paths));

    if fs.exists(&ini_path) {
        // hidden/system files cannot be overwritten in place
        fs.set_attributes(&ini_path, AttributeChange::UNHIDE_SYSTEM)?;
    }
    fs.write(&ini_path, ini.render().as_bytes())
        .map_err(|e| IconError::io("write", &ini_path, e))?;
    fs.set_attributes(&ini_path, AttributeChange::HIDE_AS_SYSTEM)?;
    fs.set_attributes(folder, AttributeChange::READ_ONLY)?;

    log::info!("Custom icon installed for '{}'.", folder.display());
    Ok(ini_path)
}

/// Remove `desktop.ini` (if any) and clear the folder's read-only flag.
///
/// Returns `true` when a `desktop.ini` was deleted. `folder.ico` is left in place.
pub fn remove_customization(fs: &dyn FileSystem, folder: &Path) -> Result<bool, IconError> {
    let ini_path = config_file_path(folder);
    let removed = if fs.exists(&ini_path) {
        log::info!("Removing '{}'...", ini_path.display());
        fs.set_attributes(&ini_path, AttributeChange::UNHIDE_SYSTEM)?;
        fs.remove_file(&ini_path)
            .map_err(|e| IconError::io("remove", &ini_path, e))?;
        true
    } else {
        log::info!(
            "No '{CONFIG_FILE_NAME}' found in '{}'. Nothing to uninstall.",
            folder.display()
        );
        false
    };
    fs.set_attributes(folder, AttributeChange::WRITABLE)?;
    Ok(removed)
}

/// Read and parse `desktop.ini` in `folder`, if it exists and references an icon.
pub fn read_customization(
    fs: &dyn FileSystem,
    folder: &Path,
) -> Result<Option<DesktopIni>, IconError> {
    let ini_path = config_file_path(folder);
    if !fs.exists(&ini_path) {
        return Ok(None);
    }
    let bytes = fs
        .read(&ini_path)
        .map_err(|e| IconError::io("read", &ini_path, e))?;
    Ok(DesktopIni::parse(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fs::MemoryFs;

    const EXPECTED_INI: &str =
        "[.ShellClassInfo]\nIconResource=/photos/folder.ico,0\nInfoTip=Custom folder icon\n";

    fn folder_with_icon() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.add_file("/photos/folder.ico", b"ico".to_vec());
        fs
    }

    #[test]
    fn install_writes_ini_and_sets_attributes() {
        let fs = folder_with_icon();
        let folder = Path::new("/photos");

        let ini = apply_customization(&fs, folder, Path::new("/photos/folder.ico"), true).unwrap();

        assert_eq!(ini, PathBuf::from("/photos/desktop.ini"));
        assert_eq!(fs.contents(&ini).unwrap(), EXPECTED_INI.as_bytes());
        let ini_attrs = fs.attributes(&ini).unwrap();
        assert!(ini_attrs.hidden && ini_attrs.system);
        assert!(fs.attributes(folder).unwrap().read_only);
        assert!(is_customized(&fs, folder));
    }

    #[test]
    fn install_embeds_short_path_when_available() {
        let fs = folder_with_icon();
        fs.set_short_path("/photos/folder.ico", "/PHOTOS~1/folder.ico");

        apply_customization(&fs, Path::new("/photos"), Path::new("/photos/folder.ico"), true).unwrap();

        let text = String::from_utf8(fs.contents("/photos/desktop.ini").unwrap()).unwrap();
        assert!(text.contains("IconResource=/PHOTOS~1/folder.ico,0\n"));
    }

    #[test]
    fn short_path_lookup_can_be_disabled() {
        let fs = folder_with_icon();
        fs.set_short_path("/photos/folder.ico", "/PHOTOS~1/folder.ico");

        let reference = icon_reference(&fs, Path::new("/photos/folder.ico"), false);
        assert_eq!(reference, "/photos/folder.ico");
    }

    #[test]
    fn unchanged_short_path_falls_back_to_long_path() {
        let fs = folder_with_icon();
        fs.set_short_path("/photos/folder.ico", "/photos/folder.ico");
        assert_eq!(
            icon_reference(&fs, Path::new("/photos/folder.ico"), true),
            "/photos/folder.ico"
        );
    }

    #[test]
    fn reinstall_overwrites_hidden_ini() {
        let fs = folder_with_icon();
        let folder = Path::new("/photos");
        apply_customization(&fs, folder, Path::new("/photos/folder.ico"), true).unwrap();
        fs.set_short_path("/photos/folder.ico", "/P/folder.ico");

        apply_customization(&fs, folder, Path::new("/photos/folder.ico"), true).unwrap();

        let text = String::from_utf8(fs.contents("/photos/desktop.ini").unwrap()).unwrap();
        assert!(text.contains("IconResource=/P/folder.ico,0"));
        assert!(fs.attributes("/photos/desktop.ini").unwrap().hidden);
    }

    #[test]
    fn attribute_failure_leaves_ini_in_place() {
        let fs = folder_with_icon();
        fs.deny_attributes("/photos");

        let err = apply_customization(&fs, Path::new("/photos"), Path::new("/photos/folder.ico"), true)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Attribute);
        assert_eq!(fs.contents("/photos/desktop.ini").unwrap(), EXPECTED_INI.as_bytes());
    }

    #[test]
    fn uninstall_removes_ini_and_clears_read_only() {
        let fs = folder_with_icon();
        let folder = Path::new("/photos");
        apply_customization(&fs, folder, Path::new("/photos/folder.ico"), true).unwrap();

        assert!(remove_customization(&fs, folder).unwrap());

        assert!(!is_customized(&fs, folder));
        assert!(!fs.attributes(folder).unwrap().read_only);
        // the icon copy stays
        assert!(fs.exists(Path::new("/photos/folder.ico")));
    }

    #[test]
    fn uninstall_without_ini_is_a_no_op() {
        let fs = MemoryFs::new();
        fs.add_dir("/plain");

        assert!(!remove_customization(&fs, Path::new("/plain")).unwrap());
        assert!(!remove_customization(&fs, Path::new("/plain")).unwrap());
        assert!(!fs.attributes("/plain").unwrap().read_only);
    }

    #[test]
    fn read_customization_parses_installed_ini() {
        let fs = folder_with_icon();
        assert_eq!(read_customization(&fs, Path::new("/photos")).unwrap(), None);

        apply_customization(&fs, Path::new("/photos"), Path::new("/photos/folder.ico"), false).unwrap();

        let ini = read_customization(&fs, Path::new("/photos")).unwrap().unwrap();
        assert_eq!(ini.icon_resource, "/photos/folder.ico");
        assert_eq!(ini.icon_index, 0);
    }
}
