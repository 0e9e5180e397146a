use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::IconConverter;
use crate::error::IconError;
use crate::fs::background_command;

/// Converts images with ImageMagick:
/// `magick <src> -define icon:auto-resize=256,64,48,32,16 <dest>`.
#[derive(Debug, Clone)]
pub struct MagickConverter {
    program: String,
    search_path: Vec<PathBuf>,
}

impl MagickConverter {
    /// `search_path` entries are prepended to `PATH` for the child process only.
    pub fn new(program: impl Into<String>, search_path: Vec<PathBuf>) -> Self {
        Self {
            program: program.into(),
            search_path,
        }
    }

    fn child_path(&self) -> Option<OsString> {
        if self.search_path.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .search_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        match std::env::join_paths(dirs) {
            Ok(joined) => Some(joined),
            Err(e) => {
                log::warn!("Ignoring converter search path: {e}");
                None
            }
        }
    }

    fn error(&self, reason: impl Into<String>) -> IconError {
        IconError::Conversion {
            program: self.program.clone(),
            reason: reason.into(),
        }
    }
}

impl IconConverter for MagickConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, source: &Path, dest: &Path, sizes: &[u32]) -> Result<(), IconError> {
        let resize = sizes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut cmd = background_command(&self.program);
        cmd.arg(source)
            .arg("-define")
            .arg(format!("icon:auto-resize={resize}"))
            .arg(dest);
        if let Some(path) = self.child_path() {
            log::debug!("Converter PATH: {}", path.to_string_lossy());
            cmd.env("PATH", path);
        }
        log::debug!("Running {cmd:?}");

        let output = cmd.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => self.error("program not found"),
            _ => self.error(format!("failed to start: {e}")),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                format!("exited with {}: {stderr}", output.status)
            };
            return Err(self.error(reason));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ICON_SIZES;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn missing_program_is_a_conversion_error() {
        let dir = TempDir::new().unwrap();
        let converter = MagickConverter::new("folder-icon-no-such-magick", Vec::new());

        let err = converter
            .convert(
                &dir.path().join("a.png"),
                &dir.path().join("a.ico"),
                &DEFAULT_ICON_SIZES,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.to_string().contains("program not found"));
        assert!(err.to_string().contains("PATH"));
    }

    #[test]
    fn child_path_prepends_search_dirs() {
        let converter = MagickConverter::new("magick", vec![PathBuf::from("/opt/im/bin")]);
        let joined = converter.child_path().unwrap();
        let first = std::env::split_paths(&joined).next().unwrap();
        assert_eq!(first, PathBuf::from("/opt/im/bin"));

        let plain = MagickConverter::new("magick", Vec::new());
        assert!(plain.child_path().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn tool_on_search_path_is_invoked_with_resize_define() {
        use std::os::unix::fs::PermissionsExt;

        let tools = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let args_log = work.path().join("args.txt");

        let script = tools.path().join("fake-magick");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\necho \"$2 $3\" > \"{}\"\ncp \"$1\" \"$4\"\n",
                args_log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let source = work.path().join("cover.png");
        let dest = work.path().join("cover.ico");
        std::fs::write(&source, b"png").unwrap();

        let converter = MagickConverter::new("fake-magick", vec![tools.path().to_path_buf()]);
        converter.convert(&source, &dest, &DEFAULT_ICON_SIZES).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"png");
        assert_eq!(
            std::fs::read_to_string(&args_log).unwrap().trim(),
            "-define icon:auto-resize=256,64,48,32,16"
        );

        // the process environment itself is untouched
        let path = std::env::var_os("PATH").unwrap_or_default();
        assert!(!std::env::split_paths(&path).any(|p| p == tools.path()));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_conversion_error() {
        let dir = TempDir::new().unwrap();
        let converter = MagickConverter::new("false", Vec::new());

        let err = converter
            .convert(
                &dir.path().join("a.png"),
                &dir.path().join("a.ico"),
                &DEFAULT_ICON_SIZES,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.to_string().contains("exited with"));
    }
}
