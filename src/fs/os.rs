use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{AttributeChange, DirEntryInfo, FileSystem};
use crate::config::ShellConfig;
use crate::error::IconError;

/// Build a [`Command`] that never flashes a console window on Windows.
pub(crate) fn background_command(program: impl AsRef<OsStr>) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(program);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}

/// Decode the UTF-16LE output of `cmd /U` into a single path.
///
/// Output that is not valid UTF-16, is empty or spans several lines yields `None`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_short_path_output(raw: &[u8]) -> Option<PathBuf> {
    if raw.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).ok()?;
    let line = text.trim();
    if line.is_empty() || line.contains(['\r', '\n', char::REPLACEMENT_CHARACTER]) {
        return None;
    }
    Some(PathBuf::from(line))
}

/// The real filesystem. Attributes are changed with the `attrib` command on
/// Windows and skipped elsewhere.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    attrib_program: String,
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self::new("attrib")
    }
}

impl OsFileSystem {
    pub fn new(attrib_program: impl Into<String>) -> Self {
        Self {
            attrib_program: attrib_program.into(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(config.attrib_program.clone())
    }
}

impl FileSystem for OsFileSystem {
    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        std::path::absolute(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            // file_type() does not follow symlinks, so linked directories are not walked.
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntryInfo {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    #[cfg(unix)]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        use std::os::unix::fs::MetadataExt;

        match (std::fs::metadata(a), std::fs::metadata(b)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }

    #[cfg(not(unix))]
    fn same_file(&self, a: &Path, b: &Path) -> bool {
        match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    #[cfg(target_os = "windows")]
    fn set_attributes(&self, path: &Path, change: AttributeChange) -> Result<(), IconError> {
        let args = change.attrib_args();
        if args.is_empty() {
            return Ok(());
        }
        log::debug!("{} {} \"{}\"", self.attrib_program, change.describe(), path.display());

        let attribute_error = |reason: String| IconError::Attribute {
            path: path.to_path_buf(),
            flags: change.describe(),
            reason,
        };

        let output = background_command(&self.attrib_program)
            .args(&args)
            .arg(path)
            .output()
            .map_err(|e| attribute_error(format!("failed to run {}: {e}", self.attrib_program)))?;

        if !output.status.success() {
            // attrib reports most problems on stdout
            let mut reason = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if reason.is_empty() {
                reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
            }
            if reason.is_empty() {
                reason = format!("{} exited with {}", self.attrib_program, output.status);
            }
            return Err(attribute_error(reason));
        }
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn set_attributes(&self, path: &Path, change: AttributeChange) -> Result<(), IconError> {
        log::debug!(
            "Skipping attribute change {} on {} (not supported on this platform)",
            change.describe(),
            path.display()
        );
        Ok(())
    }

    #[cfg(target_os = "windows")]
    fn short_path(&self, path: &Path) -> Option<PathBuf> {
        use std::os::windows::process::CommandExt;

        // /U makes cmd write UTF-16LE to the pipe instead of the OEM code page.
        let output = background_command("cmd")
            .args(["/U", "/C"])
            .raw_arg(format!("for %I in (\"{}\") do @echo %~sI", path.display()))
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_short_path_output(&output.stdout).filter(|short| short.exists())
    }

    #[cfg(not(target_os = "windows"))]
    fn short_path(&self, _path: &Path) -> Option<PathBuf> {
        None
    }
}
