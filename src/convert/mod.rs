//! Turning a source image into the folder's canonical `folder.ico`.
//!
//! Images that are already icons are copied as-is. Anything else goes through an
//! [`IconConverter`]: ImageMagick by default ([`MagickConverter`]) or the
//! in-process encoder ([`BuiltinConverter`]).

mod builtin;
mod magick;

pub use builtin::BuiltinConverter;
pub use magick::MagickConverter;

use std::path::{Path, PathBuf};

use crate::config::{ConverterBackend, ConverterConfig};
use crate::error::IconError;
use crate::fs::FileSystem;

/// Name of the icon copy placed inside every customized folder.
pub const ICON_FILE_NAME: &str = "folder.ico";

/// Produces a multi-resolution `.ico` from a raster image.
///
/// Implementations write straight to `dest`; the caller checks that the file
/// appeared.
pub trait IconConverter {
    /// The display name of this converter, used in logs and errors.
    fn name(&self) -> &str;
    /// Convert `source` into an icon at `dest` containing one frame per entry of `sizes`.
    fn convert(&self, source: &Path, dest: &Path, sizes: &[u32]) -> Result<(), IconError>;
}

/// Build the converter selected in configuration.
pub fn build_converter(config: &ConverterConfig) -> Box<dyn IconConverter> {
    match config.backend {
        ConverterBackend::Magick => Box::new(MagickConverter::new(
            config.program.clone(),
            config.search_path.clone(),
        )),
        ConverterBackend::Builtin => Box::new(BuiltinConverter),
    }
}

/// Whether `path` already has the icon extension (case-insensitive).
pub fn is_icon(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"))
}

/// Outcome of [`prepare_icon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedIcon {
    /// `<folder>/folder.ico`.
    pub path: PathBuf,
    /// The intermediate icon written next to the source image, if a conversion ran.
    pub converted: Option<PathBuf>,
}

/// Make sure `<folder>/folder.ico` exists for `image`, converting when needed.
///
/// `image` and `folder` must already be resolved. The source image is never
/// deleted.
pub fn prepare_icon(
    fs: &dyn FileSystem,
    converter: &dyn IconConverter,
    image: &Path,
    folder: &Path,
    sizes: &[u32],
) -> Result<PreparedIcon, IconError> {
    let target = folder.join(ICON_FILE_NAME);

    let (source_icon, converted) = if is_icon(image) {
        log::debug!("Image is already an ICO file. Skipping conversion.");
        (image.to_path_buf(), None)
    } else {
        let ico_path = image.with_extension("ico");
        log::info!(
            "Converting '{}' to .ico using {}...",
            image.display(),
            converter.name()
        );
        converter.convert(image, &ico_path, sizes)?;
        if !fs.exists(&ico_path) {
            return Err(IconError::Conversion {
                program: converter.name().to_string(),
                reason: format!("no icon was written to '{}'", ico_path.display()),
            });
        }
        log::info!("Conversion successful. New ICO file at '{}'.", ico_path.display());
        (ico_path.clone(), Some(ico_path))
    };

    // A differently spelled path to the target itself must not be copied:
    // copying a file onto itself truncates it.
    if fs.same_file(&source_icon, &target) {
        log::debug!("'{}' is already in place", source_icon.display());
    } else {
        fs.copy(&source_icon, &target)
            .map_err(|e| IconError::io("copy icon to", &target, e))?;
        log::debug!("Copied '{}' to '{}'", source_icon.display(), target.display());
    }

    Ok(PreparedIcon {
        path: target,
        converted,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::fs::MemoryFs;
    use std::cell::RefCell;

    /// Converter that records its calls and writes a marker icon into a [`MemoryFs`].
    pub struct RecordingConverter {
        pub fs: MemoryFs,
        pub calls: RefCell<Vec<(PathBuf, PathBuf, Vec<u32>)>>,
        pub fail: bool,
        pub write_output: bool,
    }

    impl RecordingConverter {
        pub fn new(fs: &MemoryFs) -> Self {
            Self {
                fs: fs.clone(),
                calls: RefCell::new(Vec::new()),
                fail: false,
                write_output: true,
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl IconConverter for RecordingConverter {
        fn name(&self) -> &str {
            "recording"
        }

        fn convert(&self, source: &Path, dest: &Path, sizes: &[u32]) -> Result<(), IconError> {
            self.calls
                .borrow_mut()
                .push((source.to_path_buf(), dest.to_path_buf(), sizes.to_vec()));
            if self.fail {
                return Err(IconError::Conversion {
                    program: "recording".into(),
                    reason: "exit status 1".into(),
                });
            }
            if self.write_output {
                let mut bytes = b"ICO:".to_vec();
                bytes.extend(self.fs.contents(source).unwrap_or_default());
                self.fs.add_file(dest, bytes);
            }
            Ok(())
        }
    }
}
