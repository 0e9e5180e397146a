use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::FilterType;
use image::ExtendedColorType;

use super::IconConverter;
use crate::error::IconError;

/// Largest frame an ICO directory entry can describe.
const MAX_ICON_SIZE: u32 = 256;

/// Encodes icons in-process with the `image` crate, one PNG frame per size.
///
/// Each frame is scaled to fit inside `size × size`, keeping the aspect ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

fn error(reason: impl Into<String>) -> IconError {
    IconError::Conversion {
        program: "builtin".into(),
        reason: reason.into(),
    }
}

impl IconConverter for BuiltinConverter {
    fn name(&self) -> &str {
        "builtin"
    }

    fn convert(&self, source: &Path, dest: &Path, sizes: &[u32]) -> Result<(), IconError> {
        if sizes.is_empty() {
            return Err(error("no icon sizes requested"));
        }
        if let Some(bad) = sizes.iter().find(|&&s| s == 0 || s > MAX_ICON_SIZE) {
            return Err(error(format!(
                "icon size {bad} is outside 1..={MAX_ICON_SIZE}"
            )));
        }

        let img = image::open(source)
            .map_err(|e| error(format!("could not decode '{}': {e}", source.display())))?;

        let mut frames = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let scaled = img.resize(size, size, FilterType::Lanczos3).to_rgba8();
            let frame = IcoFrame::as_png(
                scaled.as_raw(),
                scaled.width(),
                scaled.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| error(format!("could not encode {size}px frame: {e}")))?;
            frames.push(frame);
        }

        let file = File::create(dest).map_err(|e| IconError::io("create", dest, e))?;
        IcoEncoder::new(BufWriter::new(file))
            .encode_images(&frames)
            .map_err(|e| error(format!("could not write '{}': {e}", dest.display())))?;

        log::debug!("Wrote {} frame(s) to {}", frames.len(), dest.display());
        Ok(())
    }
}
