//! CPU-side PNG rendering of a [`ScalarField`].
//!
//! This module is feature-gated behind `png` (default on) so that library
//! users can depend on the `engines` crate without pulling in the `image`
//! crate. The pixel buffer conversion itself lives in [`crate::pixel`]
//! (always available).

use plane_engine_core::{ColorScheme, EngineError, ScalarField};
use std::path::Path;

use crate::pixel::field_to_rgba;

/// Writes a field as a PNG image, mapping values through the given scheme.
///
/// Returns `EngineError::InvalidDimensions` if the field dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(field: &ScalarField, scheme: &ColorScheme, path: &Path) -> Result<(), EngineError> {
    let rgba = field_to_rgba(field, scheme);
    let w = u32::try_from(field.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(field.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    tracing::info!(path = %path.display(), width = w, height = h, "snapshot written");
    Ok(())
}
