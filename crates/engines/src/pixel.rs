//! Pure-computation pixel buffer conversion from [`ScalarField`] +
//! [`ColorScheme`].
//!
//! This module is always available (no feature gate) so that callers without
//! the `png` feature can still get at the raw pixels.

use plane_engine_core::{ColorScheme, ScalarField};

/// Maps field values through a color scheme to produce an RGBA8 pixel buffer.
///
/// Each value is written as four bytes (R, G, B, 255). The buffer length is
/// `width * height * 4`.
pub fn field_to_rgba(field: &ScalarField, scheme: &ColorScheme) -> Vec<u8> {
    field
        .data()
        .iter()
        .flat_map(|&value| scheme.color(value).to_rgba())
        .collect()
}
