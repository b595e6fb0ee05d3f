//! The `Engine` trait implemented by every named plane.
//!
//! The trait is object-safe so the registry and the CLI can hold any plane
//! as `Box<dyn Engine>`.

use serde_json::Value;

use crate::color::ColorScheme;
use crate::error::EngineError;
use crate::field::ScalarField;
use crate::grid::Grid;

/// A configured visualization: a visible grid plus everything needed to fill
/// it with one scalar per pixel.
///
/// `compute` is pure with respect to `self`; the same engine can be computed
/// repeatedly and from a background thread (`Engine: Send + Sync`).
pub trait Engine: Send + Sync {
    /// Runs the computation, calling `progress` with integer percentages.
    ///
    /// The returned field has the visible grid's dimensions.
    fn compute(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError>;

    /// The visible grid the output is computed for.
    fn grid(&self) -> &Grid;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;

    /// How the output should be colorized.
    fn color_scheme(&self) -> ColorScheme;
}
