//! Row-major scalar buffer with one value per grid pixel.
//!
//! A `ScalarField` carries iteration counts, distance estimates, noise
//! intensities, or LIC brightness. Values are unconstrained `f64`;
//! [`SENTINEL`] marks pixels with no defined value.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grid::Grid;

/// Marker for "undefined / no flow" pixels: the minimum safe integer,
/// `-(2^53 - 1)`.
pub const SENTINEL: f64 = -9_007_199_254_740_991.0;

/// Returns `true` if `value` is the undefined-pixel marker.
#[inline]
pub fn is_sentinel(value: f64) -> bool {
    value == SENTINEL
}

/// A dense `width * height` scalar buffer.
///
/// Deserialization goes through [`ScalarField::from_data`], so a buffer
/// whose length disagrees with its dimensions is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalarFieldParts")]
pub struct ScalarField {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl ScalarField {
    /// Creates a zero-filled field.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, EngineError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a zero-filled field sized to `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            data: vec![0.0; grid.size()],
        }
    }

    /// Wraps a pre-built buffer, validating `data.len() == width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, EngineError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(EngineError::SizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Value at `(col, row)`. Panics if out of bounds.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: f64) {
        self.data[row * self.width + col] = value;
    }

    /// Fails with `DimensionMismatch` unless the field has `grid`'s shape.
    pub fn ensure_matches(&self, grid: &Grid) -> Result<(), EngineError> {
        if self.width != grid.width() || self.height != grid.height() {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: grid.width(),
                rhs_h: grid.height(),
            });
        }
        Ok(())
    }

    /// Iterates over all pixels yielding `(col, row, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let col = i % self.width;
            let row = i / self.width;
            (col, row, v)
        })
    }
}

#[derive(Deserialize)]
struct ScalarFieldParts {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl TryFrom<ScalarFieldParts> for ScalarField {
    type Error = EngineError;

    fn try_from(parts: ScalarFieldParts) -> Result<Self, EngineError> {
        ScalarField::from_data(parts.width, parts.height, parts.data)
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)
}
