//! Per-pixel vector samples and a bounds-checked reader over them.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grid::Grid;

/// One vector sample: unit direction plus the pre-normalization length.
///
/// `Vector::ZERO` marks a pixel with no defined direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub vx: f64,
    pub vy: f64,
    pub magnitude: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector {
        vx: 0.0,
        vy: 0.0,
        magnitude: 0.0,
    };

    /// Normalizes a raw `(vx, vy)`, keeping its length as `magnitude`.
    ///
    /// A zero-length or non-finite input yields [`Vector::ZERO`].
    #[inline]
    pub fn from_raw(vx: f64, vy: f64) -> Vector {
        let magnitude = (vx * vx + vy * vy).sqrt();
        if magnitude > 0.0 && magnitude.is_finite() {
            Vector {
                vx: vx / magnitude,
                vy: vy / magnitude,
                magnitude,
            }
        } else {
            Vector::ZERO
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == 0.0
    }
}

/// Dense vector field over a grid: three parallel row-major buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VectorFieldParts")]
pub struct VectorFieldData {
    width: usize,
    height: usize,
    vx: Vec<f64>,
    vy: Vec<f64>,
    magnitude: Vec<f64>,
}

impl VectorFieldData {
    /// All-zero field sized to `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        let len = grid.size();
        Self {
            width: grid.width(),
            height: grid.height(),
            vx: vec![0.0; len],
            vy: vec![0.0; len],
            magnitude: vec![0.0; len],
        }
    }

    /// Builds a field from three parallel buffers of length `grid.size()`.
    pub fn from_parts(
        grid: &Grid,
        vx: Vec<f64>,
        vy: Vec<f64>,
        magnitude: Vec<f64>,
    ) -> Result<Self, EngineError> {
        let expected = grid.size();
        for got in [vx.len(), vy.len(), magnitude.len()] {
            if got != expected {
                return Err(EngineError::SizeMismatch { expected, got });
            }
        }
        Ok(Self {
            width: grid.width(),
            height: grid.height(),
            vx,
            vy,
            magnitude,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn vx(&self) -> &[f64] {
        &self.vx
    }

    pub fn vy(&self) -> &[f64] {
        &self.vy
    }

    pub fn magnitude(&self) -> &[f64] {
        &self.magnitude
    }

    #[inline]
    pub fn get(&self, index: usize) -> Vector {
        Vector {
            vx: self.vx[index],
            vy: self.vy[index],
            magnitude: self.magnitude[index],
        }
    }

    #[inline]
    pub fn set(&mut self, index: usize, vector: Vector) {
        self.vx[index] = vector.vx;
        self.vy[index] = vector.vy;
        self.magnitude[index] = vector.magnitude;
    }
}

#[derive(Deserialize)]
struct VectorFieldParts {
    width: usize,
    height: usize,
    vx: Vec<f64>,
    vy: Vec<f64>,
    magnitude: Vec<f64>,
}

impl TryFrom<VectorFieldParts> for VectorFieldData {
    type Error = EngineError;

    fn try_from(parts: VectorFieldParts) -> Result<Self, EngineError> {
        let grid = Grid::new(parts.width, parts.height)?;
        VectorFieldData::from_parts(&grid, parts.vx, parts.vy, parts.magnitude)
    }
}

/// Read access to a [`VectorFieldData`] through pixel coordinates of the
/// grid it was computed on.
#[derive(Debug, Clone, Copy)]
pub struct VectorFieldReader<'a> {
    grid: &'a Grid,
    data: &'a VectorFieldData,
}

impl<'a> VectorFieldReader<'a> {
    /// Fails with `SizeMismatch` if `data` was not computed for `grid`.
    pub fn new(grid: &'a Grid, data: &'a VectorFieldData) -> Result<Self, EngineError> {
        if data.len() != grid.size() || data.width() != grid.width() {
            return Err(EngineError::SizeMismatch {
                expected: grid.size(),
                got: data.len(),
            });
        }
        Ok(Self { grid, data })
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Unit direction at `(col, row)`.
    #[inline]
    pub fn vector(&self, col: usize, row: usize) -> (f64, f64) {
        let index = self.grid.index(col, row);
        (self.data.vx[index], self.data.vy[index])
    }

    /// Pre-normalization length at `(col, row)`.
    #[inline]
    pub fn magnitude(&self, col: usize, row: usize) -> f64 {
        self.data.magnitude[self.grid.index(col, row)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_normalizes_and_keeps_length() {
        let v = Vector::from_raw(3.0, -4.0);
        assert!((v.vx - 0.6).abs() < 1e-12);
        assert!((v.vy + 0.8).abs() < 1e-12);
        assert!((v.magnitude - 5.0).abs() < 1e-12);
    }

    #[test]
    fn from_raw_maps_degenerate_input_to_zero() {
        assert_eq!(Vector::from_raw(0.0, 0.0), Vector::ZERO);
        assert_eq!(Vector::from_raw(f64::NAN, 1.0), Vector::ZERO);
        assert_eq!(Vector::from_raw(f64::INFINITY, 0.0), Vector::ZERO);
        assert!(Vector::ZERO.is_zero());
    }

    #[test]
    fn from_parts_rejects_short_buffer() {
        let grid = Grid::new(2, 2).unwrap();
        let result = VectorFieldData::from_parts(&grid, vec![0.0; 4], vec![0.0; 3], vec![0.0; 4]);
        assert!(matches!(result, Err(EngineError::SizeMismatch { .. })));
    }

    #[test]
    fn reader_rejects_field_from_other_grid() {
        let small = Grid::new(2, 2).unwrap();
        let large = Grid::new(3, 3).unwrap();
        let data = VectorFieldData::for_grid(&small);
        assert!(matches!(
            VectorFieldReader::new(&large, &data),
            Err(EngineError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn reader_returns_values_by_pixel() {
        let grid = Grid::new(3, 2).unwrap();
        let mut data = VectorFieldData::for_grid(&grid);
        data.set(grid.index(2, 1), Vector::from_raw(0.0, 2.0));
        let reader = VectorFieldReader::new(&grid, &data).unwrap();
        assert_eq!(reader.vector(2, 1), (0.0, 1.0));
        assert_eq!(reader.magnitude(2, 1), 2.0);
        assert_eq!(reader.magnitude(0, 0), 0.0);
    }

    #[test]
    fn json_round_trip_rebuilds_parallel_buffers() {
        let grid = Grid::new(2, 1).unwrap();
        let mut data = VectorFieldData::for_grid(&grid);
        data.set(1, Vector::from_raw(0.0, -2.0));
        let text = serde_json::to_string(&data).unwrap();
        let back: VectorFieldData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.get(1), Vector { vx: 0.0, vy: -1.0, magnitude: 2.0 });

        let ragged = r#"{"width": 2, "height": 1, "vx": [0.0, 0.0], "vy": [0.0], "magnitude": [0.0, 0.0]}"#;
        assert!(serde_json::from_str::<VectorFieldData>(ragged).is_err());
    }
}
