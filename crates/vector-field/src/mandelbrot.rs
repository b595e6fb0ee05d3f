//! Gradient field of the Mandelbrot boundary distance estimate.

use plane_engine_core::{EngineError, Grid, ScalarField, Vector};
use plane_engine_mandelbrot::MandelbrotCalculator;

use crate::kernel::GradientKernel;
use crate::VectorField;

/// Flow along the gradient of the distance estimate, sampled on the pixel
/// raster it was computed on. Points inside the set have no direction.
#[derive(Debug, Clone, PartialEq)]
pub struct MandelbrotField {
    grid: Grid,
    distances: ScalarField,
    kernel: GradientKernel,
}

impl MandelbrotField {
    /// Computes the distance estimate over `grid` up front.
    pub fn new(grid: Grid, max_iterations: usize, escape_value: f64) -> Result<Self, EngineError> {
        let calculator = MandelbrotCalculator::new(escape_value)?;
        let distances = calculator.calculate_distances(&grid, max_iterations, &mut |_| {});
        Self::from_distances(grid, distances)
    }

    /// Wraps an already computed distance field.
    pub fn from_distances(grid: Grid, distances: ScalarField) -> Result<Self, EngineError> {
        distances.ensure_matches(&grid)?;
        Ok(Self {
            grid,
            distances,
            kernel: GradientKernel::SOBEL_5,
        })
    }

    pub fn with_kernel(mut self, kernel: GradientKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn distances(&self) -> &ScalarField {
        &self.distances
    }

    /// Distance at a pixel, with coordinates clamped to the raster.
    fn distance(&self, col: isize, row: isize) -> f64 {
        let col = col.clamp(0, self.grid.width() as isize - 1) as usize;
        let row = row.clamp(0, self.grid.height() as isize - 1) as usize;
        self.distances.get(col, row)
    }
}

impl VectorField for MandelbrotField {
    fn compute_vector(&self, x: f64, y: f64) -> Vector {
        let (col, row) = self.grid.math_to_pixel(x, y);
        if self.distance(col, row) == 0.0 {
            return Vector::ZERO;
        }
        let (gx, gy) = self
            .kernel
            .gradient(|dc, dr| self.distance(col + dc, row + dr));
        Vector::from_raw(gx, gy)
    }
}
