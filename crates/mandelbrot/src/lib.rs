#![deny(unsafe_code)]
//! Mandelbrot escape-time fields.
//!
//! Two per-pixel outputs over a [`Grid`]: the number of `z ← z² + c`
//! iterations before `|z|` reaches the escape value, and a boundary distance
//! estimate derived from the iterated derivative `dz/dc`.

pub mod plane;

use std::time::Instant;

use plane_engine_core::compute::{ProgressCounter, MANDELBROT_PROGRESS_INTERVAL};
use plane_engine_core::{EngineError, Grid, GridBlueprint, ScalarField};
use serde::{Deserialize, Serialize};

pub use plane::MandelbrotPlane;

/// Escape radius of the classic iteration-count picture.
pub const DEFAULT_ESCAPE_VALUE: f64 = 2.0;

const MIN_AUTO_ITERATIONS: f64 = 255.0;
const MAX_AUTO_ITERATIONS: f64 = 10_000.0;
const AUTO_ITERATIONS_PER_ZOOM: f64 = 100.0;
const MAX_USER_ITERATIONS: usize = 100_000;

/// Iteration budget for a view of horizontal span `span`.
///
/// A non-zero `user_max_iterations` wins, clamped to `[1, 100000]`. Zero
/// means automatic: `255 + 100·ln(initial_span / span)`, clamped to
/// `[255, 10000]` and rounded up, so deeper zooms get more iterations.
pub fn estimate_max_iterations(user_max_iterations: usize, initial_span: f64, span: f64) -> usize {
    if user_max_iterations != 0 {
        return user_max_iterations.clamp(1, MAX_USER_ITERATIONS);
    }
    let log_zoom = (initial_span / span).ln();
    let guess = MIN_AUTO_ITERATIONS + AUTO_ITERATIONS_PER_ZOOM * log_zoom;
    if guess.is_nan() {
        return MIN_AUTO_ITERATIONS as usize;
    }
    guess.clamp(MIN_AUTO_ITERATIONS, MAX_AUTO_ITERATIONS).ceil() as usize
}

/// Escape-time calculator for a fixed escape radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MandelbrotCalculator {
    escape_value: f64,
    escape_value_squared: f64,
}

impl Default for MandelbrotCalculator {
    fn default() -> Self {
        Self {
            escape_value: DEFAULT_ESCAPE_VALUE,
            escape_value_squared: DEFAULT_ESCAPE_VALUE * DEFAULT_ESCAPE_VALUE,
        }
    }
}

impl MandelbrotCalculator {
    /// Fails with `InvalidParameter` unless `escape_value` is positive and finite.
    pub fn new(escape_value: f64) -> Result<Self, EngineError> {
        if !(escape_value > 0.0) || !escape_value.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "escape_value".into(),
                reason: format!("must be positive and finite, got {escape_value}"),
            });
        }
        Ok(Self {
            escape_value,
            escape_value_squared: escape_value * escape_value,
        })
    }

    pub fn escape_value(&self) -> f64 {
        self.escape_value
    }

    /// Iterations of `z ← z² + c` from `z = 0` until `|z|² ≥ escape²`,
    /// or `max_iterations` if the orbit stays bounded.
    #[inline]
    pub fn iterations_at(&self, re_c: f64, im_c: f64, max_iterations: usize) -> usize {
        let mut re_z = 0.0;
        let mut im_z = 0.0;
        let mut iteration = 0;
        while re_z * re_z + im_z * im_z < self.escape_value_squared && iteration < max_iterations {
            let re_next = re_z * re_z - im_z * im_z + re_c;
            im_z = 2.0 * re_z * im_z + im_c;
            re_z = re_next;
            iteration += 1;
        }
        iteration
    }

    /// Boundary distance estimate `2·|z|·ln|z| / |dz|` at the first iterate
    /// with `|z| > escape`, or `0` if the orbit does not escape.
    ///
    /// The derivative is advanced with the freshly updated `z`.
    #[inline]
    pub fn distance_at(&self, re_c: f64, im_c: f64, max_iterations: usize) -> f64 {
        let mut re_z = 0.0;
        let mut im_z = 0.0;
        let mut re_dz = 0.0;
        let mut im_dz = 0.0;
        for _ in 0..max_iterations {
            let re_next = re_z * re_z - im_z * im_z + re_c;
            im_z = 2.0 * re_z * im_z + im_c;
            re_z = re_next;

            let re_dz_next = 2.0 * (re_z * re_dz - im_z * im_dz) + 1.0;
            im_dz = 2.0 * (re_z * im_dz + im_z * re_dz);
            re_dz = re_dz_next;

            let abs_z = (re_z * re_z + im_z * im_z).sqrt();
            if abs_z > self.escape_value {
                let abs_dz = (re_dz * re_dz + im_dz * im_dz).sqrt();
                return 2.0 * abs_z * abs_z.ln() / abs_dz;
            }
        }
        0.0
    }

    /// Iteration count for every pixel of `grid`.
    pub fn calculate_iterations(
        &self,
        grid: &Grid,
        max_iterations: usize,
        progress: &mut dyn FnMut(u8),
    ) -> ScalarField {
        tracing::debug!(
            width = grid.width(),
            height = grid.height(),
            max_iterations,
            escape_value = self.escape_value,
            "calculating mandelbrot iterations"
        );
        let started = Instant::now();
        let field = self.fill(grid, progress, |x, y| {
            self.iterations_at(x, y, max_iterations) as f64
        });
        tracing::info!(
            elapsed_s = started.elapsed().as_secs_f64(),
            "mandelbrot iterations done"
        );
        field
    }

    /// Distance estimate for every pixel of `grid`.
    pub fn calculate_distances(
        &self,
        grid: &Grid,
        max_iterations: usize,
        progress: &mut dyn FnMut(u8),
    ) -> ScalarField {
        tracing::debug!(
            width = grid.width(),
            height = grid.height(),
            max_iterations,
            escape_value = self.escape_value,
            "calculating mandelbrot distances"
        );
        let started = Instant::now();
        let field = self.fill(grid, progress, |x, y| self.distance_at(x, y, max_iterations));
        tracing::info!(
            elapsed_s = started.elapsed().as_secs_f64(),
            "mandelbrot distances done"
        );
        field
    }

    fn fill(
        &self,
        grid: &Grid,
        progress: &mut dyn FnMut(u8),
        per_pixel: impl Fn(f64, f64) -> f64,
    ) -> ScalarField {
        let mut out = ScalarField::for_grid(grid);
        let mut counter = ProgressCounter::new(MANDELBROT_PROGRESS_INTERVAL, grid.size());
        let width = grid.width();
        let data = out.data_mut();
        for row in 0..grid.height() {
            for col in 0..width {
                let (x, y) = grid.pixel_to_math(col, row);
                data[grid.index(col, row)] = per_pixel(x, y);
                counter.tick(row * width, progress);
            }
        }
        out
    }
}

/// Which escape-time output a setup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationKind {
    Iterations,
    Distance,
}

/// Self-contained request for a background Mandelbrot calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandelbrotSetup {
    pub grid: GridBlueprint,
    pub kind: CalculationKind,
    pub max_iterations: usize,
    pub escape_value: f64,
}

impl MandelbrotSetup {
    /// Rebuilds the grid and runs the requested calculation.
    pub fn run(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        let grid = Grid::from_blueprint(&self.grid)?;
        let calculator = MandelbrotCalculator::new(self.escape_value)?;
        Ok(match self.kind {
            CalculationKind::Iterations => {
                calculator.calculate_iterations(&grid, self.max_iterations, progress)
            }
            CalculationKind::Distance => {
                calculator.calculate_distances(&grid, self.max_iterations, progress)
            }
        })
    }
}
