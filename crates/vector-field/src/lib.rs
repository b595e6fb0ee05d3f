#![deny(unsafe_code)]
//! Vector fields over the math plane and their dense per-pixel form.
//!
//! A [`VectorField`] is any analytic function of a math-space point. The
//! [`precompute`] driver evaluates it at every pixel of a grid, or at a
//! reduced resolution followed by bilinear upsampling when the function is
//! expensive.

pub mod charge;
pub mod fluid;
pub mod kernel;
pub mod mandelbrot;
pub mod resample;
pub mod weather;

use std::time::Instant;

use plane_engine_core::{EngineError, Grid, Resolution, Vector, VectorFieldData};
use serde::{Deserialize, Serialize};

pub use charge::{Charge, ChargeField};
pub use fluid::{FluidFlowConfig, FluidFlowField, Obstacle, PerlinSettings, PointSource};
pub use kernel::GradientKernel;
pub use mandelbrot::MandelbrotField;
pub use weather::{PressureRegion, WeatherVectorField};

/// A direction and strength at every point of the math plane.
///
/// Implementations must be deterministic: the same point yields the same
/// vector.
pub trait VectorField: Send + Sync {
    /// Field at math coordinate `(x, y)`, normalized with its raw length as
    /// `magnitude`. Points without a direction return [`Vector::ZERO`].
    fn compute_vector(&self, x: f64, y: f64) -> Vector;
}

/// How coarsely [`precompute`] samples the analytic function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleFactor {
    /// One evaluation per pixel.
    #[default]
    Unscaled,
    Factor2,
    Factor4,
    Factor6,
    Factor8,
    Factor10,
    Factor12,
    Factor14,
    Factor16,
}

impl ScaleFactor {
    /// Pixels per low-resolution sample along each axis; `1` when unscaled.
    pub fn factor(self) -> usize {
        match self {
            ScaleFactor::Unscaled => 1,
            ScaleFactor::Factor2 => 2,
            ScaleFactor::Factor4 => 4,
            ScaleFactor::Factor6 => 6,
            ScaleFactor::Factor8 => 8,
            ScaleFactor::Factor10 => 10,
            ScaleFactor::Factor12 => 12,
            ScaleFactor::Factor14 => 14,
            ScaleFactor::Factor16 => 16,
        }
    }

    /// Accepts `0` or `1` for unscaled and the even factors `2..=16`.
    pub fn from_factor(factor: usize) -> Result<Self, EngineError> {
        Ok(match factor {
            0 | 1 => ScaleFactor::Unscaled,
            2 => ScaleFactor::Factor2,
            4 => ScaleFactor::Factor4,
            6 => ScaleFactor::Factor6,
            8 => ScaleFactor::Factor8,
            10 => ScaleFactor::Factor10,
            12 => ScaleFactor::Factor12,
            14 => ScaleFactor::Factor14,
            16 => ScaleFactor::Factor16,
            other => {
                return Err(EngineError::InvalidParameter {
                    name: "scale_factor".into(),
                    reason: format!("expected 0 or an even factor in 2..=16, got {other}"),
                })
            }
        })
    }
}

/// Evaluates `field` over every pixel of `grid`.
///
/// With a [`ScaleFactor`] other than `Unscaled`, the field is sampled on a
/// `ceil(width / f) × ceil(height / f)` grid over the same range and
/// bilinearly upsampled; the interpolated vector is renormalized and its
/// length becomes the magnitude.
pub fn precompute(
    field: &dyn VectorField,
    grid: &Grid,
    scale: ScaleFactor,
) -> Result<VectorFieldData, EngineError> {
    tracing::debug!(
        width = grid.width(),
        height = grid.height(),
        scale = ?scale,
        "precomputing vector field"
    );
    let started = Instant::now();
    let data = match scale {
        ScaleFactor::Unscaled => sample(field, grid),
        scaled => {
            let factor = scaled.factor();
            let resolution = grid.resolution();
            let low_grid = Grid::from_resolution(
                Resolution {
                    width: resolution.width.div_ceil(factor),
                    height: resolution.height.div_ceil(factor),
                    description: format!("{} scaled by factor {factor}", resolution.description),
                },
                grid.range(),
            )?;
            let low = sample(field, &low_grid);
            resample::upsample(&low_grid, &low, grid)?
        }
    };
    tracing::info!(elapsed_s = started.elapsed().as_secs_f64(), "vector field done");
    Ok(data)
}

fn sample(field: &dyn VectorField, grid: &Grid) -> VectorFieldData {
    let mut data = VectorFieldData::for_grid(grid);
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let (x, y) = grid.pixel_to_math(col, row);
            data.set(grid.index(col, row), field.compute_vector(x, y));
        }
    }
    data
}

/// The named fields a plane can put under its LIC texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Charges {
        charges: Vec<Charge>,
    },
    FluidFlow(FluidFlowConfig),
    Weather {
        regions: Vec<PressureRegion>,
        coriolis_force: f64,
    },
    /// Gradient of the distance estimate, which is computed over the same
    /// grid the field is precomputed on.
    Mandelbrot {
        max_iterations: usize,
        escape_value: f64,
    },
}

impl FieldKind {
    /// Builds the field for `grid`.
    pub fn build(&self, grid: &Grid) -> Result<Box<dyn VectorField>, EngineError> {
        Ok(match self {
            FieldKind::Charges { charges } => Box::new(ChargeField::new(charges.clone())),
            FieldKind::FluidFlow(config) => Box::new(FluidFlowField::new(config.clone())?),
            FieldKind::Weather {
                regions,
                coriolis_force,
            } => Box::new(WeatherVectorField::new(regions, *coriolis_force)?),
            FieldKind::Mandelbrot {
                max_iterations,
                escape_value,
            } => Box::new(MandelbrotField::new(
                grid.clone(),
                *max_iterations,
                *escape_value,
            )?),
        })
    }

    /// Builds the field for `grid` and samples it at every pixel.
    pub fn precompute(
        &self,
        grid: &Grid,
        scale: ScaleFactor,
    ) -> Result<VectorFieldData, EngineError> {
        let field = self.build(grid)?;
        precompute(field.as_ref(), grid, scale)
    }
}
