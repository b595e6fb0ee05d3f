#![deny(unsafe_code)]
//! Line Integral Convolution.
//!
//! For every visible pixel, [`LicCalculator`] traces a streamline forward
//! and backward through a precomputed vector field and averages the source
//! texture along it, weighting each pixel by the length of the path inside
//! it. The texture and field live on a [`MarginGrid`] so streamlines can run
//! past the visible edge.

pub mod plane;
pub mod trace;

use std::time::Instant;

use plane_engine_core::compute::{ProgressCounter, LIC_PROGRESS_INTERVAL};
use plane_engine_core::{
    EngineError, Grid, GridBlueprint, MarginGrid, MarginGridBlueprint, ScalarField,
    VectorFieldData, VectorFieldReader, SENTINEL,
};
use serde::{Deserialize, Serialize};

pub use plane::{LicPlane, LicPlaneKind, Texture};
pub use trace::{next_area, Step};

/// Streamline length settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicParams {
    pub max_length: f64,
    #[serde(default)]
    pub min_length: f64,
    /// When positive, a pixel's length is `magnitude · strength` clamped to
    /// `[min_length, max_length]`; otherwise every pixel uses `max_length`.
    #[serde(default = "LicParams::disabled_strength")]
    pub strength: f64,
}

impl LicParams {
    fn disabled_strength() -> f64 {
        -1.0
    }

    /// Fixed-length streamlines.
    pub fn fixed(max_length: f64) -> Self {
        Self {
            max_length,
            min_length: 0.0,
            strength: Self::disabled_strength(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.max_length > 0.0) || !self.max_length.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "max_length".into(),
                reason: format!("must be positive and finite, got {}", self.max_length),
            });
        }
        if !(self.min_length >= 0.0) || self.min_length > self.max_length {
            return Err(EngineError::InvalidParameter {
                name: "min_length".into(),
                reason: format!(
                    "must be in [0, max_length = {}], got {}",
                    self.max_length, self.min_length
                ),
            });
        }
        if !self.strength.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "strength".into(),
                reason: format!("must be finite, got {}", self.strength),
            });
        }
        Ok(())
    }

    /// Streamline length for a pixel with field magnitude `magnitude`.
    #[inline]
    pub fn length_for(&self, magnitude: f64) -> f64 {
        if self.strength > 0.0 {
            (magnitude * self.strength)
                .min(self.max_length)
                .max(self.min_length)
        } else {
            self.max_length
        }
    }

    /// Margin that keeps every streamline inside the source grid.
    pub fn margin(&self) -> usize {
        2 * self.max_length.ceil() as usize
    }
}

/// Convolves a texture along a vector field, both sampled on `source_grid`,
/// for every pixel of `target_grid`.
#[derive(Debug, Clone, Copy)]
pub struct LicCalculator<'a> {
    source_grid: &'a MarginGrid,
    image: &'a ScalarField,
    field: VectorFieldReader<'a>,
    target_grid: &'a Grid,
}

impl<'a> LicCalculator<'a> {
    /// Fails if the texture or field was not computed on `source_grid`, or
    /// if `target_grid` differs in size from its center area.
    pub fn new(
        source_grid: &'a MarginGrid,
        image: &'a ScalarField,
        field: &'a VectorFieldData,
        target_grid: &'a Grid,
    ) -> Result<Self, EngineError> {
        image.ensure_matches(source_grid.grid())?;
        let field = VectorFieldReader::new(source_grid.grid(), field)?;
        let base = source_grid.base_resolution();
        if base.width != target_grid.width() || base.height != target_grid.height() {
            return Err(EngineError::DimensionMismatch {
                lhs_w: base.width,
                lhs_h: base.height,
                rhs_w: target_grid.width(),
                rhs_h: target_grid.height(),
            });
        }
        Ok(Self {
            source_grid,
            image,
            field,
            target_grid,
        })
    }

    /// Brightness in `[0, 1]` for every target pixel, or [`SENTINEL`] where
    /// the field has no direction.
    pub fn calculate(&self, params: &LicParams, progress: &mut dyn FnMut(u8)) -> ScalarField {
        tracing::debug!(
            width = self.target_grid.width(),
            height = self.target_grid.height(),
            margin = self.source_grid.margin(),
            max_length = params.max_length,
            min_length = params.min_length,
            strength = params.strength,
            "calculating lic"
        );
        let started = Instant::now();
        let width = self.target_grid.width();
        let margin = self.source_grid.margin();
        let mut out = ScalarField::for_grid(self.target_grid);
        let mut counter = ProgressCounter::new(LIC_PROGRESS_INTERVAL, self.target_grid.size());
        for row in 0..self.target_grid.height() {
            for col in 0..width {
                let magnitude = self.field.magnitude(col + margin, row + margin);
                let value = if magnitude > 0.0 {
                    self.pixel(col + margin, row + margin, params.length_for(magnitude))
                } else {
                    SENTINEL
                };
                out.set(col, row, value);
                counter.tick(row * width, progress);
            }
        }
        tracing::info!(elapsed_s = started.elapsed().as_secs_f64(), "lic done");
        out
    }

    /// Averaged brightness of the streamline through source pixel
    /// `(col, row)`.
    fn pixel(&self, col: usize, row: usize, length: f64) -> f64 {
        if !(length > 0.0) {
            return self.image.get(col, row).min(1.0);
        }
        let forward = self.trace(col, row, length, 1.0);
        let backward = self.trace(col, row, length, -1.0);
        match (forward, backward) {
            (Some(f), Some(b)) => ((f + b) / (2.0 * length)).min(1.0),
            _ => SENTINEL,
        }
    }

    /// Texture integrated along `length` arc units in `direction` (`±1`).
    ///
    /// Returns `None` if the starting pixel has no direction. A pixel
    /// further along without a usable direction reuses the last good one;
    /// the walk ends early if it would leave the source grid.
    fn trace(&self, col: usize, row: usize, length: f64, direction: f64) -> Option<f64> {
        let (start_vx, start_vy) = self.field.vector(col, row);
        if !usable(start_vx, start_vy) {
            return None;
        }
        let grid = self.source_grid.grid();
        let (width, height) = (grid.width() as isize, grid.height() as isize);
        let max_steps = max_steps(length);

        let (mut vx, mut vy) = (start_vx, start_vy);
        let (mut col, mut row) = (col as isize, row as isize);
        let (mut x, mut y) = (0.5, 0.5);
        let mut rest = length;
        let mut brightness = 0.0;
        for _ in 0..max_steps {
            let Some(step) = trace::next_area(x, y, vx * direction, vy * direction) else {
                break;
            };
            brightness += self.image.get(col as usize, row as usize) * step.distance.min(rest);
            rest -= step.distance;
            if rest <= 0.0 {
                break;
            }
            col += step.col_diff;
            row += step.row_diff;
            if col < 0 || row < 0 || col >= width || row >= height {
                break;
            }
            x = step.x;
            y = step.y;
            let (next_vx, next_vy) = self.field.vector(col as usize, row as usize);
            if usable(next_vx, next_vy) {
                vx = next_vx;
                vy = next_vy;
            }
        }
        Some(brightness)
    }
}

#[inline]
fn usable(vx: f64, vy: f64) -> bool {
    !(vx.is_nan() || vy.is_nan() || (vx == 0.0 && vy == 0.0))
}

/// Bounds the walk when near-corner crossings make steps vanishingly short.
fn max_steps(length: f64) -> usize {
    4 * ((length / trace::BORDER_OFFSET).ceil() as usize + 1)
}

/// Self-contained request for a background LIC calculation.
///
/// Owns the texture and field buffers so it can move to a worker thread or
/// cross a process boundary as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicSetup {
    pub source_grid: MarginGridBlueprint,
    pub image: ScalarField,
    pub field: VectorFieldData,
    pub target_grid: GridBlueprint,
    pub max_length: f64,
    pub min_length: f64,
    pub strength: f64,
}

impl LicSetup {
    pub fn params(&self) -> LicParams {
        LicParams {
            max_length: self.max_length,
            min_length: self.min_length,
            strength: self.strength,
        }
    }

    pub fn run(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        let params = self.params();
        params.validate()?;
        let source_grid = MarginGrid::from_blueprint(&self.source_grid)?;
        let target_grid = Grid::from_blueprint(&self.target_grid)?;
        let calculator = LicCalculator::new(&source_grid, &self.image, &self.field, &target_grid)?;
        let out = calculator.calculate(&params, progress);
        progress(100);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plane_engine_core::{is_sentinel, GridRange, Resolution, Vector, Xorshift64};

    struct Fixture {
        source: MarginGrid,
        target: Grid,
        image: ScalarField,
        field: VectorFieldData,
    }

    fn fixture(width: usize, height: usize, margin: usize) -> Fixture {
        let range = GridRange::new(0.0, 1.0, 0.0).unwrap();
        let source = MarginGrid::new(Resolution::new(width, height), range, margin).unwrap();
        let target = Grid::with_range(width, height, range).unwrap();
        let image = ScalarField::for_grid(source.grid());
        let field = VectorFieldData::for_grid(source.grid());
        Fixture {
            source,
            target,
            image,
            field,
        }
    }

    impl Fixture {
        fn fill_field(&mut self, vector: Vector) {
            for i in 0..self.field.len() {
                self.field.set(i, vector);
            }
        }

        fn fill_image(&mut self, value: f64) {
            self.image.data_mut().fill(value);
        }

        fn run(&self, params: &LicParams) -> ScalarField {
            LicCalculator::new(&self.source, &self.image, &self.field, &self.target)
                .unwrap()
                .calculate(params, &mut |_| {})
        }
    }

    #[test]
    fn uniform_field_and_texture_reproduce_the_texture() {
        for vector in [
            Vector::from_raw(1.0, 0.0),
            Vector::from_raw(1.0, 1.0),
            Vector::from_raw(-0.3, 0.8),
        ] {
            let mut f = fixture(8, 6, 20);
            f.fill_field(vector);
            f.fill_image(0.4);
            let out = f.run(&LicParams::fixed(10.0));
            for &v in out.data() {
                assert!((v - 0.4).abs() < 1e-9, "{vector:?}: {v}");
            }
        }
    }

    #[test]
    fn zero_magnitude_yields_sentinel() {
        let mut f = fixture(5, 5, 4);
        f.fill_field(Vector::from_raw(0.0, 1.0));
        f.fill_image(1.0);
        let hole = f.source.index_for_center_area(2, 3);
        f.field.set(hole, Vector::ZERO);
        let out = f.run(&LicParams::fixed(2.0));
        assert!(is_sentinel(out.get(2, 3)));
        assert_eq!(out.data().iter().filter(|v| is_sentinel(**v)).count(), 1);
    }

    #[test]
    fn gaps_along_the_path_reuse_the_previous_direction() {
        let mut f = fixture(7, 3, 8);
        f.fill_field(Vector::from_raw(1.0, 0.0));
        f.fill_image(0.7);
        // Neighbors trace straight through the hole; only the hole itself
        // is undefined.
        let hole = f.source.index_for_center_area(4, 1);
        f.field.set(hole, Vector::ZERO);
        let out = f.run(&LicParams::fixed(4.0));
        assert!((out.get(3, 1) - 0.7).abs() < 1e-9);
        assert!((out.get(5, 1) - 0.7).abs() < 1e-9);
        assert!(is_sentinel(out.get(4, 1)));
    }

    #[test]
    fn strength_modulates_streamline_length() {
        let mut f = fixture(5, 5, 10);
        f.fill_field(Vector::from_raw(0.5, 0.0));
        let center = f.source.index_for_center_area(2, 2);
        f.image.data_mut()[center] = 1.0;

        // Only the center pixel is lit: half a pixel each way over 2·length.
        let fixed = f.run(&LicParams::fixed(5.0));
        assert!((fixed.get(2, 2) - 0.1).abs() < 1e-12);

        let modulated = LicParams {
            max_length: 5.0,
            min_length: 0.0,
            strength: 4.0,
        };
        assert_eq!(modulated.length_for(0.5), 2.0);
        assert!((f.run(&modulated).get(2, 2) - 0.25).abs() < 1e-12);

        let clamped_low = LicParams {
            max_length: 5.0,
            min_length: 1.0,
            strength: 0.1,
        };
        assert_eq!(clamped_low.length_for(0.5), 1.0);
        assert!((f.run(&clamped_low).get(2, 2) - 0.5).abs() < 1e-12);

        let clamped_high = LicParams {
            max_length: 5.0,
            min_length: 0.0,
            strength: 100.0,
        };
        assert_eq!(clamped_high.length_for(0.5), 5.0);
    }

    #[test]
    fn bright_texture_is_capped_at_one() {
        let mut f = fixture(4, 4, 6);
        f.fill_field(Vector::from_raw(0.0, -1.0));
        f.fill_image(3.0);
        let out = f.run(&LicParams::fixed(3.0));
        assert!(out.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let f = fixture(4, 4, 2);
        let wrong_target = Grid::new(5, 4).unwrap();
        assert!(matches!(
            LicCalculator::new(&f.source, &f.image, &f.field, &wrong_target),
            Err(EngineError::DimensionMismatch { .. })
        ));
        let wrong_image = ScalarField::for_grid(&f.target);
        assert!(matches!(
            LicCalculator::new(&f.source, &wrong_image, &f.field, &f.target),
            Err(EngineError::DimensionMismatch { .. })
        ));
        let wrong_field = VectorFieldData::for_grid(&f.target);
        assert!(matches!(
            LicCalculator::new(&f.source, &f.image, &wrong_field, &f.target),
            Err(EngineError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn params_validation() {
        assert!(LicParams::fixed(10.0).validate().is_ok());
        assert!(LicParams::fixed(0.0).validate().is_err());
        assert!(LicParams::fixed(f64::INFINITY).validate().is_err());
        let inverted = LicParams {
            max_length: 2.0,
            min_length: 3.0,
            strength: 1.0,
        };
        assert!(inverted.validate().is_err());
        assert_eq!(LicParams::fixed(10.0).margin(), 20);
        assert_eq!(LicParams::fixed(2.5).margin(), 6);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: LicParams = serde_json::from_str(r#"{"maxLength": 20}"#).unwrap();
        assert_eq!(params, LicParams::fixed(20.0));
    }

    #[test]
    fn setup_runs_like_the_calculator() {
        let mut f = fixture(6, 4, 4);
        f.fill_field(Vector::from_raw(1.0, 2.0));
        let mut rng = Xorshift64::new(3);
        for v in f.image.data_mut() {
            *v = rng.next_f64();
        }
        let params = LicParams::fixed(2.0);
        let direct = f.run(&params);
        let setup = LicSetup {
            source_grid: f.source.blueprint(),
            image: f.image.clone(),
            field: f.field.clone(),
            target_grid: f.target.blueprint(),
            max_length: 2.0,
            min_length: 0.0,
            strength: -1.0,
        };
        let mut last = 0;
        assert_eq!(setup.run(&mut |p| last = p).unwrap(), direct);
        assert_eq!(last, 100);

        let wire = serde_json::to_string(&setup).unwrap();
        assert!(wire.contains("\"sourceGrid\"") && wire.contains("\"maxLength\""));
        let restored: LicSetup = serde_json::from_str(&wire).unwrap();
        assert_eq!(restored.run(&mut |_| {}).unwrap(), direct);
    }

    #[test]
    fn progress_is_reported_on_large_grids() {
        let mut f = fixture(300, 200, 2);
        f.fill_field(Vector::from_raw(1.0, 0.0));
        let calculator = LicCalculator::new(&f.source, &f.image, &f.field, &f.target).unwrap();
        let mut reports = Vec::new();
        calculator.calculate(&LicParams::fixed(1.0), &mut |p| reports.push(p));
        assert_eq!(reports.len(), 2);
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert!(reports.iter().all(|&p| p <= 100));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            #[test]
            fn tracing_stays_inside_the_source_grid(
                seed: u64,
                width in 1_usize..12,
                height in 1_usize..12,
                max_length in 0.5_f64..6.0,
                tight in any::<bool>(),
            ) {
                let params = LicParams::fixed(max_length);
                let margin = if tight { max_length.ceil() as usize } else { params.margin() };
                let mut f = fixture(width, height, margin);
                let mut rng = Xorshift64::new(seed);
                for i in 0..f.field.len() {
                    let angle = rng.next_f64() * std::f64::consts::TAU;
                    let vector = if rng.chance(0.05) {
                        Vector::ZERO
                    } else {
                        Vector::from_raw(angle.cos(), angle.sin())
                    };
                    f.field.set(i, vector);
                }
                for v in f.image.data_mut() {
                    *v = rng.next_f64();
                }
                let out = f.run(&params);
                for &v in out.data() {
                    prop_assert!(is_sentinel(v) || (0.0..=1.0).contains(&v), "{v}");
                }
            }
        }
    }
}
