//! Iteration-count and distance-estimate Mandelbrot planes.

use plane_engine_core::color::{ColorMapper, BLACK, WHITE};
use plane_engine_core::params::{param_f64, param_range, param_usize};
use plane_engine_core::{ColorScheme, Engine, EngineError, Grid, GridRange, ScalarField};
use serde_json::{json, Value};

use crate::{estimate_max_iterations, CalculationKind, MandelbrotCalculator, MandelbrotSetup};

/// Initial view of both planes: `[-3, 1.8]` centered on the real axis.
pub const INITIAL_RANGE: GridRange = GridRange {
    x_min: -3.0,
    x_max: 1.8,
    y_center: 0.0,
};

const ITERATIONS_MAX_ITERATIONS: usize = 255;
const ITERATIONS_ESCAPE_VALUE: f64 = 2.0;
const ITERATIONS_CYCLE_LENGTH: f64 = 255.0;
const DISTANCE_MAX_ITERATIONS: usize = 2000;
const DISTANCE_ESCAPE_VALUE: f64 = 100.0;
/// Distance bands per horizontal span and escape radius.
const DISTANCE_BANDS: f64 = 50.0;

/// A Mandelbrot plane showing either raw iteration counts or the
/// boundary distance estimate, each as a black/white cycle.
pub struct MandelbrotPlane {
    kind: CalculationKind,
    grid: Grid,
    requested_iterations: usize,
    max_iterations: usize,
    calculator: MandelbrotCalculator,
    scheme: ColorScheme,
}

impl MandelbrotPlane {
    /// Builds a plane of `kind` over `range`.
    ///
    /// `requested_iterations == 0` selects the zoom-dependent estimate.
    pub fn new(
        kind: CalculationKind,
        width: usize,
        height: usize,
        range: GridRange,
        requested_iterations: usize,
        escape_value: f64,
    ) -> Result<Self, EngineError> {
        let grid = Grid::with_range(width, height, range)?;
        let calculator = MandelbrotCalculator::new(escape_value)?;
        let max_iterations =
            estimate_max_iterations(requested_iterations, INITIAL_RANGE.x_span(), range.x_span());
        let scheme = match kind {
            CalculationKind::Iterations => ColorScheme::Cyclic {
                mapper: ColorMapper::black_white(ITERATIONS_CYCLE_LENGTH, BLACK)?,
                inside: Some(max_iterations as f64),
            },
            CalculationKind::Distance => ColorScheme::Cyclic {
                mapper: ColorMapper::black_white(
                    range.x_span() / escape_value / DISTANCE_BANDS,
                    WHITE,
                )?,
                inside: Some(0.0),
            },
        };
        Ok(Self {
            kind,
            grid,
            requested_iterations,
            max_iterations,
            calculator,
            scheme,
        })
    }

    /// Reads `range`, `max_iterations`, and `escape_value` from `params`.
    ///
    /// An explicit `range` argument overrides the one in `params`.
    pub fn from_json(
        kind: CalculationKind,
        width: usize,
        height: usize,
        range: Option<GridRange>,
        params: &Value,
    ) -> Result<Self, EngineError> {
        let (default_iterations, default_escape) = defaults(kind);
        let range = range.unwrap_or_else(|| param_range(params, "range", INITIAL_RANGE));
        Self::new(
            kind,
            width,
            height,
            range,
            param_usize(params, "max_iterations", default_iterations),
            param_f64(params, "escape_value", default_escape),
        )
    }

    pub fn kind(&self) -> CalculationKind {
        self.kind
    }

    /// Iteration budget after zoom estimation and clamping.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The worker request `compute` runs.
    pub fn setup(&self) -> MandelbrotSetup {
        MandelbrotSetup {
            grid: self.grid.blueprint(),
            kind: self.kind,
            max_iterations: self.max_iterations,
            escape_value: self.calculator.escape_value(),
        }
    }
}

fn defaults(kind: CalculationKind) -> (usize, f64) {
    match kind {
        CalculationKind::Iterations => (ITERATIONS_MAX_ITERATIONS, ITERATIONS_ESCAPE_VALUE),
        CalculationKind::Distance => (DISTANCE_MAX_ITERATIONS, DISTANCE_ESCAPE_VALUE),
    }
}

impl Engine for MandelbrotPlane {
    fn compute(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        self.setup().run(progress)
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn params(&self) -> Value {
        json!({
            "range": self.grid.range().to_string(),
            "max_iterations": self.requested_iterations,
            "escape_value": self.calculator.escape_value(),
        })
    }

    fn param_schema(&self) -> Value {
        let (default_iterations, default_escape) = defaults(self.kind);
        json!({
            "range": {
                "type": "string",
                "default": INITIAL_RANGE.to_string(),
                "description": "Math range as xMin_xMax_yCenter"
            },
            "max_iterations": {
                "type": "integer",
                "default": default_iterations,
                "min": 0,
                "max": 100_000,
                "description": "Iteration cap; 0 estimates it from the zoom depth"
            },
            "escape_value": {
                "type": "number",
                "default": default_escape,
                "min": 0.0,
                "description": "Escape radius for |z|"
            }
        })
    }

    fn color_scheme(&self) -> ColorScheme {
        self.scheme.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plane_engine_core::Rgb;

    #[test]
    fn iterations_plane_uses_classic_defaults() {
        let plane =
            MandelbrotPlane::from_json(CalculationKind::Iterations, 48, 32, None, &json!({}))
                .unwrap();
        assert_eq!(plane.max_iterations(), 255);
        assert_eq!(plane.grid().range(), INITIAL_RANGE);
        assert_eq!(plane.params()["escape_value"], 2.0);
    }

    #[test]
    fn distance_plane_uses_deep_defaults() {
        let plane =
            MandelbrotPlane::from_json(CalculationKind::Distance, 48, 32, None, &json!({}))
                .unwrap();
        assert_eq!(plane.max_iterations(), 2000);
        assert_eq!(plane.params()["escape_value"], 100.0);
    }

    #[test]
    fn explicit_range_overrides_params() {
        let range = GridRange::new(-1.0, 0.0, 0.2).unwrap();
        let plane = MandelbrotPlane::from_json(
            CalculationKind::Iterations,
            8,
            8,
            Some(range),
            &json!({"range": "-3_1_0"}),
        )
        .unwrap();
        assert_eq!(plane.grid().range(), range);
    }

    #[test]
    fn zero_iterations_requests_estimate() {
        let range = GridRange::new(-0.75, -0.75 + 4.8 / 1000.0, 0.1).unwrap();
        let plane =
            MandelbrotPlane::new(CalculationKind::Iterations, 8, 8, range, 0, 2.0).unwrap();
        assert!(plane.max_iterations() > 255);
        assert_eq!(plane.params()["max_iterations"], 0);
    }

    #[test]
    fn inside_points_use_fallback_color() {
        let plane =
            MandelbrotPlane::from_json(CalculationKind::Iterations, 8, 8, None, &json!({}))
                .unwrap();
        let scheme = plane.color_scheme();
        assert_eq!(scheme.color(255.0), BLACK);
        assert_eq!(scheme.color(100.0), Rgb::gray(100.0 / 255.0));

        let plane =
            MandelbrotPlane::from_json(CalculationKind::Distance, 8, 8, None, &json!({}))
                .unwrap();
        assert_eq!(plane.color_scheme().color(0.0), WHITE);
    }

    #[test]
    fn compute_equals_a_setup_sent_as_json() {
        for kind in [CalculationKind::Iterations, CalculationKind::Distance] {
            let plane = MandelbrotPlane::from_json(
                kind,
                24,
                16,
                None,
                &json!({"range": "-2_1_0.5", "max_iterations": 300}),
            )
            .unwrap();
            let wire = serde_json::to_string(&plane.setup()).unwrap();
            let setup: MandelbrotSetup = serde_json::from_str(&wire).unwrap();
            assert_eq!(setup, plane.setup());
            assert_eq!(
                plane.compute(&mut |_| {}).unwrap(),
                setup.run(&mut |_| {}).unwrap()
            );
        }
    }

    #[test]
    fn compute_matches_grid_size() {
        let plane =
            MandelbrotPlane::from_json(CalculationKind::Distance, 20, 10, None, &json!({}))
                .unwrap();
        let out = plane.compute(&mut |_| {}).unwrap();
        assert_eq!(out.width(), 20);
        assert_eq!(out.height(), 10);
        assert!(out.data().iter().all(|&d| d >= 0.0));
    }

    #[test]
    fn bad_escape_value_is_rejected() {
        let result = MandelbrotPlane::from_json(
            CalculationKind::Distance,
            8,
            8,
            None,
            &json!({"escape_value": -1.0}),
        );
        assert!(matches!(result, Err(EngineError::InvalidParameter { .. })));
    }

    #[test]
    fn schema_lists_all_params() {
        let plane =
            MandelbrotPlane::from_json(CalculationKind::Iterations, 8, 8, None, &json!({}))
                .unwrap();
        let schema = plane.param_schema();
        for key in ["range", "max_iterations", "escape_value"] {
            assert!(schema.get(key).is_some(), "missing {key}");
        }
    }
}
