//! A plane that shows a noise texture directly.

use plane_engine_core::color::BLACK;
use plane_engine_core::params::param_range;
use plane_engine_core::{
    ColorScheme, Engine, EngineError, Grid, GridRange, MarginGridBlueprint, ScalarField,
};
use serde_json::{json, Value};

use crate::{
    NoiseKind, NoiseSetup, DEFAULT_BERNOULLI_P, DEFAULT_GAUSSIAN_MEAN, DEFAULT_GAUSSIAN_RANGE,
    DEFAULT_GAUSSIAN_STANDARD_DEVIATION,
};

pub const INITIAL_RANGE: GridRange = GridRange {
    x_min: 0.0,
    x_max: 1.0,
    y_center: 0.0,
};

pub const DEFAULT_KIND: NoiseKind = NoiseKind::Gaussian {
    mean: DEFAULT_GAUSSIAN_MEAN,
    standard_deviation: DEFAULT_GAUSSIAN_STANDARD_DEVIATION,
    range: DEFAULT_GAUSSIAN_RANGE,
};

pub struct NoisePlane {
    grid: Grid,
    kind: NoiseKind,
    seed: u64,
}

impl NoisePlane {
    pub fn new(
        width: usize,
        height: usize,
        range: GridRange,
        kind: NoiseKind,
        seed: u64,
    ) -> Result<Self, EngineError> {
        kind.validate()?;
        Ok(Self {
            grid: Grid::with_range(width, height, range)?,
            kind,
            seed,
        })
    }

    /// An explicit `range` argument overrides the one in `params`.
    pub fn from_json(
        width: usize,
        height: usize,
        range: Option<GridRange>,
        params: &Value,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let range = range.unwrap_or_else(|| param_range(params, "range", INITIAL_RANGE));
        let kind = NoiseKind::from_json(params, DEFAULT_KIND)?;
        Self::new(width, height, range, kind, seed)
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// The worker request `compute` runs: the visible grid with no margin.
    pub fn setup(&self) -> NoiseSetup {
        NoiseSetup {
            grid: MarginGridBlueprint {
                resolution: self.grid.resolution().clone(),
                range: self.grid.range(),
                margin: 0,
            },
            kind: self.kind,
            seed: self.seed,
        }
    }
}

impl Engine for NoisePlane {
    fn compute(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        self.setup().run(progress)
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn params(&self) -> Value {
        let mut params = self.kind.to_params();
        params["range"] = json!(self.grid.range().to_string());
        params
    }

    fn param_schema(&self) -> Value {
        json!({
            "range": {
                "type": "string",
                "default": INITIAL_RANGE.to_string(),
                "description": "Math range as xMin_xMax_yCenter"
            },
            "noise": {
                "type": "string",
                "default": "gaussian",
                "options": NoiseKind::NAMES,
                "description": "Texture kind"
            },
            "p": {
                "type": "number",
                "default": DEFAULT_BERNOULLI_P,
                "min": 0.0,
                "max": 1.0,
                "description": "Bernoulli probability of a dark pixel"
            },
            "isolation": {
                "type": "string",
                "default": "none",
                "options": ["none", "isolated", "isolated-big"],
                "description": "Bernoulli cleanup pass"
            },
            "bias": {
                "type": "string",
                "default": "bounds",
                "description": "Shaping curve for biased noise"
            },
            "mean": {
                "type": "number",
                "default": DEFAULT_GAUSSIAN_MEAN,
                "description": "Gaussian mean"
            },
            "standard_deviation": {
                "type": "number",
                "default": DEFAULT_GAUSSIAN_STANDARD_DEVIATION,
                "min": 0.0,
                "description": "Gaussian standard deviation"
            },
            "gaussian_range": {
                "type": "number",
                "default": DEFAULT_GAUSSIAN_RANGE,
                "min": 0.0,
                "description": "Width of the kept Gaussian window in standard deviations"
            }
        })
    }

    fn color_scheme(&self) -> ColorScheme {
        ColorScheme::Grayscale { undefined: BLACK }
    }
}
