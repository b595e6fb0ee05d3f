#![deny(unsafe_code)]
//! Seeded scalar noise textures sized to a grid.
//!
//! These textures are the source images the LIC tracer smears along
//! streamlines. Every generator draws from a [`Xorshift64`] so a texture is
//! reproducible from its seed.

pub mod bias;
pub mod isolation;
pub mod plane;

use std::f64::consts::PI;
use std::time::Instant;

use plane_engine_core::params::{param_f64, param_string};
use plane_engine_core::{EngineError, Grid, MarginGrid, MarginGridBlueprint, ScalarField, Xorshift64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use bias::BiasType;
pub use plane::NoisePlane;

pub const DEFAULT_BERNOULLI_P: f64 = 0.5;
pub const DEFAULT_GAUSSIAN_MEAN: f64 = 0.0;
pub const DEFAULT_GAUSSIAN_STANDARD_DEVIATION: f64 = 1.0;
/// Width of the kept Gaussian window, in standard deviations.
pub const DEFAULT_GAUSSIAN_RANGE: f64 = 6.0;
/// Largest `f64` below one.
pub const MAX_BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Post-processing applied to Bernoulli noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BernoulliIsolation {
    #[default]
    None,
    Isolated,
    IsolatedBig,
}

/// Which texture to generate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum NoiseKind {
    /// Uniform in `[0, 1)`.
    White,
    /// `0` with probability `p`, else `1`.
    Bernoulli {
        p: f64,
        #[serde(default)]
        isolation: BernoulliIsolation,
    },
    /// A uniform sample through a shaping curve.
    Biased { bias: BiasType },
    /// Box–Muller normals clamped to `mean ± range/2·σ`, scaled to `[0, 1]`.
    Gaussian {
        mean: f64,
        standard_deviation: f64,
        range: f64,
    },
}

impl NoiseKind {
    pub const NAMES: [&'static str; 4] = ["white", "bernoulli", "biased", "gaussian"];

    /// Reads `noise` (one of [`NoiseKind::NAMES`]) and the kind's own keys:
    /// `p` and `isolation` (`none`, `isolated`, `isolated-big`), `bias`, or
    /// `mean`, `standard_deviation`, `gaussian_range`.
    pub fn from_json(params: &Value, default: NoiseKind) -> Result<NoiseKind, EngineError> {
        let Some(name) = params.get("noise").and_then(Value::as_str) else {
            return Ok(default);
        };
        let kind = match name {
            "white" => NoiseKind::White,
            "bernoulli" => {
                let isolation = match param_string(params, "isolation", "none").as_str() {
                    "none" => BernoulliIsolation::None,
                    "isolated" => BernoulliIsolation::Isolated,
                    "isolated-big" => BernoulliIsolation::IsolatedBig,
                    other => {
                        return Err(EngineError::InvalidParameter {
                            name: "isolation".into(),
                            reason: format!("unknown isolation '{other}'"),
                        })
                    }
                };
                NoiseKind::Bernoulli {
                    p: param_f64(params, "p", DEFAULT_BERNOULLI_P),
                    isolation,
                }
            }
            "biased" => NoiseKind::Biased {
                bias: param_string(params, "bias", BiasType::Bounds.name()).parse()?,
            },
            "gaussian" => NoiseKind::Gaussian {
                mean: param_f64(params, "mean", DEFAULT_GAUSSIAN_MEAN),
                standard_deviation: param_f64(
                    params,
                    "standard_deviation",
                    DEFAULT_GAUSSIAN_STANDARD_DEVIATION,
                ),
                range: param_f64(params, "gaussian_range", DEFAULT_GAUSSIAN_RANGE),
            },
            other => {
                return Err(EngineError::InvalidParameter {
                    name: "noise".into(),
                    reason: format!("unknown noise kind '{other}'"),
                })
            }
        };
        kind.validate()?;
        Ok(kind)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        match *self {
            NoiseKind::Bernoulli { p, .. } if !(0.0..=1.0).contains(&p) => {
                Err(EngineError::InvalidParameter {
                    name: "p".into(),
                    reason: format!("must be in [0, 1], got {p}"),
                })
            }
            NoiseKind::Gaussian {
                standard_deviation, ..
            } if !(standard_deviation > 0.0) => Err(EngineError::InvalidParameter {
                name: "standard_deviation".into(),
                reason: format!("must be positive, got {standard_deviation}"),
            }),
            NoiseKind::Gaussian { range, .. } if !(range > 0.0) => {
                Err(EngineError::InvalidParameter {
                    name: "gaussian_range".into(),
                    reason: format!("must be positive, got {range}"),
                })
            }
            _ => Ok(()),
        }
    }

    /// Current values as the JSON keys [`NoiseKind::from_json`] reads.
    pub fn to_params(&self) -> Value {
        match *self {
            NoiseKind::White => serde_json::json!({"noise": "white"}),
            NoiseKind::Bernoulli { p, isolation } => serde_json::json!({
                "noise": "bernoulli",
                "p": p,
                "isolation": match isolation {
                    BernoulliIsolation::None => "none",
                    BernoulliIsolation::Isolated => "isolated",
                    BernoulliIsolation::IsolatedBig => "isolated-big",
                },
            }),
            NoiseKind::Biased { bias } => serde_json::json!({"noise": "biased", "bias": bias.name()}),
            NoiseKind::Gaussian {
                mean,
                standard_deviation,
                range,
            } => serde_json::json!({
                "noise": "gaussian",
                "mean": mean,
                "standard_deviation": standard_deviation,
                "gaussian_range": range,
            }),
        }
    }
}

/// Draws textures over one grid from a private PRNG.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    blank: ScalarField,
    rng: Xorshift64,
}

impl NoiseGenerator {
    pub fn new(grid: &Grid, seed: u64) -> Self {
        Self {
            blank: ScalarField::for_grid(grid),
            rng: Xorshift64::new(seed),
        }
    }

    /// Generator for the full enlarged area of a margin grid.
    pub fn for_margin_grid(grid: &MarginGrid, seed: u64) -> Self {
        Self::new(grid.grid(), seed)
    }

    fn fill(&mut self, mut sample: impl FnMut(&mut Xorshift64) -> f64) -> ScalarField {
        let mut field = self.blank.clone();
        for value in field.data_mut() {
            *value = sample(&mut self.rng);
        }
        field
    }

    pub fn white(&mut self) -> ScalarField {
        self.fill(|rng| rng.next_f64())
    }

    pub fn bernoulli(&mut self, p: f64, isolation: BernoulliIsolation) -> ScalarField {
        let mut field = self.fill(|rng| if rng.chance(p) { 0.0 } else { 1.0 });
        match isolation {
            BernoulliIsolation::None => {}
            BernoulliIsolation::Isolated => isolation::isolate(&mut field),
            BernoulliIsolation::IsolatedBig => isolation::isolate_big(&mut field),
        }
        field
    }

    pub fn biased(&mut self, bias: BiasType) -> ScalarField {
        self.fill(|rng| bias.apply(rng.next_f64()))
    }

    /// Two values per Box–Muller draw, written to adjacent pixels of the
    /// same row. On odd widths the last pixel of each row takes the first
    /// value of a fresh draw and the second is discarded.
    ///
    /// Samples are clamped to `mean ± range/2·σ` and mapped linearly onto
    /// `[0, 1)`; the upper bound lands on [`MAX_BELOW_ONE`].
    pub fn gaussian(&mut self, mean: f64, standard_deviation: f64, range: f64) -> ScalarField {
        let min = mean - range / 2.0 * standard_deviation;
        let max = mean + range / 2.0 * standard_deviation;
        let span = max - min;
        let normalize = |z: f64| {
            (((z * standard_deviation + mean).clamp(min, max) - min) / span).min(MAX_BELOW_ONE)
        };

        let mut field = self.blank.clone();
        let width = field.width();
        for row in field.data_mut().chunks_mut(width) {
            for pair in row.chunks_mut(2) {
                let (z0, z1) = box_muller(&mut self.rng);
                pair[0] = normalize(z0);
                if let Some(second) = pair.get_mut(1) {
                    *second = normalize(z1);
                }
            }
        }
        field
    }

    /// Generates `kind`, validating its parameters first.
    pub fn generate(&mut self, kind: &NoiseKind) -> Result<ScalarField, EngineError> {
        kind.validate()?;
        tracing::debug!(
            width = self.blank.width(),
            height = self.blank.height(),
            kind = ?kind,
            "generating noise"
        );
        let started = Instant::now();
        let field = match *kind {
            NoiseKind::White => self.white(),
            NoiseKind::Bernoulli { p, isolation } => self.bernoulli(p, isolation),
            NoiseKind::Biased { bias } => self.biased(bias),
            NoiseKind::Gaussian {
                mean,
                standard_deviation,
                range,
            } => self.gaussian(mean, standard_deviation, range),
        };
        tracing::info!(elapsed_s = started.elapsed().as_secs_f64(), "noise done");
        Ok(field)
    }
}

/// A pair of independent standard normals from two nonzero uniforms.
fn box_muller(rng: &mut Xorshift64) -> (f64, f64) {
    let u1 = rng.next_f64_nonzero();
    let u2 = rng.next_f64_nonzero();
    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * PI * u2;
    (radius * angle.cos(), radius * angle.sin())
}

/// Self-contained request for a background noise texture over the full
/// area of a margin grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseSetup {
    pub grid: MarginGridBlueprint,
    pub kind: NoiseKind,
    #[serde(default)]
    pub seed: u64,
}

impl NoiseSetup {
    pub fn run(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        let grid = MarginGrid::from_blueprint(&self.grid)?;
        let field = NoiseGenerator::for_margin_grid(&grid, self.seed).generate(&self.kind)?;
        progress(100);
        Ok(field)
    }
}
