//! Planes that convolve a texture along one of the named vector fields.
//!
//! Every plane runs the same pipeline: enlarge the visible grid by a margin
//! of `2·ceil(max_length)` pixels, draw the texture on the enlarged grid,
//! sample the field there, and trace streamlines for the visible pixels.

use plane_engine_core::color::{ColorMapper, BLACK, WHITE};
use plane_engine_core::params::{param_bool, param_f64, param_range, param_usize};
use plane_engine_core::{
    ColorScheme, Engine, EngineError, Grid, GridRange, MarginGrid, Rgb, ScalarField,
};
use plane_engine_mandelbrot::{CalculationKind, MandelbrotSetup};
use plane_engine_noise::{BernoulliIsolation, BiasType, NoiseKind, NoiseSetup};
use plane_engine_vector_field::charge::default_charges;
use plane_engine_vector_field::weather::default_regions;
use plane_engine_vector_field::{FieldKind, FluidFlowConfig, Obstacle, PerlinSettings, ScaleFactor};
use serde_json::{json, Value};

use crate::{LicParams, LicSetup};

const MANDELBROT_MAX_ITERATIONS: usize = 2000;
const MANDELBROT_ESCAPE_VALUE: f64 = 1000.0;
const ITERATION_TEXTURE_CYCLE_LENGTH: f64 = 255.0;
const DEFAULT_CORIOLIS_FORCE: f64 = 1.0;
const DEFAULT_OBSTACLE: Obstacle = Obstacle {
    x: 5.0,
    y: 0.0,
    radius: 0.0,
    flow_speed: 2.0,
};
const DEFAULT_PERLIN_SCALE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LicPlaneKind {
    /// Gradient of the Mandelbrot distance estimate.
    MandelbrotVector,
    /// Electric field of point charges.
    Charges,
    /// Sources and sinks in a shear flow.
    FluidFlow,
    /// Surface wind around pressure systems.
    Weather,
}

impl LicPlaneKind {
    pub const ALL: [LicPlaneKind; 4] = [
        LicPlaneKind::MandelbrotVector,
        LicPlaneKind::Charges,
        LicPlaneKind::FluidFlow,
        LicPlaneKind::Weather,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LicPlaneKind::MandelbrotVector => "mandelbrot-vector",
            LicPlaneKind::Charges => "charges",
            LicPlaneKind::FluidFlow => "fluid-flow",
            LicPlaneKind::Weather => "weather",
        }
    }

    pub fn initial_range(self) -> GridRange {
        let (x_min, x_max) = match self {
            LicPlaneKind::MandelbrotVector => (-3.0, 1.8),
            LicPlaneKind::Charges | LicPlaneKind::FluidFlow => (0.0, 10.0),
            LicPlaneKind::Weather => (-180.0, 180.0),
        };
        GridRange {
            x_min,
            x_max,
            y_center: 0.0,
        }
    }

    pub fn default_lic(self) -> LicParams {
        match self {
            LicPlaneKind::Weather => LicParams {
                max_length: 20.0,
                min_length: 5.0,
                strength: 3.6,
            },
            _ => LicParams::fixed(10.0),
        }
    }

    pub fn default_noise(self) -> NoiseKind {
        match self {
            LicPlaneKind::MandelbrotVector => NoiseKind::Bernoulli {
                p: 0.3,
                isolation: BernoulliIsolation::None,
            },
            LicPlaneKind::Charges => NoiseKind::Biased {
                bias: BiasType::Bounds,
            },
            LicPlaneKind::FluidFlow => NoiseKind::White,
            LicPlaneKind::Weather => NoiseKind::Bernoulli {
                p: 0.02,
                isolation: BernoulliIsolation::IsolatedBig,
            },
        }
    }

    /// Color of pixels without a flow direction.
    pub fn undefined_color(self) -> Rgb {
        match self {
            LicPlaneKind::MandelbrotVector => BLACK,
            _ => WHITE,
        }
    }
}

/// What gets smeared along the streamlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Texture {
    Noise(NoiseKind),
    /// Escape-time iterations through a black/white cycle, with points
    /// inside the set black.
    MandelbrotIterations {
        max_iterations: usize,
        escape_value: f64,
    },
}

impl Texture {
    /// Draws the texture over the full enlarged area of `source`.
    pub fn generate(&self, source: &MarginGrid, seed: u64) -> Result<ScalarField, EngineError> {
        match *self {
            Texture::Noise(kind) => NoiseSetup {
                grid: source.blueprint(),
                kind,
                seed,
            }
            .run(&mut |_| {}),
            Texture::MandelbrotIterations {
                max_iterations,
                escape_value,
            } => {
                let mapper = ColorMapper::black_white(ITERATION_TEXTURE_CYCLE_LENGTH, BLACK)?;
                let mut texture = MandelbrotSetup {
                    grid: source.grid().blueprint(),
                    kind: CalculationKind::Iterations,
                    max_iterations,
                    escape_value,
                }
                .run(&mut |_| {})?;
                for value in texture.data_mut() {
                    let iterations = if *value == max_iterations as f64 {
                        -1.0
                    } else {
                        *value
                    };
                    *value = f64::from(mapper.map(iterations).r) / 255.0;
                }
                Ok(texture)
            }
        }
    }
}

/// A LIC visualization of one named field.
pub struct LicPlane {
    kind: LicPlaneKind,
    grid: Grid,
    field: FieldKind,
    texture: Texture,
    lic: LicParams,
    scale: ScaleFactor,
    seed: u64,
}

impl LicPlane {
    pub fn new(
        kind: LicPlaneKind,
        grid: Grid,
        field: FieldKind,
        texture: Texture,
        lic: LicParams,
        scale: ScaleFactor,
        seed: u64,
    ) -> Result<Self, EngineError> {
        lic.validate()?;
        if let Texture::Noise(noise) = &texture {
            noise.validate()?;
        }
        if let FieldKind::FluidFlow(config) = &field {
            config.validate()?;
        }
        Ok(Self {
            kind,
            grid,
            field,
            texture,
            lic,
            scale,
            seed,
        })
    }

    /// Builds a plane from JSON parameters, starting from `kind`'s defaults.
    ///
    /// An explicit `range` argument overrides the one in `params`.
    pub fn from_json(
        kind: LicPlaneKind,
        width: usize,
        height: usize,
        range: Option<GridRange>,
        params: &Value,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let range = range.unwrap_or_else(|| param_range(params, "range", kind.initial_range()));
        let grid = Grid::with_range(width, height, range)?;
        let defaults = kind.default_lic();
        let lic = LicParams {
            max_length: param_f64(params, "lic_length", defaults.max_length),
            min_length: param_f64(params, "min_length", defaults.min_length),
            strength: param_f64(params, "strength", defaults.strength),
        };
        let scale = ScaleFactor::from_factor(param_usize(params, "scale_factor", 0))?;
        let noise = NoiseKind::from_json(params, kind.default_noise())?;

        let (field, texture) = match kind {
            LicPlaneKind::MandelbrotVector => {
                let max_iterations =
                    param_usize(params, "max_iterations", MANDELBROT_MAX_ITERATIONS);
                let escape_value = param_f64(params, "escape_value", MANDELBROT_ESCAPE_VALUE);
                let texture = if param_bool(params, "use_noise_as_source", true) {
                    Texture::Noise(noise)
                } else {
                    Texture::MandelbrotIterations {
                        max_iterations,
                        escape_value,
                    }
                };
                let field = FieldKind::Mandelbrot {
                    max_iterations,
                    escape_value,
                };
                (field, texture)
            }
            LicPlaneKind::Charges => (
                FieldKind::Charges {
                    charges: default_charges(),
                },
                Texture::Noise(noise),
            ),
            LicPlaneKind::FluidFlow => (
                FieldKind::FluidFlow(fluid_flow_config(params, seed)),
                Texture::Noise(noise),
            ),
            LicPlaneKind::Weather => (
                FieldKind::Weather {
                    regions: default_regions(),
                    coriolis_force: param_f64(params, "coriolis_force", DEFAULT_CORIOLIS_FORCE),
                },
                Texture::Noise(noise),
            ),
        };
        Self::new(kind, grid, field, texture, lic, scale, seed)
    }

    pub fn kind(&self) -> LicPlaneKind {
        self.kind
    }

    pub fn field(&self) -> &FieldKind {
        &self.field
    }

    pub fn texture(&self) -> Texture {
        self.texture
    }

    pub fn lic(&self) -> LicParams {
        self.lic
    }

    /// The enlarged grid the texture and field are computed on.
    pub fn source_grid(&self) -> Result<MarginGrid, EngineError> {
        MarginGrid::around(&self.grid, self.lic.margin())
    }

    /// Draws the texture and samples the field over the enlarged grid, then
    /// packs both into the request that traces the visible pixels.
    pub fn setup(&self) -> Result<LicSetup, EngineError> {
        let source = self.source_grid()?;
        let image = self.texture.generate(&source, self.seed)?;
        let field = self.field.precompute(source.grid(), self.scale)?;
        Ok(LicSetup {
            source_grid: source.blueprint(),
            image,
            field,
            target_grid: self.grid.blueprint(),
            max_length: self.lic.max_length,
            min_length: self.lic.min_length,
            strength: self.lic.strength,
        })
    }
}

/// The obstacle is enabled by a positive `obstacle_radius`, the Perlin
/// perturbation by a positive `perlin_strength`.
fn fluid_flow_config(params: &Value, seed: u64) -> FluidFlowConfig {
    let defaults = FluidFlowConfig::default();
    let radius = param_f64(params, "obstacle_radius", DEFAULT_OBSTACLE.radius);
    let obstacle = (radius > 0.0).then(|| Obstacle {
        x: param_f64(params, "obstacle_x", DEFAULT_OBSTACLE.x),
        y: param_f64(params, "obstacle_y", DEFAULT_OBSTACLE.y),
        radius,
        flow_speed: param_f64(params, "obstacle_flow_speed", DEFAULT_OBSTACLE.flow_speed),
    });
    let strength = param_f64(params, "perlin_strength", 0.0);
    let perlin = (strength > 0.0).then(|| PerlinSettings {
        scale: param_f64(params, "perlin_scale", DEFAULT_PERLIN_SCALE),
        strength,
        seed: seed as u32,
    });
    FluidFlowConfig {
        shear: param_f64(params, "shear", defaults.shear),
        turbulence: param_f64(params, "turbulence", defaults.turbulence),
        obstacle,
        perlin,
        ..defaults
    }
}

impl Engine for LicPlane {
    fn compute(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        tracing::debug!(plane = self.kind.name(), grid = %self.grid, "computing lic plane");
        self.setup()?.run(progress)
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn params(&self) -> Value {
        let mut params = match self.texture {
            Texture::Noise(noise) => noise.to_params(),
            Texture::MandelbrotIterations { .. } => json!({"use_noise_as_source": false}),
        };
        params["range"] = json!(self.grid.range().to_string());
        params["lic_length"] = json!(self.lic.max_length);
        params["min_length"] = json!(self.lic.min_length);
        params["strength"] = json!(self.lic.strength);
        params["scale_factor"] = json!(self.scale.factor());
        match &self.field {
            FieldKind::Mandelbrot {
                max_iterations,
                escape_value,
            } => {
                params["max_iterations"] = json!(max_iterations);
                params["escape_value"] = json!(escape_value);
            }
            FieldKind::FluidFlow(config) => {
                params["shear"] = json!(config.shear);
                params["turbulence"] = json!(config.turbulence);
                if let Some(obstacle) = &config.obstacle {
                    params["obstacle_x"] = json!(obstacle.x);
                    params["obstacle_y"] = json!(obstacle.y);
                    params["obstacle_radius"] = json!(obstacle.radius);
                    params["obstacle_flow_speed"] = json!(obstacle.flow_speed);
                }
                if let Some(perlin) = &config.perlin {
                    params["perlin_strength"] = json!(perlin.strength);
                    params["perlin_scale"] = json!(perlin.scale);
                }
            }
            FieldKind::Weather { coriolis_force, .. } => {
                params["coriolis_force"] = json!(coriolis_force);
            }
            FieldKind::Charges { .. } => {}
        }
        params
    }

    fn param_schema(&self) -> Value {
        let lic = self.kind.default_lic();
        let mut schema = json!({
            "range": {
                "type": "string",
                "default": self.kind.initial_range().to_string(),
                "description": "Math range as xMin_xMax_yCenter"
            },
            "lic_length": {
                "type": "number",
                "default": lic.max_length,
                "min": 0.0,
                "description": "Maximum streamline length each way, in pixels"
            },
            "min_length": {
                "type": "number",
                "default": lic.min_length,
                "min": 0.0,
                "description": "Shortest streamline when strength is active"
            },
            "strength": {
                "type": "number",
                "default": lic.strength,
                "description": "Length per unit of field magnitude; <= 0 uses lic_length everywhere"
            },
            "scale_factor": {
                "type": "integer",
                "default": 0,
                "min": 0,
                "max": 16,
                "description": "Sample the field every n pixels and interpolate (0 = every pixel)"
            },
            "noise": {
                "type": "string",
                "default": self.kind.default_noise().to_params()["noise"],
                "options": NoiseKind::NAMES,
                "description": "Texture noise kind"
            },
            "p": {
                "type": "number",
                "default": plane_engine_noise::DEFAULT_BERNOULLI_P,
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
            }
        });
        let extra = match self.kind {
            LicPlaneKind::MandelbrotVector => json!({
                "use_noise_as_source": {
                    "type": "boolean",
                    "default": true,
                    "description": "Texture from noise instead of the iteration image"
                },
                "max_iterations": {
                    "type": "integer",
                    "default": MANDELBROT_MAX_ITERATIONS,
                    "min": 1,
                    "description": "Iteration cap for the distance estimate"
                },
                "escape_value": {
                    "type": "number",
                    "default": MANDELBROT_ESCAPE_VALUE,
                    "min": 0.0,
                    "description": "Escape radius"
                }
            }),
            LicPlaneKind::FluidFlow => {
                let defaults = FluidFlowConfig::default();
                json!({
                    "shear": {
                        "type": "number",
                        "default": defaults.shear,
                        "description": "Constant horizontal velocity"
                    },
                    "turbulence": {
                        "type": "number",
                        "default": defaults.turbulence,
                        "description": "Amplitude of the periodic ripple"
                    },
                    "obstacle_x": {
                        "type": "number",
                        "default": DEFAULT_OBSTACLE.x,
                        "description": "Obstacle center x"
                    },
                    "obstacle_y": {
                        "type": "number",
                        "default": DEFAULT_OBSTACLE.y,
                        "description": "Obstacle center y"
                    },
                    "obstacle_radius": {
                        "type": "number",
                        "default": DEFAULT_OBSTACLE.radius,
                        "min": 0.0,
                        "description": "Obstacle radius; 0 disables the obstacle"
                    },
                    "obstacle_flow_speed": {
                        "type": "number",
                        "default": DEFAULT_OBSTACLE.flow_speed,
                        "description": "Free-stream speed bent around the obstacle"
                    },
                    "perlin_strength": {
                        "type": "number",
                        "default": 0.0,
                        "min": 0.0,
                        "description": "Perlin perturbation amplitude; 0 disables it"
                    },
                    "perlin_scale": {
                        "type": "number",
                        "default": DEFAULT_PERLIN_SCALE,
                        "min": 0.0,
                        "description": "Perlin noise units per math unit"
                    }
                })
            }
            LicPlaneKind::Weather => json!({
                "coriolis_force": {
                    "type": "number",
                    "default": DEFAULT_CORIOLIS_FORCE,
                    "description": "Scale of the geostrophic wind"
                }
            }),
            LicPlaneKind::Charges => json!({}),
        };
        if let (Some(schema), Value::Object(extra)) = (schema.as_object_mut(), extra) {
            schema.extend(extra);
        }
        schema
    }

    fn color_scheme(&self) -> ColorScheme {
        ColorScheme::Grayscale {
            undefined: self.kind.undefined_color(),
        }
    }
}
