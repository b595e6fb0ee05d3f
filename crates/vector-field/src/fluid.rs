//! A fluid-like flow: uniform shear, point sources and sinks, a small
//! periodic turbulence, and an optional circular obstacle.

use std::fmt;

use noise::{NoiseFn, Perlin};
use plane_engine_core::{EngineError, Vector};
use serde::{Deserialize, Serialize};

use crate::VectorField;

/// Offset between the Perlin samples used for the two components.
const PERLIN_COMPONENT_OFFSET: f64 = 100.0;
/// Perturbation around an obstacle fades out beyond this many radii.
const OBSTACLE_REACH: f64 = 3.0;

/// A radial source (`strength > 0`) or sink (`strength < 0`) with
/// velocity `strength / r² · (p - p₀)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub x: f64,
    pub y: f64,
    pub strength: f64,
}

/// A disc the flow does not enter.
///
/// Inside the disc the field is zero. Between one and three radii a
/// potential-flow term for a cylinder in a stream of speed `flow_speed`
/// bends the flow around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub flow_speed: f64,
}

/// Coherent noise added to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerlinSettings {
    /// Math units to noise units.
    pub scale: f64,
    pub strength: f64,
    pub seed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidFlowConfig {
    /// Constant horizontal velocity.
    pub shear: f64,
    pub sources: Vec<PointSource>,
    /// Amplitude of `(sin 5(x+y), cos 5(x+y))`.
    pub turbulence: f64,
    #[serde(default)]
    pub obstacle: Option<Obstacle>,
    #[serde(default)]
    pub perlin: Option<PerlinSettings>,
}

impl Default for FluidFlowConfig {
    /// A sink at `(7, -1)` fed by two sources over a rightward shear.
    fn default() -> Self {
        Self {
            shear: 2.0,
            sources: vec![
                PointSource {
                    x: 7.0,
                    y: -1.0,
                    strength: -5.0,
                },
                PointSource {
                    x: 3.0,
                    y: -1.5,
                    strength: 3.0,
                },
                PointSource {
                    x: 4.0,
                    y: 1.75,
                    strength: 2.0,
                },
            ],
            turbulence: 0.1,
            obstacle: None,
            perlin: None,
        }
    }
}

impl FluidFlowConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(obstacle) = &self.obstacle {
            if !(obstacle.radius > 0.0) {
                return Err(EngineError::InvalidParameter {
                    name: "obstacle_radius".into(),
                    reason: format!("must be positive, got {}", obstacle.radius),
                });
            }
        }
        if let Some(perlin) = &self.perlin {
            if !(perlin.scale > 0.0) {
                return Err(EngineError::InvalidParameter {
                    name: "perlin_scale".into(),
                    reason: format!("must be positive, got {}", perlin.scale),
                });
            }
        }
        Ok(())
    }
}

pub struct FluidFlowField {
    config: FluidFlowConfig,
    perlin: Option<Perlin>,
}

impl fmt::Debug for FluidFlowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluidFlowField")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FluidFlowField {
    pub fn new(config: FluidFlowConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let perlin = config.perlin.map(|settings| Perlin::new(settings.seed));
        Ok(Self { config, perlin })
    }

    pub fn config(&self) -> &FluidFlowConfig {
        &self.config
    }

    fn raw(&self, x: f64, y: f64) -> (f64, f64) {
        let mut vx = self.config.shear;
        let mut vy = 0.0;

        for source in &self.config.sources {
            let dx = x - source.x;
            let dy = y - source.y;
            let r2 = dx * dx + dy * dy;
            if r2 > 0.0 {
                vx += source.strength / r2 * dx;
                vy += source.strength / r2 * dy;
            }
        }

        let phase = 5.0 * (x + y);
        vx += phase.sin() * self.config.turbulence;
        vy += phase.cos() * self.config.turbulence;

        if let (Some(noise), Some(settings)) = (&self.perlin, &self.config.perlin) {
            let sx = x * settings.scale;
            let sy = y * settings.scale;
            vx += noise.get([sx, sy]) * settings.strength;
            vy += noise.get([sx + PERLIN_COMPONENT_OFFSET, sy + PERLIN_COMPONENT_OFFSET])
                * settings.strength;
        }

        (vx, vy)
    }
}

impl VectorField for FluidFlowField {
    fn compute_vector(&self, x: f64, y: f64) -> Vector {
        let Some(obstacle) = &self.config.obstacle else {
            let (vx, vy) = self.raw(x, y);
            return Vector::from_raw(vx, vy);
        };
        let dx = x - obstacle.x;
        let dy = y - obstacle.y;
        let r2 = dx * dx + dy * dy;
        let r = r2.sqrt();
        if r <= obstacle.radius {
            return Vector::ZERO;
        }
        let (mut vx, mut vy) = self.raw(x, y);
        if r <= OBSTACLE_REACH * obstacle.radius {
            let k = obstacle.flow_speed * obstacle.radius * obstacle.radius / (r2 * r2);
            vx -= k * (dx * dx - dy * dy);
            vy -= k * (2.0 * dx * dy);
        }
        Vector::from_raw(vx, vy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shear_only(shear: f64) -> FluidFlowConfig {
        FluidFlowConfig {
            shear,
            sources: Vec::new(),
            turbulence: 0.0,
            obstacle: None,
            perlin: None,
        }
    }

    #[test]
    fn pure_shear_is_uniform() {
        let field = FluidFlowField::new(shear_only(2.0)).unwrap();
        for (x, y) in [(0.0, 0.0), (3.5, -2.0), (10.0, 4.0)] {
            let v = field.compute_vector(x, y);
            assert_eq!(v, Vector::from_raw(2.0, 0.0));
        }
    }

    #[test]
    fn sink_pulls_and_source_pushes() {
        let mut config = shear_only(0.0);
        config.sources.push(PointSource {
            x: 0.0,
            y: 0.0,
            strength: -4.0,
        });
        let sink = FluidFlowField::new(config.clone()).unwrap();
        let v = sink.compute_vector(2.0, 0.0);
        assert!((v.vx + 1.0).abs() < 1e-12);
        assert!((v.magnitude - 2.0).abs() < 1e-12);

        config.sources[0].strength = 4.0;
        let source = FluidFlowField::new(config).unwrap();
        assert!((source.compute_vector(2.0, 0.0).vx - 1.0).abs() < 1e-12);
    }

    #[test]
    fn source_center_contributes_nothing() {
        let mut config = shear_only(1.0);
        config.sources.push(PointSource {
            x: 1.0,
            y: 1.0,
            strength: 3.0,
        });
        let field = FluidFlowField::new(config).unwrap();
        assert_eq!(field.compute_vector(1.0, 1.0), Vector::from_raw(1.0, 0.0));
    }

    #[test]
    fn turbulence_follows_the_diagonal_phase() {
        let mut config = shear_only(0.0);
        config.turbulence = 0.1;
        let field = FluidFlowField::new(config).unwrap();
        let v = field.compute_vector(0.0, 0.0);
        // sin 0 = 0, cos 0 = 1
        assert!(v.vx.abs() < 1e-12 && (v.vy - 1.0).abs() < 1e-12);
        assert!((v.magnitude - 0.1).abs() < 1e-12);
    }

    #[test]
    fn obstacle_blocks_inside_and_slows_head_on_flow() {
        let mut config = shear_only(1.0);
        config.obstacle = Some(Obstacle {
            x: 0.0,
            y: 0.0,
            radius: 1.0,
            flow_speed: 1.0,
        });
        let field = FluidFlowField::new(config).unwrap();
        assert!(field.compute_vector(0.5, 0.0).is_zero());
        assert!(field.compute_vector(0.0, -1.0).is_zero());
        // Two radii upstream: u = 1 - R²·4R² / 16R⁴ = 0.75.
        let v = field.compute_vector(-2.0, 0.0);
        assert!((v.magnitude - 0.75).abs() < 1e-12);
        // Beyond three radii the flow is undisturbed.
        assert_eq!(field.compute_vector(-3.5, 0.0), Vector::from_raw(1.0, 0.0));
    }

    #[test]
    fn obstacle_flow_speeds_up_at_the_flanks() {
        let mut config = shear_only(1.0);
        config.obstacle = Some(Obstacle {
            x: 0.0,
            y: 0.0,
            radius: 1.0,
            flow_speed: 1.0,
        });
        let field = FluidFlowField::new(config).unwrap();
        // Above the disc: u = 1 + R²·r² / r⁴ = 1.25 at r = 2.
        let v = field.compute_vector(0.0, 2.0);
        assert!((v.vx - 1.0).abs() < 1e-12);
        assert!((v.magnitude - 1.25).abs() < 1e-12);
    }

    #[test]
    fn perlin_perturbation_is_seeded_and_bounded() {
        let mut config = shear_only(2.0);
        config.perlin = Some(PerlinSettings {
            scale: 0.7,
            strength: 0.5,
            seed: 9,
        });
        let a = FluidFlowField::new(config.clone()).unwrap();
        let b = FluidFlowField::new(config).unwrap();
        let mut differs = false;
        for i in 0..50 {
            let (x, y) = (i as f64 * 0.37, i as f64 * -0.21);
            let va = a.compute_vector(x, y);
            assert_eq!(va, b.compute_vector(x, y));
            assert!(va.magnitude > 0.0 && va.magnitude < 4.0);
            differs |= va != Vector::from_raw(2.0, 0.0);
        }
        assert!(differs);
    }

    #[test]
    fn invalid_obstacle_radius_is_rejected() {
        let mut config = shear_only(1.0);
        config.obstacle = Some(Obstacle {
            x: 0.0,
            y: 0.0,
            radius: 0.0,
            flow_speed: 1.0,
        });
        assert!(matches!(
            FluidFlowField::new(config),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn default_flow_is_defined_away_from_singular_points() {
        let field = FluidFlowField::new(FluidFlowConfig::default()).unwrap();
        for (x, y) in [(0.0, 0.0), (5.0, 0.0), (9.0, 3.0)] {
            let v = field.compute_vector(x, y);
            assert!(v.magnitude > 0.0);
            assert!((v.vx.hypot(v.vy) - 1.0).abs() < 1e-12);
        }
    }
}
