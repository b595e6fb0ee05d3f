//! Surface wind over a longitude/latitude plane from Gaussian pressure
//! systems.
//!
//! Pressure is a sum of Gaussian bumps (highs) and dips (lows). Wind is the
//! geostrophic flow along the isobars, scaled by `sin(latitude)`, plus a
//! small ageostrophic drift down the pressure gradient. Each system is also
//! placed one full turn east and west so the field wraps at ±360°.

use std::f64::consts::PI;

use plane_engine_core::{EngineError, Vector};
use serde::{Deserialize, Serialize};

use crate::VectorField;

const NORTH: f64 = 90.0;
const SOUTH: f64 = -90.0;
const FULL_TURN: f64 = 360.0;
const AGEOSTROPHIC_FRACTION: f64 = 0.1;
const DEFAULT_SPREAD: f64 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureRegion {
    /// Longitude in degrees.
    pub x: f64,
    /// Latitude in degrees.
    pub y: f64,
    pub strength: f64,
    /// Standard deviation of the Gaussian, in degrees.
    pub spread: f64,
    pub is_low_pressure: bool,
}

impl PressureRegion {
    fn shifted(self, dx: f64) -> Self {
        Self {
            x: self.x + dx,
            ..self
        }
    }

    fn sign(&self) -> f64 {
        if self.is_low_pressure {
            -1.0
        } else {
            1.0
        }
    }
}

/// The major semi-permanent pressure centers of the planet.
pub fn default_regions() -> Vec<PressureRegion> {
    [
        (0.0, -70.0, 988.0, true),    // Antarctic low
        (95.0, 60.0, 1036.0, false),  // Siberian high
        (135.0, -25.0, 1000.0, true), // Australian low
        (145.0, 45.0, 1028.0, false), // North Pacific high
        (170.0, 52.0, 992.0, true),   // Aleutian low
        (265.0, 35.0, 1026.0, false), // Bermuda high
        (270.0, 55.0, 996.0, true),   // Canadian low
        (280.0, -30.0, 1020.0, false), // South Pacific high
        (340.0, 38.0, 1024.0, false), // Azores high
        (340.0, 65.0, 980.0, true),   // Icelandic low
    ]
    .into_iter()
    .map(|(x, y, strength, is_low_pressure)| PressureRegion {
        x,
        y,
        strength,
        spread: DEFAULT_SPREAD,
        is_low_pressure,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherVectorField {
    regions: Vec<PressureRegion>,
    coriolis_force: f64,
}

impl WeatherVectorField {
    /// Fails with `InvalidParameter` if any region has a non-positive spread.
    pub fn new(regions: &[PressureRegion], coriolis_force: f64) -> Result<Self, EngineError> {
        if let Some(bad) = regions.iter().find(|r| !(r.spread > 0.0)) {
            return Err(EngineError::InvalidParameter {
                name: "spread".into(),
                reason: format!("must be positive, got {}", bad.spread),
            });
        }
        Ok(Self {
            regions: wrap(regions),
            coriolis_force,
        })
    }

    /// The configured regions with their wrapped copies.
    pub fn regions(&self) -> &[PressureRegion] {
        &self.regions
    }

    pub fn pressure(&self, x: f64, y: f64) -> f64 {
        self.regions
            .iter()
            .map(|r| {
                let dx = x - r.x;
                let dy = y - r.y;
                r.sign() * r.strength * (-(dx * dx + dy * dy) / (2.0 * r.spread * r.spread)).exp()
            })
            .sum()
    }

    /// Analytic `(∂P/∂x, ∂P/∂y)`.
    pub fn gradient(&self, x: f64, y: f64) -> (f64, f64) {
        self.regions.iter().fold((0.0, 0.0), |(gx, gy), r| {
            let dx = x - r.x;
            let dy = y - r.y;
            let s2 = r.spread * r.spread;
            let coefficient =
                -r.sign() * r.strength * (-(dx * dx + dy * dy) / (2.0 * s2)).exp() / s2;
            (gx + coefficient * dx, gy + coefficient * dy)
        })
    }

    /// `sin(latitude)` with latitude clamped to the poles.
    pub fn coriolis_factor(&self, y: f64) -> f64 {
        let latitude = y.clamp(SOUTH, NORTH);
        (latitude * PI / (NORTH - SOUTH)).sin() * self.coriolis_force
    }
}

impl Default for WeatherVectorField {
    fn default() -> Self {
        Self {
            regions: wrap(&default_regions()),
            coriolis_force: 1.0,
        }
    }
}

fn wrap(regions: &[PressureRegion]) -> Vec<PressureRegion> {
    regions
        .iter()
        .flat_map(|&r| [r.shifted(-FULL_TURN), r, r.shifted(FULL_TURN)])
        .collect()
}

impl VectorField for WeatherVectorField {
    fn compute_vector(&self, x: f64, y: f64) -> Vector {
        let (gx, gy) = self.gradient(x, y);
        let f = self.coriolis_factor(y);
        let vx = -f * gy - AGEOSTROPHIC_FRACTION * gx;
        let vy = f * gx - AGEOSTROPHIC_FRACTION * gy;
        Vector::from_raw(vx, vy)
    }
}
