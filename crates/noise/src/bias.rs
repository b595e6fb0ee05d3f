//! Closed-form remaps of a uniform sample that shape the noise histogram.
//!
//! Downstream color calibration depends on these exact curves.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use plane_engine_core::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasType {
    /// `1 - √(1 - u²)`: lower quarter circle, mass near 0.
    Lower,
    /// `√(1 - (u - 1)²)`: mass near 1.
    Upper,
    /// Two quarter circles meeting at 0.5 with vertical tangent there.
    Center,
    /// Mirrored quarter circles: mass near 0 and 1, sparse around 0.5.
    Bounds,
    /// Smoothstep `-2u³ + 3u²`.
    BoundsByCubic,
    /// Smootherstep `6u⁵ - 15u⁴ + 10u³`.
    BoundsByQuintic,
    /// `-20u⁷ + 70u⁶ - 84u⁵ + 35u⁴`.
    BoundsBySeptic,
    /// Cosine ease `(1 - cos(πu)) / 2`.
    BoundsByTrig,
}

impl BiasType {
    pub const ALL: [BiasType; 8] = [
        BiasType::Lower,
        BiasType::Upper,
        BiasType::Center,
        BiasType::Bounds,
        BiasType::BoundsByCubic,
        BiasType::BoundsByQuintic,
        BiasType::BoundsBySeptic,
        BiasType::BoundsByTrig,
    ];

    /// Remaps a uniform `u ∈ [0, 1)`.
    #[inline]
    pub fn apply(self, u: f64) -> f64 {
        match self {
            BiasType::Lower => 1.0 - (1.0 - u * u).sqrt(),
            BiasType::Upper => (1.0 - (u - 1.0).powi(2)).sqrt(),
            BiasType::Center => {
                let half = (1.0 - (2.0 * u - 1.0).powi(2)).sqrt() / 2.0;
                if u <= 0.5 {
                    half
                } else {
                    1.0 - half
                }
            }
            BiasType::Bounds => {
                if u <= 0.5 {
                    0.5 - (1.0 - (2.0 * u).powi(2)).sqrt() / 2.0
                } else {
                    0.5 + (1.0 - (2.0 * u - 2.0).powi(2)).sqrt() / 2.0
                }
            }
            BiasType::BoundsByCubic => -2.0 * u.powi(3) + 3.0 * u.powi(2),
            BiasType::BoundsByQuintic => 6.0 * u.powi(5) - 15.0 * u.powi(4) + 10.0 * u.powi(3),
            BiasType::BoundsBySeptic => {
                -20.0 * u.powi(7) + 70.0 * u.powi(6) - 84.0 * u.powi(5) + 35.0 * u.powi(4)
            }
            BiasType::BoundsByTrig => (1.0 - (u * PI).cos()) / 2.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BiasType::Lower => "lower",
            BiasType::Upper => "upper",
            BiasType::Center => "center",
            BiasType::Bounds => "bounds",
            BiasType::BoundsByCubic => "bounds-by-cubic",
            BiasType::BoundsByQuintic => "bounds-by-quintic",
            BiasType::BoundsBySeptic => "bounds-by-septic",
            BiasType::BoundsByTrig => "bounds-by-trig",
        }
    }
}

impl fmt::Display for BiasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BiasType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BiasType::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| EngineError::InvalidParameter {
                name: "bias".into(),
                reason: format!("unknown bias type '{s}'"),
            })
    }
}
