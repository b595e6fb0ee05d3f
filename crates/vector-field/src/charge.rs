//! Electric field of point charges.

use plane_engine_core::Vector;
use serde::{Deserialize, Serialize};

use crate::VectorField;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub x: f64,
    pub y: f64,
    /// Signed charge; negative charges attract.
    pub magnitude: f64,
}

/// Two positive charges around a strong negative one.
pub fn default_charges() -> Vec<Charge> {
    vec![
        Charge {
            x: 3.0,
            y: -1.0,
            magnitude: 5.0,
        },
        Charge {
            x: 5.5,
            y: -0.5,
            magnitude: -10.0,
        },
        Charge {
            x: 7.0,
            y: 2.0,
            magnitude: 3.0,
        },
    ]
}

/// Superposition `Σ qᵢ · (p - pᵢ) / |p - pᵢ|³`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeField {
    charges: Vec<Charge>,
}

impl ChargeField {
    pub fn new(charges: Vec<Charge>) -> Self {
        Self { charges }
    }

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }
}

impl Default for ChargeField {
    fn default() -> Self {
        Self::new(default_charges())
    }
}

impl VectorField for ChargeField {
    /// Exactly on a charge the sum is not finite and the result is
    /// [`Vector::ZERO`].
    fn compute_vector(&self, x: f64, y: f64) -> Vector {
        let (vx, vy) = self.charges.iter().fold((0.0, 0.0), |(vx, vy), charge| {
            let dx = x - charge.x;
            let dy = y - charge.y;
            let r3 = dx.hypot(dy).powi(3);
            (
                vx + charge.magnitude * dx / r3,
                vy + charge.magnitude * dy / r3,
            )
        });
        Vector::from_raw(vx, vy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(magnitude: f64) -> ChargeField {
        ChargeField::new(vec![Charge {
            x: 0.0,
            y: 0.0,
            magnitude,
        }])
    }

    #[test]
    fn positive_charge_points_outward_with_inverse_square_strength() {
        let field = single(1.0);
        let v = field.compute_vector(1.0, 0.0);
        assert!((v.vx - 1.0).abs() < 1e-12 && v.vy.abs() < 1e-12);
        assert!((v.magnitude - 1.0).abs() < 1e-12);
        let v = field.compute_vector(0.0, 2.0);
        assert!(v.vx.abs() < 1e-12 && (v.vy - 1.0).abs() < 1e-12);
        assert!((v.magnitude - 0.25).abs() < 1e-12);
    }

    #[test]
    fn negative_charge_points_inward() {
        let v = single(-2.0).compute_vector(-1.0, 0.0);
        assert!((v.vx - 1.0).abs() < 1e-12);
        assert!((v.magnitude - 2.0).abs() < 1e-12);
    }

    #[test]
    fn dipole_cancels_on_the_midline_axis() {
        let field = ChargeField::new(vec![
            Charge {
                x: -1.0,
                y: 0.0,
                magnitude: 1.0,
            },
            Charge {
                x: 1.0,
                y: 0.0,
                magnitude: 1.0,
            },
        ]);
        assert!(field.compute_vector(0.0, 0.0).is_zero());
        let v = field.compute_vector(0.0, 1.0);
        assert!(v.vx.abs() < 1e-12 && v.vy > 0.99);
    }

    #[test]
    fn singularity_yields_zero_vector() {
        let field = ChargeField::default();
        assert!(field.compute_vector(3.0, -1.0).is_zero());
        assert_eq!(field.charges().len(), 3);
    }
}
