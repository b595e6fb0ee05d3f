#![deny(unsafe_code)]
//! Plane registry: maps plane names to implementations and provides
//! CPU-side snapshot rendering.
//!
//! This crate sits between `plane-engine-core` (which defines the `Engine`
//! trait) and the crates implementing the individual planes. The CLI depends
//! on it to avoid duplicating dispatch logic.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use plane_engine_core::{ColorScheme, Engine, EngineError, Grid, GridRange, ScalarField, Seed};
use plane_engine_lic::{LicPlane, LicPlaneKind};
use plane_engine_mandelbrot::{CalculationKind, MandelbrotPlane};
use plane_engine_noise::NoisePlane;
use serde_json::Value;

/// All available plane names.
const ENGINE_NAMES: &[&str] = &[
    "mandelbrot-iterations",
    "mandelbrot-distance",
    "mandelbrot-vector",
    "charges",
    "fluid-flow",
    "weather",
    "noise",
];

/// Every named plane.
///
/// Wraps each plane implementation and delegates `Engine` trait methods.
/// Use [`EngineKind::from_name`] for string-based construction.
pub enum EngineKind {
    /// Escape-time iterations or the boundary distance estimate.
    Mandelbrot(MandelbrotPlane),
    /// A texture convolved along a vector field.
    Lic(LicPlane),
    /// A raw noise texture.
    Noise(NoisePlane),
}

impl EngineKind {
    /// Constructs a plane by name.
    ///
    /// `range` overrides both the plane's default range and any `range` key
    /// in `params`. Returns `EngineError::UnknownEngine` if the name is not
    /// recognized.
    pub fn from_name(
        name: &str,
        width: usize,
        height: usize,
        range: Option<GridRange>,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        let mandelbrot = |kind| MandelbrotPlane::from_json(kind, width, height, range, params);
        let lic = |kind| LicPlane::from_json(kind, width, height, range, params, seed);
        let engine = match name {
            "mandelbrot-iterations" => EngineKind::Mandelbrot(mandelbrot(CalculationKind::Iterations)?),
            "mandelbrot-distance" => EngineKind::Mandelbrot(mandelbrot(CalculationKind::Distance)?),
            "mandelbrot-vector" => EngineKind::Lic(lic(LicPlaneKind::MandelbrotVector)?),
            "charges" => EngineKind::Lic(lic(LicPlaneKind::Charges)?),
            "fluid-flow" => EngineKind::Lic(lic(LicPlaneKind::FluidFlow)?),
            "weather" => EngineKind::Lic(lic(LicPlaneKind::Weather)?),
            "noise" => EngineKind::Noise(NoisePlane::from_json(width, height, range, params, seed)?),
            _ => return Err(EngineError::UnknownEngine(name.to_string())),
        };
        tracing::debug!(engine = name, width, height, seed, "engine created");
        Ok(engine)
    }

    /// Constructs the plane a [`Seed`] describes.
    pub fn from_seed(seed: &Seed) -> Result<Self, EngineError> {
        seed.validate()?;
        Self::from_name(
            &seed.engine,
            seed.width,
            seed.height,
            seed.range,
            seed.seed,
            &seed.params,
        )
    }

    /// Returns a slice of all recognized plane names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    fn inner(&self) -> &dyn Engine {
        match self {
            EngineKind::Mandelbrot(e) => e,
            EngineKind::Lic(e) => e,
            EngineKind::Noise(e) => e,
        }
    }
}

impl Engine for EngineKind {
    fn compute(&self, progress: &mut dyn FnMut(u8)) -> Result<ScalarField, EngineError> {
        self.inner().compute(progress)
    }

    fn grid(&self) -> &Grid {
        self.inner().grid()
    }

    fn params(&self) -> Value {
        self.inner().params()
    }

    fn param_schema(&self) -> Value {
        self.inner().param_schema()
    }

    fn color_scheme(&self) -> ColorScheme {
        self.inner().color_scheme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn small(name: &str) -> EngineKind {
        EngineKind::from_name(name, 16, 12, None, 42, &json!({"lic_length": 2, "min_length": 1}))
            .unwrap()
    }

    #[test]
    fn every_listed_name_constructs() {
        for &name in EngineKind::list_engines() {
            let engine = small(name);
            assert_eq!(engine.grid().width(), 16, "{name}");
            assert_eq!(engine.grid().height(), 12, "{name}");
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = EngineKind::from_name("lorenz", 32, 32, None, 42, &json!({}));
        assert!(matches!(result, Err(EngineError::UnknownEngine(_))));
    }

    #[test]
    fn range_argument_overrides_params() {
        let range = GridRange::new(-1.0, 0.5, 0.2).unwrap();
        let engine = EngineKind::from_name(
            "mandelbrot-iterations",
            8,
            8,
            Some(range),
            1,
            &json!({"range": "-2_1_0"}),
        )
        .unwrap();
        assert_eq!(engine.grid().range(), range);
    }

    #[test]
    fn from_seed_uses_every_field() {
        let mut seed = Seed::new("noise", 10, 6, 9);
        seed.params = json!({"noise": "white"});
        let engine = EngineKind::from_seed(&seed).unwrap();
        assert_eq!(engine.params()["noise"], "white");
        let again = EngineKind::from_seed(&seed).unwrap();
        assert_eq!(
            engine.compute(&mut |_| {}).unwrap(),
            again.compute(&mut |_| {}).unwrap()
        );

        seed.width = 0;
        assert!(matches!(
            EngineKind::from_seed(&seed),
            Err(EngineError::InvalidDimensions)
        ));
    }

    #[test]
    fn trait_delegation_params_and_schema() {
        let engine = small("weather");
        assert_eq!(engine.params()["lic_length"], 2.0);
        assert!(engine.param_schema().get("coriolis_force").is_some());
        let engine = small("mandelbrot-distance");
        assert!(engine.param_schema().get("escape_value").is_some());
    }

    #[test]
    fn computed_fields_match_the_grid() {
        for name in ["mandelbrot-iterations", "charges", "noise"] {
            let engine = small(name);
            let out = engine.compute(&mut |_| {}).unwrap();
            out.ensure_matches(engine.grid()).unwrap();
        }
    }

    #[test]
    fn determinism_same_seed() {
        let a = small("fluid-flow").compute(&mut |_| {}).unwrap();
        let b = small("fluid-flow").compute(&mut |_| {}).unwrap();
        assert!(a
            .data()
            .iter()
            .zip(b.data())
            .all(|(va, vb)| va.to_bits() == vb.to_bits()));
    }

    #[test]
    fn object_safety() {
        let boxed: Box<dyn Engine> = Box::new(small("charges"));
        assert_eq!(boxed.grid().width(), 16);
    }
}
