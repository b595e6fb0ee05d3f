#![deny(unsafe_code)]
//! Core types for the plane-engine field system.
//!
//! Provides the pixel ↔ math `Grid` and its `MarginGrid` wrapper, the
//! `ScalarField` and `VectorFieldData` buffers exchanged between stages,
//! the `Xorshift64` PRNG, `Seed` and parameter helpers, the `Engine` trait,
//! color mapping, and background-calculation plumbing.

pub mod color;
pub mod compute;
pub mod engine;
pub mod error;
pub mod field;
pub mod grid;
pub mod margin;
pub mod params;
pub mod prng;
pub mod seed;
pub mod vector;

pub use color::{ColorMapper, ColorScheme, ColorSegment, Rgb};
pub use compute::{spawn_calculation, Calculation, CalculationState, ProgressCounter};
pub use engine::Engine;
pub use error::EngineError;
pub use field::{is_sentinel, ScalarField, SENTINEL};
pub use grid::{Grid, GridBlueprint, GridRange, Resolution};
pub use margin::{MarginGrid, MarginGridBlueprint};
pub use prng::Xorshift64;
pub use seed::Seed;
pub use vector::{Vector, VectorFieldData, VectorFieldReader};
