//! Reproducible description of a single render.
//!
//! A [`Seed`] is the explicit configuration value a caller builds, hands to
//! an engine, and stores if it wants the picture again. Nothing in the
//! library persists it.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grid::GridRange;

/// Engine name, output resolution, optional range override, engine
/// parameters, and the noise seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    /// Overrides the engine's default math range when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<GridRange>,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    #[serde(default)]
    pub seed: u64,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Seed {
    /// Seed with default range and empty params.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            range: None,
            params: empty_params(),
            seed,
        }
    }

    /// Checks dimensions and, if present, the range override.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if let Some(range) = &self.range {
            range.validate()?;
        }
        Ok(())
    }
}
