//! A grid enlarged by a pixel margin on every side.
//!
//! Streamlines and vector-field samples routinely leave the visible area, so
//! the LIC pipeline computes its source texture and field on a [`MarginGrid`]
//! whose center area coincides pixel-for-pixel with the visible [`Grid`].

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grid::{Grid, GridBlueprint, GridRange, Resolution};

/// Serializable description of a margin grid: the visible resolution and
/// range plus the margin width in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginGridBlueprint {
    pub resolution: Resolution,
    pub range: GridRange,
    pub margin: usize,
}

impl MarginGridBlueprint {
    /// Blueprint of the visible (unmargined) grid.
    pub fn base(&self) -> GridBlueprint {
        GridBlueprint {
            resolution: self.resolution.clone(),
            range: self.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarginGrid {
    grid: Grid,
    base_resolution: Resolution,
    base_range: GridRange,
    margin: usize,
}

impl MarginGrid {
    /// Wraps the visible `resolution`/`range` with `margin` pixels per side.
    ///
    /// The enlarged grid keeps the same math center and pixel size, so its
    /// horizontal span grows by `(width + 2·margin) / width`.
    pub fn new(
        base_resolution: Resolution,
        base_range: GridRange,
        margin: usize,
    ) -> Result<Self, EngineError> {
        base_range.validate()?;
        if base_resolution.width == 0 || base_resolution.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let enlarged = base_resolution.with_margin(margin);
        let factor = enlarged.width as f64 / base_resolution.width as f64;
        let (cx, cy) = base_range.center();
        let half_span = base_range.x_span() / 2.0 * factor;
        let range = GridRange {
            x_min: cx - half_span,
            x_max: cx + half_span,
            y_center: cy,
        };
        let grid = Grid::from_resolution(enlarged, range)?;
        Ok(Self {
            grid,
            base_resolution,
            base_range,
            margin,
        })
    }

    /// Wraps an existing visible grid.
    pub fn around(base: &Grid, margin: usize) -> Result<Self, EngineError> {
        Self::new(base.resolution().clone(), base.range(), margin)
    }

    pub fn from_blueprint(blueprint: &MarginGridBlueprint) -> Result<Self, EngineError> {
        Self::new(
            blueprint.resolution.clone(),
            blueprint.range,
            blueprint.margin,
        )
    }

    pub fn blueprint(&self) -> MarginGridBlueprint {
        MarginGridBlueprint {
            resolution: self.base_resolution.clone(),
            range: self.base_range,
            margin: self.margin,
        }
    }

    /// The enlarged grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn base_resolution(&self) -> &Resolution {
        &self.base_resolution
    }

    pub fn base_range(&self) -> GridRange {
        self.base_range
    }

    /// Flat index in the enlarged grid of center-area pixel `(col, row)`.
    #[inline]
    pub fn index_for_center_area(&self, col: usize, row: usize) -> usize {
        self.grid.index(col + self.margin, row + self.margin)
    }
}
