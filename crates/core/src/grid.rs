//! Pixel ↔ math coordinate mapping for a rectangular raster.
//!
//! A [`Grid`] owns no data, only geometry: a pixel resolution plus the math
//! range it covers. Pixels are square in math space; the vertical span is
//! always derived from the horizontal span and the aspect ratio. Row 0 is the
//! top of the image and corresponds to the largest math `y`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Separator used by the textual range codec (`xMin_xMax_yCenter`).
pub const RANGE_SEPARATOR: char = '_';

/// Horizontal extent and vertical center of a math range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_center: f64,
}

impl GridRange {
    /// Creates a range, rejecting `x_min >= x_max` and non-finite bounds.
    pub fn new(x_min: f64, x_max: f64, y_center: f64) -> Result<Self, EngineError> {
        let range = Self {
            x_min,
            x_max,
            y_center,
        };
        range.validate()?;
        Ok(range)
    }

    /// Checks the `x_max > x_min` invariant.
    pub fn validate(&self) -> Result<(), EngineError> {
        // Written as a negated comparison so NaN bounds are rejected too.
        if !(self.x_max > self.x_min) || !self.x_min.is_finite() || !self.x_max.is_finite() {
            return Err(EngineError::InvalidRange {
                x_min: self.x_min,
                x_max: self.x_max,
            });
        }
        if !self.y_center.is_finite() {
            return Err(EngineError::InvalidGridRange(format!(
                "y center must be finite, got {}",
                self.y_center
            )));
        }
        Ok(())
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Math-space center of the range.
    pub fn center(&self) -> (f64, f64) {
        (self.x_min + self.x_span() / 2.0, self.y_center)
    }
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.x_min,
            self.x_max,
            self.y_center,
            sep = RANGE_SEPARATOR
        )
    }
}

impl FromStr for GridRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(RANGE_SEPARATOR).collect();
        if parts.len() != 3 {
            tracing::warn!(input = s, "rejected grid range: expected 3 parts");
            return Err(EngineError::InvalidGridRange(format!(
                "expected xMin{RANGE_SEPARATOR}xMax{RANGE_SEPARATOR}yCenter, got '{s}'"
            )));
        }
        let mut values = [0.0_f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.trim().parse::<f64>().map_err(|_| {
                tracing::warn!(input = s, part = *part, "rejected grid range: not a number");
                EngineError::InvalidGridRange(format!("'{part}' is not a number"))
            })?;
        }
        let range = Self {
            x_min: values[0],
            x_max: values[1],
            y_center: values[2],
        };
        if let Err(err) = range.validate() {
            tracing::warn!(input = s, "rejected grid range: {err}");
            return Err(err);
        }
        Ok(range)
    }
}

/// A pixel resolution with a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
    pub description: String,
}

/// Named resolution presets, grouped by aspect ratio.
const PRESETS: &[(usize, usize, &str)] = &[
    (320, 320, "1:1 - Small preview"),
    (640, 640, "1:1 - Medium preview"),
    (960, 960, "1:1 - Large preview"),
    (1920, 1920, "1:1 - High-res export"),
    (4096, 4096, "1:1 - Ultra HD export"),
    (480, 320, "3:2 - Small preview"),
    (960, 640, "3:2 - Medium preview"),
    (1440, 960, "3:2 - Large preview"),
    (2880, 1920, "3:2 - High-res export"),
    (5760, 3840, "3:2 - Ultra HD export"),
    (320, 240, "4:3 - Small preview"),
    (800, 600, "4:3 - Medium preview"),
    (1024, 768, "4:3 - Large preview"),
    (1920, 1440, "4:3 - High-res export"),
    (4096, 3072, "4:3 - Ultra HD export"),
    (640, 360, "16:9 - Small preview"),
    (854, 480, "16:9 - Medium preview"),
    (1280, 720, "16:9 - Large preview"),
    (1920, 1080, "16:9 - Full HD standard"),
    (3840, 2160, "16:9 - 4K export"),
    (7680, 4320, "16:9 - 8K export"),
    (640, 400, "16:10 - Small preview"),
    (1024, 640, "16:10 - Medium preview"),
    (1280, 800, "16:10 - Large preview"),
    (1920, 1200, "16:10 - High-res export"),
    (3840, 2400, "16:10 - 4K export"),
    (688, 288, "43:18 - Small preview"),
    (1000, 420, "43:18 - Medium preview"),
    (2560, 1080, "43:18 - Ultrawide desktop"),
    (3840, 1620, "43:18 - High-res ultrawide"),
    (5120, 2160, "43:18 - 5K ultrawide export"),
];

impl Resolution {
    /// Creates a resolution labelled `WIDTHxHEIGHT`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            description: format!("{width}x{height}"),
        }
    }

    /// All named presets in display order.
    pub fn presets() -> Vec<Resolution> {
        PRESETS
            .iter()
            .map(|&(width, height, description)| Resolution {
                width,
                height,
                description: description.to_owned(),
            })
            .collect()
    }

    /// The resolution enlarged by `margin` pixels on every side.
    pub fn with_margin(&self, margin: usize) -> Resolution {
        Resolution {
            width: self.width + 2 * margin,
            height: self.height + 2 * margin,
            description: format!("{} + margin:{margin}", self.description),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Serializable description of a grid, rebuilt on the worker side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBlueprint {
    pub resolution: Resolution,
    pub range: GridRange,
}

/// Geometry of a raster over a math range.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    resolution: Resolution,
    range: GridRange,
    y_span: f64,
    y_min: f64,
    y_max: f64,
}

impl Grid {
    /// Creates a grid covering the unit range `[0, 1]` centered on `y = 0`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::from_resolution(
            Resolution::new(width, height),
            GridRange {
                x_min: 0.0,
                x_max: 1.0,
                y_center: 0.0,
            },
        )
    }

    /// Creates a `width × height` grid over `range`.
    pub fn with_range(width: usize, height: usize, range: GridRange) -> Result<Self, EngineError> {
        Self::from_resolution(Resolution::new(width, height), range)
    }

    /// Creates a grid from a labelled resolution and a range.
    pub fn from_resolution(resolution: Resolution, range: GridRange) -> Result<Self, EngineError> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        resolution
            .width
            .checked_mul(resolution.height)
            .ok_or(EngineError::InvalidDimensions)?;
        let mut grid = Self {
            resolution,
            range,
            y_span: 0.0,
            y_min: 0.0,
            y_max: 0.0,
        };
        grid.set_range(range)?;
        Ok(grid)
    }

    pub fn from_blueprint(blueprint: &GridBlueprint) -> Result<Self, EngineError> {
        Self::from_resolution(blueprint.resolution.clone(), blueprint.range)
    }

    pub fn blueprint(&self) -> GridBlueprint {
        GridBlueprint {
            resolution: self.resolution.clone(),
            range: self.range,
        }
    }

    /// Replaces the math range, keeping pixels square.
    ///
    /// The vertical span is recomputed from the aspect ratio so that
    /// `y_span = x_span / (width / height)`.
    pub fn set_range(&mut self, range: GridRange) -> Result<(), EngineError> {
        range.validate()?;
        let y_span = range.x_span() / self.ratio();
        self.range = range;
        self.y_span = y_span;
        self.y_min = range.y_center - y_span / 2.0;
        self.y_max = range.y_center + y_span / 2.0;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.resolution.width
    }

    pub fn height(&self) -> usize {
        self.resolution.height
    }

    /// Number of pixels.
    pub fn size(&self) -> usize {
        self.resolution.width * self.resolution.height
    }

    /// Aspect ratio `width / height`.
    pub fn ratio(&self) -> f64 {
        self.resolution.width as f64 / self.resolution.height as f64
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn range(&self) -> GridRange {
        self.range
    }

    pub fn x_min(&self) -> f64 {
        self.range.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.range.x_max
    }

    pub fn x_span(&self) -> f64 {
        self.range.x_span()
    }

    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn y_span(&self) -> f64 {
        self.y_span
    }

    /// Row-major flat index of pixel `(col, row)`.
    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.resolution.width + col
    }

    /// Math coordinate of the top-left corner of pixel `(col, row)`.
    #[inline]
    pub fn pixel_to_math(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.range.x_min + (col as f64 / self.resolution.width as f64) * self.range.x_span(),
            self.y_max - (row as f64 / self.resolution.height as f64) * self.y_span,
        )
    }

    /// Nearest pixel edge for a math coordinate. May fall outside the grid.
    pub fn math_to_pixel(&self, x: f64, y: f64) -> (isize, isize) {
        let col = (x - self.range.x_min) / self.range.x_span() * self.resolution.width as f64;
        let row = (self.y_max - y) / self.y_span * self.resolution.height as f64;
        (col.round() as isize, row.round() as isize)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "width: {}, height: {} -> size {}",
            self.width(),
            self.height(),
            self.size()
        )
    }
}
