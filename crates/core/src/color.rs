//! 8-bit colors and the cyclic color mapper used to colorize scalar fields.
//!
//! Colorization happens outside the numeric core: engines only describe how
//! their output should be drawn through a [`ColorScheme`], and the snapshot
//! layer applies it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;
use crate::field::is_sentinel;

/// 8-bit sRGB color. Serializes as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const WHITE: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};
pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
pub const STEELBLUE: Rgb = Rgb {
    r: 70,
    g: 130,
    b: 180,
};

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray level for an intensity in `[0, 1]`; out-of-range input is clamped.
    pub fn gray(intensity: f64) -> Self {
        let v = (intensity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r: v, g: v, b: v }
    }

    /// Parses `"#rrggbb"` or `"rrggbb"`, case insensitive.
    pub fn from_hex(hex: &str) -> Result<Self, EngineError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Self {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// One stop of a cyclic gradient: the color at the segment start and the
/// length of value space it spans before blending into the next stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSegment {
    pub color: Rgb,
    pub cycle_length: f64,
}

impl ColorSegment {
    pub fn new(color: Rgb, cycle_length: f64) -> Self {
        Self {
            color,
            cycle_length,
        }
    }
}

/// Maps non-negative values onto a repeating gradient.
///
/// Each segment interpolates linearly from its own color to the next
/// segment's color, wrapping from the last segment back to the first.
/// Negative values get the fallback color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    segments: Vec<ColorSegment>,
    total_cycle_length: f64,
    fallback: Rgb,
}

impl ColorMapper {
    /// Fails unless there are at least two segments, each with a positive
    /// cycle length.
    pub fn new(segments: Vec<ColorSegment>, fallback: Rgb) -> Result<Self, EngineError> {
        if segments.len() < 2 {
            return Err(EngineError::InvalidColorMap(format!(
                "at least two color segments are required, got {}",
                segments.len()
            )));
        }
        if let Some(bad) = segments
            .iter()
            .find(|s| !(s.cycle_length > 0.0) || !s.cycle_length.is_finite())
        {
            return Err(EngineError::InvalidColorMap(format!(
                "cycle length must be positive, got {}",
                bad.cycle_length
            )));
        }
        let total_cycle_length = segments.iter().map(|s| s.cycle_length).sum();
        Ok(Self {
            segments,
            total_cycle_length,
            fallback,
        })
    }

    /// Two-stop black ↔ white cycle.
    pub fn black_white(cycle_length: f64, fallback: Rgb) -> Result<Self, EngineError> {
        Self::new(
            vec![
                ColorSegment::new(BLACK, cycle_length),
                ColorSegment::new(WHITE, cycle_length),
            ],
            fallback,
        )
    }

    pub fn fallback(&self) -> Rgb {
        self.fallback
    }

    pub fn segments(&self) -> &[ColorSegment] {
        &self.segments
    }

    pub fn map(&self, value: f64) -> Rgb {
        if !(value >= 0.0) || !value.is_finite() {
            return self.fallback;
        }
        let position = value % self.total_cycle_length;
        let mut start = 0.0;
        for (i, segment) in self.segments.iter().enumerate() {
            let end = start + segment.cycle_length;
            if position >= start && position < end {
                let next = &self.segments[(i + 1) % self.segments.len()];
                let t = (position - start) / segment.cycle_length;
                return Rgb {
                    r: lerp_channel(segment.color.r, next.color.r, t),
                    g: lerp_channel(segment.color.g, next.color.g, t),
                    b: lerp_channel(segment.color.b, next.color.b, t),
                };
            }
            start = end;
        }
        self.fallback
    }
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    let from = f64::from(from);
    let to = f64::from(to);
    (from + t * (to - from)).round().clamp(0.0, 255.0) as u8
}

/// How an engine's scalar output is turned into pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScheme {
    /// Values in `[0, 1]` as gray levels; sentinel pixels get `undefined`.
    Grayscale { undefined: Rgb },
    /// Values through a cyclic mapper; a value equal to `inside` (e.g. the
    /// iteration cap) is drawn with the mapper's fallback color.
    Cyclic {
        mapper: ColorMapper,
        inside: Option<f64>,
    },
}

impl ColorScheme {
    pub fn color(&self, value: f64) -> Rgb {
        match self {
            ColorScheme::Grayscale { undefined } => {
                if is_sentinel(value) || value.is_nan() {
                    *undefined
                } else {
                    Rgb::gray(value)
                }
            }
            ColorScheme::Cyclic { mapper, inside } => {
                if inside.is_some_and(|v| v == value) {
                    mapper.fallback()
                } else {
                    mapper.map(value)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SENTINEL;

    fn red_blue() -> ColorMapper {
        ColorMapper::new(
            vec![ColorSegment::new(RED, 10.0), ColorSegment::new(BLUE, 10.0)],
            GREEN,
        )
        .unwrap()
    }

    #[test]
    fn gray_rounds_and_clamps() {
        assert_eq!(Rgb::gray(0.0), BLACK);
        assert_eq!(Rgb::gray(1.0), WHITE);
        assert_eq!(Rgb::gray(0.5), Rgb::new(128, 128, 128));
        assert_eq!(Rgb::gray(7.0), WHITE);
        assert_eq!(Rgb::gray(-1.0), BLACK);
    }

    #[test]
    fn hex_parse_and_format() {
        assert_eq!(Rgb::from_hex("#4682B4").unwrap(), STEELBLUE);
        assert_eq!(Rgb::from_hex("4682b4").unwrap(), STEELBLUE);
        assert_eq!(STEELBLUE.to_hex(), "#4682b4");
    }

    #[test]
    fn hex_parse_rejects_garbage() {
        assert!(matches!(
            Rgb::from_hex("#12345"),
            Err(EngineError::InvalidColor(_))
        ));
        assert!(matches!(
            Rgb::from_hex("#gg0000"),
            Err(EngineError::InvalidColor(_))
        ));
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn rgb_serializes_as_hex_string() {
        let json = serde_json::to_string(&STEELBLUE).unwrap();
        assert_eq!(json, "\"#4682b4\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, STEELBLUE);
    }

    #[test]
    fn mapper_requires_two_segments() {
        let result = ColorMapper::new(vec![ColorSegment::new(RED, 1.0)], BLACK);
        assert!(matches!(result, Err(EngineError::InvalidColorMap(_))));
    }

    #[test]
    fn mapper_rejects_non_positive_cycle_length() {
        for bad in [0.0, -1.0, f64::NAN] {
            let result = ColorMapper::new(
                vec![ColorSegment::new(RED, 1.0), ColorSegment::new(BLUE, bad)],
                BLACK,
            );
            assert!(matches!(result, Err(EngineError::InvalidColorMap(_))), "{bad}");
        }
    }

    #[test]
    fn mapper_starts_each_segment_at_its_color() {
        let m = red_blue();
        assert_eq!(m.map(0.0), RED);
        assert_eq!(m.map(10.0), BLUE);
    }

    #[test]
    fn mapper_interpolates_towards_next_segment() {
        let m = red_blue();
        assert_eq!(m.map(5.0), Rgb::new(128, 0, 128));
        // last segment blends back into the first
        assert_eq!(m.map(15.0), Rgb::new(128, 0, 128));
    }

    #[test]
    fn mapper_wraps_around_total_cycle() {
        let m = red_blue();
        assert_eq!(m.map(20.0), m.map(0.0));
        assert_eq!(m.map(47.5), m.map(7.5));
    }

    #[test]
    fn mapper_uses_fallback_for_negative_values() {
        let m = red_blue();
        assert_eq!(m.map(-0.5), GREEN);
        assert_eq!(m.map(SENTINEL), GREEN);
        assert_eq!(m.map(f64::NAN), GREEN);
    }

    #[test]
    fn grayscale_scheme_marks_sentinel() {
        let scheme = ColorScheme::Grayscale { undefined: STEELBLUE };
        assert_eq!(scheme.color(SENTINEL), STEELBLUE);
        assert_eq!(scheme.color(1.0), WHITE);
    }

    #[test]
    fn cyclic_scheme_draws_inside_with_fallback() {
        let scheme = ColorScheme::Cyclic {
            mapper: ColorMapper::black_white(255.0, BLACK).unwrap(),
            inside: Some(255.0),
        };
        assert_eq!(scheme.color(255.0), BLACK);
        assert_eq!(scheme.color(0.0), BLACK);
        assert_eq!(scheme.color(254.0), Rgb::gray(254.0 / 255.0));
    }
}
