//! Pixel-border stepping for streamline tracing.
//!
//! Inside a pixel the streamline is a straight segment along the pixel's
//! vector. Positions are local to the pixel's unit square, with `x` growing
//! to the right and `y` growing upwards (towards the previous row).

/// How far off a crossed border the next position is placed.
pub const BORDER_OFFSET: f64 = 0.01;

/// The result of leaving a pixel through one of its borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub col_diff: isize,
    pub row_diff: isize,
    /// Entry position in the neighboring pixel.
    pub x: f64,
    pub y: f64,
    /// Length of the segment inside the pixel just left.
    pub distance: f64,
}

/// Follows `(vx, vy)` from `(x, y)` to the nearest border in its path.
///
/// Parameters `α` for the top, bottom, left and right borders are compared
/// and the smallest positive one wins; ties go to the first in that order.
/// Returns `None` when no border is ahead, i.e. for a zero or NaN vector.
///
/// The coordinate along the crossed border is kept [`BORDER_OFFSET`] away
/// from the corners so a path through a corner cannot end up sliding along
/// a border.
pub fn next_area(x: f64, y: f64, vx: f64, vy: f64) -> Option<Step> {
    let alphas = [(1.0 - y) / vy, -y / vy, -x / vx, (1.0 - x) / vx];
    let mut border = 0;
    let mut alpha = f64::INFINITY;
    for (i, &candidate) in alphas.iter().enumerate() {
        if candidate > 0.0 && candidate < alpha {
            border = i;
            alpha = candidate;
        }
    }
    if !alpha.is_finite() {
        return None;
    }

    let distance = (alpha * vx).hypot(alpha * vy);
    let step = match border {
        0 => Step {
            col_diff: 0,
            row_diff: -1,
            x: along_border(x + alpha * vx),
            y: BORDER_OFFSET,
            distance,
        },
        1 => Step {
            col_diff: 0,
            row_diff: 1,
            x: along_border(x + alpha * vx),
            y: 1.0 - BORDER_OFFSET,
            distance,
        },
        2 => Step {
            col_diff: -1,
            row_diff: 0,
            x: 1.0 - BORDER_OFFSET,
            y: along_border(y + alpha * vy),
            distance,
        },
        _ => Step {
            col_diff: 1,
            row_diff: 0,
            x: BORDER_OFFSET,
            y: along_border(y + alpha * vy),
            distance,
        },
    };
    Some(step)
}

#[inline]
fn along_border(t: f64) -> f64 {
    t.clamp(BORDER_OFFSET, 1.0 - BORDER_OFFSET)
}
