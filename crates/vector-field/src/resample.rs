//! Bilinear upsampling of a coarse vector field.

use plane_engine_core::{EngineError, Grid, Vector, VectorFieldData};

/// Interpolates between four corner samples: `q00` top-left, `q10`
/// top-right, `q01` bottom-left, `q11` bottom-right. `col_frac` and
/// `row_frac` are the fractional position from the top-left sample.
#[inline]
pub fn bilinear(
    col_frac: f64,
    row_frac: f64,
    q00: (f64, f64),
    q10: (f64, f64),
    q01: (f64, f64),
    q11: (f64, f64),
) -> (f64, f64) {
    let top = (
        (1.0 - col_frac) * q00.0 + col_frac * q10.0,
        (1.0 - col_frac) * q00.1 + col_frac * q10.1,
    );
    let bottom = (
        (1.0 - col_frac) * q01.0 + col_frac * q11.0,
        (1.0 - col_frac) * q01.1 + col_frac * q11.1,
    );
    (
        (1.0 - row_frac) * top.0 + row_frac * bottom.0,
        (1.0 - row_frac) * top.1 + row_frac * bottom.1,
    )
}

/// Stretches `low` (sampled on `low_grid`) over `grid` so that the corner
/// pixels of both grids coincide.
///
/// A single-pixel axis maps every pixel to low-resolution index 0.
pub fn upsample(
    low_grid: &Grid,
    low: &VectorFieldData,
    grid: &Grid,
) -> Result<VectorFieldData, EngineError> {
    if low.len() != low_grid.size() {
        return Err(EngineError::SizeMismatch {
            expected: low_grid.size(),
            got: low.len(),
        });
    }
    let col_scale = axis_scale(low_grid.width(), grid.width());
    let row_scale = axis_scale(low_grid.height(), grid.height());
    let direction = |col: usize, row: usize| {
        let v = low.get(low_grid.index(col, row));
        (v.vx, v.vy)
    };

    let mut data = VectorFieldData::for_grid(grid);
    for row in 0..grid.height() {
        let row_low = row as f64 * row_scale;
        let row0 = (row_low.floor() as usize).min(low_grid.height() - 1);
        let row1 = (row0 + 1).min(low_grid.height() - 1);
        let row_frac = row_low - row0 as f64;
        for col in 0..grid.width() {
            let col_low = col as f64 * col_scale;
            let col0 = (col_low.floor() as usize).min(low_grid.width() - 1);
            let col1 = (col0 + 1).min(low_grid.width() - 1);
            let col_frac = col_low - col0 as f64;
            let (vx, vy) = bilinear(
                col_frac,
                row_frac,
                direction(col0, row0),
                direction(col1, row0),
                direction(col0, row1),
                direction(col1, row1),
            );
            data.set(grid.index(col, row), Vector::from_raw(vx, vy));
        }
    }
    Ok(data)
}

fn axis_scale(low: usize, high: usize) -> f64 {
    if high <= 1 {
        0.0
    } else {
        (low - 1) as f64 / (high - 1) as f64
    }
}
