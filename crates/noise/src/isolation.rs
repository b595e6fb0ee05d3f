//! Cleanup passes that keep dark Bernoulli pixels from forming streaks.
//!
//! Both passes walk the field row-major and only look at neighbors already
//! visited (to the left and in earlier rows), so every decision is final
//! once made.

use plane_engine_core::ScalarField;

/// Flips a `0` to `1` when its left neighbor or any of the three pixels
/// directly above (columns `-1..=1`) is also `0`.
pub fn isolate(field: &mut ScalarField) {
    let width = field.width();
    let height = field.height();
    let data = field.data_mut();
    for row in 0..height {
        for col in 0..width {
            let index = row * width + col;
            if data[index] != 0.0 {
                continue;
            }
            let left = col > 0 && data[index - 1] == 0.0;
            if left || any_zero_in_row(data, width, row, 1, col, 1) {
                data[index] = 1.0;
            }
        }
    }
}

/// Wider variant: checks two pixels to the left and columns `-2..=2` of the
/// two rows above, then grows each surviving `0` into a 2×2 block by
/// darkening its up-left, left and up neighbors.
pub fn isolate_big(field: &mut ScalarField) {
    let width = field.width();
    let height = field.height();
    let data = field.data_mut();
    for row in 0..height {
        for col in 0..width {
            let index = row * width + col;
            if data[index] != 0.0 {
                continue;
            }
            let left = (col > 0 && data[index - 1] == 0.0) || (col > 1 && data[index - 2] == 0.0);
            if left
                || any_zero_in_row(data, width, row, 2, col, 2)
                || any_zero_in_row(data, width, row, 1, col, 2)
            {
                data[index] = 1.0;
            }
        }
    }
    for row in 0..height {
        for col in 0..width {
            if data[row * width + col] != 0.0 {
                continue;
            }
            if row > 0 && col > 0 {
                data[(row - 1) * width + col - 1] = 0.0;
            }
            if col > 0 {
                data[row * width + col - 1] = 0.0;
            }
            if row > 0 {
                data[(row - 1) * width + col] = 0.0;
            }
        }
    }
}

/// Whether row `row - rows_up` has a `0` within `reach` columns of `col`.
fn any_zero_in_row(
    data: &[f64],
    width: usize,
    row: usize,
    rows_up: usize,
    col: usize,
    reach: usize,
) -> bool {
    let Some(above) = row.checked_sub(rows_up) else {
        return false;
    };
    let start = col.saturating_sub(reach);
    let end = (col + reach).min(width - 1);
    data[above * width + start..=above * width + end]
        .iter()
        .any(|&v| v == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros(field: &ScalarField) -> Vec<(usize, usize)> {
        field
            .iter()
            .filter(|&(_, _, v)| v == 0.0)
            .map(|(c, r, _)| (c, r))
            .collect()
    }

    #[test]
    fn isolate_on_all_dark_leaves_a_checker_of_rows() {
        let mut field = ScalarField::new(5, 5).unwrap();
        isolate(&mut field);
        let expected: Vec<(usize, usize)> = [0_usize, 2, 4]
            .into_iter()
            .flat_map(|r| [0_usize, 2, 4].into_iter().map(move |c| (c, r)))
            .collect();
        assert_eq!(zeros(&field), expected);
    }

    #[test]
    fn isolate_keeps_lone_zero() {
        let mut field = ScalarField::filled(4, 4, 1.0).unwrap();
        field.set(2, 2, 0.0);
        isolate(&mut field);
        assert_eq!(zeros(&field), vec![(2, 2)]);
    }

    #[test]
    fn isolate_removes_diagonal_follower() {
        let mut field = ScalarField::filled(4, 4, 1.0).unwrap();
        field.set(1, 1, 0.0);
        field.set(2, 2, 0.0);
        field.set(0, 3, 0.0);
        isolate(&mut field);
        // (2, 2) touches (1, 1) through the row above; (0, 3) is two columns away.
        assert_eq!(zeros(&field), vec![(1, 1), (0, 3)]);
    }

    #[test]
    fn isolate_big_grows_survivors_into_blocks() {
        let mut field = ScalarField::new(6, 6).unwrap();
        isolate_big(&mut field);
        assert_eq!(
            zeros(&field),
            vec![
                (0, 0),
                (2, 0),
                (3, 0),
                (0, 2),
                (2, 2),
                (3, 2),
                (0, 3),
                (2, 3),
                (3, 3),
            ]
        );
    }

    #[test]
    fn single_column_field_is_handled() {
        let mut field = ScalarField::new(1, 4).unwrap();
        isolate(&mut field);
        assert_eq!(zeros(&field), vec![(0, 0), (0, 2)]);
        let mut field = ScalarField::new(1, 4).unwrap();
        isolate_big(&mut field);
        assert!(field.data().iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
