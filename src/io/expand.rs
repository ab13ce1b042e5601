//! Wide-row to point expansion.
//!
//! Each input row holds [`POINTS_PER_ROW`] measurements laid out as blocks of
//! consecutive columns, one block per field:
//!
//! ```text
//! col  0        : row index
//! cols 1..=5    : y
//! cols 6..=10   : x
//! cols 11..=15  : simulated y (reserved, not read)
//! cols 16..=20  : y error (+)
//! cols 21..=25  : y error (-)
//! cols 26..=30  : x error (+)
//! cols 31..=35  : x error (-)
//! ```
//!
//! The offsets are fixed by the external file format; [`LAYOUT`] is the single
//! place they are written down.

use crate::domain::{Point, RawRow};

/// Measurements stored in one row.
pub const POINTS_PER_ROW: usize = 5;

/// A row needs at least this many cells to be expanded.
pub const MIN_COLUMNS: usize = 36;

/// Logical width of a row in the file format (includes the reserved block).
pub const SCHEMA_COLUMNS: usize = 37;

/// Semantic fields stored per point, numbered by their position in [`LAYOUT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Y = 0,
    X = 1,
    /// Noiseless model value written by simulations; never read by the fit.
    SimulatedY = 2,
    YErrHigh = 3,
    YErrLow = 4,
    XErrHigh = 5,
    XErrLow = 6,
}

/// A block of `count` consecutive columns starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub field: Field,
    pub start: usize,
    pub count: usize,
}

/// Column layout of the input format.
pub const LAYOUT: [Block; 7] = [
    Block { field: Field::Y, start: 1, count: POINTS_PER_ROW },
    Block { field: Field::X, start: 6, count: POINTS_PER_ROW },
    Block { field: Field::SimulatedY, start: 11, count: POINTS_PER_ROW },
    Block { field: Field::YErrHigh, start: 16, count: POINTS_PER_ROW },
    Block { field: Field::YErrLow, start: 21, count: POINTS_PER_ROW },
    Block { field: Field::XErrHigh, start: 26, count: POINTS_PER_ROW },
    Block { field: Field::XErrLow, start: 31, count: POINTS_PER_ROW },
];

/// Column index of point `slot` for `field`.
pub fn column(field: Field, slot: usize) -> usize {
    LAYOUT[field as usize].start + slot
}

/// Expand one row into its points, in slot order.
///
/// Returns an empty vector for rows narrower than [`MIN_COLUMNS`]; the table
/// parser never emits such rows, but callers may build `RawRow`s by hand.
pub fn expand_row(row: &RawRow) -> Vec<Point> {
    if row.cells.len() < MIN_COLUMNS {
        return Vec::new();
    }

    let cell = |field: Field, slot: usize| row.cells[column(field, slot)];

    (0..POINTS_PER_ROW)
        .map(|slot| Point {
            x: cell(Field::X, slot),
            y: cell(Field::Y, slot),
            x_err_low: cell(Field::XErrLow, slot),
            x_err_high: cell(Field::XErrHigh, slot),
            y_err_low: cell(Field::YErrLow, slot),
            y_err_high: cell(Field::YErrHigh, slot),
            line: row.line,
            slot,
        })
        .collect()
}

/// Expand all rows, preserving row order then slot order.
///
/// No point is dropped here; value-based filtering happens at fit time.
pub fn expand_rows(rows: &[RawRow]) -> Vec<Point> {
    let mut points = Vec::with_capacity(rows.len() * POINTS_PER_ROW);
    for row in rows {
        points.extend(expand_row(row));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_indexed_by_field() {
        for (i, block) in LAYOUT.iter().enumerate() {
            assert_eq!(block.field as usize, i);
        }
        assert_eq!(column(Field::Y, 0), 1);
        assert_eq!(column(Field::SimulatedY, 4), 15);
        assert_eq!(column(Field::XErrLow, 4), 35);
    }

    fn row_with(cells: Vec<f64>, line: u64) -> RawRow {
        RawRow {
            line,
            cells,
            substituted: 0,
        }
    }

    #[test]
    fn layout_blocks_are_contiguous_and_fit_the_schema() {
        let mut next = 1;
        for block in LAYOUT {
            assert_eq!(block.start, next);
            next += block.count;
        }
        assert_eq!(next, MIN_COLUMNS);
        assert!(MIN_COLUMNS <= SCHEMA_COLUMNS);
    }

    #[test]
    fn expands_five_points_from_fixed_offsets() {
        // Cell value == column index makes the offsets directly visible.
        let cells: Vec<f64> = (0..37).map(|i| i as f64).collect();
        let points = expand_row(&row_with(cells, 4));

        assert_eq!(points.len(), 5);
        for (j, p) in points.iter().enumerate() {
            let j_f = j as f64;
            assert_eq!(p.y, 1.0 + j_f);
            assert_eq!(p.x, 6.0 + j_f);
            assert_eq!(p.y_err_high, 16.0 + j_f);
            assert_eq!(p.y_err_low, 21.0 + j_f);
            assert_eq!(p.x_err_high, 26.0 + j_f);
            assert_eq!(p.x_err_low, 31.0 + j_f);
            assert_eq!(p.slot, j);
            assert_eq!(p.line, 4);
        }
    }

    #[test]
    fn exactly_min_columns_is_enough() {
        let cells: Vec<f64> = (0..36).map(|i| i as f64).collect();
        let points = expand_row(&row_with(cells, 1));
        assert_eq!(points.len(), 5);
        assert_eq!(points[4].x_err_low, 35.0);
    }

    #[test]
    fn narrow_row_yields_nothing() {
        let points = expand_row(&row_with(vec![1.0; 35], 1));
        assert!(points.is_empty());
    }

    #[test]
    fn non_positive_y_is_kept_and_order_is_preserved() {
        let mut first = vec![0.0; 37];
        first[1] = -3.0;
        first[2] = 0.0;
        let mut second = vec![1.0; 37];
        second[6] = 42.0;

        let points = expand_rows(&[row_with(first, 1), row_with(second, 2)]);
        assert_eq!(points.len(), 10);
        assert_eq!(points[0].y, -3.0);
        assert_eq!(points[1].y, 0.0);
        assert_eq!(points[5].line, 2);
        assert_eq!(points[5].x, 42.0);
    }
}
