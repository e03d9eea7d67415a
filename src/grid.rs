//! Grid dimensions and the dense row-major grid itself.

use crate::error::GridError;

/// Placeholder for cells that did not receive a positive value.
pub const SENTINEL: i32 = -1;
/// Smallest value a positive cell can hold.
pub const MIN_VALUE: i32 = 1;
/// Largest value a positive cell can hold.
pub const MAX_VALUE: i32 = 10;

/// Returns true if `value` is a legal cell value.
#[inline]
pub fn is_valid_cell(value: i32) -> bool {
    value == SENTINEL || (MIN_VALUE..=MAX_VALUE).contains(&value)
}

/// Validated generator inputs.
///
/// Construction is the only place dimensions and percentage are checked, so
/// holding a `GridSpec` means the grid can be built without further errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    rows: usize,
    cols: usize,
    percentage: f64,
}

impl GridSpec {
    /// Dimensions are checked before the percentage. Signed inputs are taken
    /// so that `0` and negative values from the command line reach validation
    /// instead of failing to parse.
    pub fn new(rows: i64, cols: i64, percentage: f64) -> Result<Self, GridError> {
        if rows <= 0 || cols <= 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        // NaN fails the range check too.
        if !(0.0..=100.0).contains(&percentage) {
            return Err(GridError::InvalidPercentage(percentage));
        }
        let too_large = || GridError::TooLarge { rows, cols };
        let r = usize::try_from(rows).map_err(|_| too_large())?;
        let c = usize::try_from(cols).map_err(|_| too_large())?;
        r.checked_mul(c).ok_or_else(too_large)?;
        Ok(Self {
            rows: r,
            cols: c,
            percentage,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Total number of cells.
    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of cells that receive a positive value:
    /// `floor(total * percentage / 100)`, capped at `total`.
    pub fn target(&self) -> usize {
        let total = self.total();
        let target = (total as f64 * self.percentage / 100.0).floor() as usize;
        target.min(total)
    }
}

/// A `(row, col)` position in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoordinate {
    pub row: usize,
    pub col: usize,
}

/// Dense `rows x cols` grid of cell values, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<i32>,
}

impl Grid {
    /// A grid with every cell set to [`SENTINEL`].
    pub(crate) fn sentinel(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![SENTINEL; rows * cols],
        }
    }

    /// Build a grid from nested rows, checking shape and cell values.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, GridError> {
        let Some(first) = rows.first() else {
            return Err(GridError::Malformed("empty data array".to_string()));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(GridError::Malformed("empty row".to_string()));
        }
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::NotRectangular {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if !is_valid_cell(value) {
                    return Err(GridError::InvalidCell {
                        row: r,
                        col: c,
                        value: value.to_string(),
                    });
                }
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    /// Set the cell at a linear index (`row * cols + col`).
    pub(crate) fn set_linear(&mut self, index: usize, value: i32) {
        self.cells[index] = value;
    }

    /// Iterate rows top to bottom.
    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[i32]> {
        self.cells.chunks_exact(self.cols)
    }

    /// Number of cells holding a positive value.
    pub fn positive_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v > 0).count()
    }

    /// Coordinates of every positive cell, in row-major order.
    pub fn flag_positions(&self) -> Vec<GridCoordinate> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0)
            .map(|(i, _)| GridCoordinate {
                row: i / self.cols,
                col: i % self.cols,
            })
            .collect()
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.iter_rows().map(<[i32]>::to_vec).collect()
    }
}
