use std::fmt;

/// Errors raised while validating generator inputs or reading a grid back.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// `rows` or `cols` was zero or negative.
    InvalidDimensions { rows: i64, cols: i64 },
    /// Percentage outside `[0, 100]`, or NaN.
    InvalidPercentage(f64),
    /// `rows * cols` does not fit in a cell index.
    TooLarge { rows: i64, cols: i64 },
    /// Input is not a `{"data": [[...], ...]}` document.
    Malformed(String),
    /// A row's length differs from the first row's.
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A cell is neither the sentinel nor a value in the positive range.
    InvalidCell { row: usize, col: usize, value: String },
    /// Negative or oversized distance threshold.
    InvalidThreshold(i64),
    /// No threshold given on the command line or in the document.
    MissingThreshold,
    /// The two counting algorithms disagreed.
    CountMismatch { primary: usize, alternate: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidDimensions { rows, cols } => write!(
                f,
                "grid dimensions must be positive integers (got {rows}x{cols})"
            ),
            GridError::InvalidPercentage(p) => {
                write!(f, "percentage must be between 0 and 100 (got {p})")
            }
            GridError::TooLarge { rows, cols } => {
                write!(f, "grid of {rows}x{cols} cells is too large")
            }
            GridError::Malformed(msg) => write!(f, "malformed grid document: {msg}"),
            GridError::NotRectangular {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row} has {found} columns, expected {expected}"
            ),
            GridError::InvalidCell { row, col, value } => {
                write!(f, "cell ({row}, {col}) holds {value}, expected -1 or 1..=10")
            }
            GridError::InvalidThreshold(d) => {
                write!(f, "distance threshold must be a non-negative integer (got {d})")
            }
            GridError::MissingThreshold => write!(
                f,
                "no distance threshold: pass --threshold or add \"distanceThreshold\" to the file"
            ),
            GridError::CountMismatch { primary, alternate } => write!(
                f,
                "primary count {primary} and alternate count {alternate} do not match"
            ),
        }
    }
}

impl std::error::Error for GridError {}
