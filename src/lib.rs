pub mod compress;
pub mod error;
pub mod grid;
pub mod neighbors;
pub mod output;
pub mod placement;
pub mod reader;

pub use error::GridError;
pub use grid::{Grid, GridCoordinate, GridSpec};
pub use placement::{Strategy, generate};

/// File written when no `--output` is given.
pub const DEFAULT_OUTPUT: &str = "output.json";
