//! Counting cells within a Manhattan distance of any positive cell.
//!
//! Two algorithms give the same answer at different costs:
//!
//! - **fill** walks the diamond around every flag. Cost grows with
//!   `flags * threshold^2`, so it wins on sparse grids.
//! - **scan** seeds every flag at level `threshold + 1` and makes
//!   `threshold` passes over the grid, each marking the unmarked
//!   4-neighbours of the previous level. Cost grows with
//!   `cells * threshold` regardless of flag count. It can run over a
//!   bounded window of rows at a time to cap memory.
//!
//! [`is_dense`] picks between them.

use log::{debug, info};

use crate::error::GridError;
use crate::grid::{Grid, GridCoordinate};

/// Relative speed of scan vs fill, used to bias the density cut-off.
pub const DENSITY_TUNE_FACTOR: f64 = 5.0;

/// Row window used by `--mem-saver`.
pub const MEM_SAVER_ROWS: usize = 500;

/// Flag positions of a grid, without the cell values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagGrid {
    rows: usize,
    cols: usize,
    /// Row-major, no duplicates, all in bounds.
    flags: Vec<GridCoordinate>,
}

impl FlagGrid {
    /// `flags` must be in bounds; they are sorted and deduplicated here.
    pub(crate) fn new(rows: usize, cols: usize, mut flags: Vec<GridCoordinate>) -> Self {
        debug_assert!(flags.iter().all(|f| f.row < rows && f.col < cols));
        flags.sort_unstable();
        flags.dedup();
        Self { rows, cols, flags }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    pub fn flags(&self) -> &[GridCoordinate] {
        &self.flags
    }

    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    /// One line per row, `1` for a flag and `0` otherwise.
    pub fn render(&self) -> String {
        let mut mask = vec![false; self.total()];
        for f in &self.flags {
            mask[f.row * self.cols + f.col] = true;
        }
        render_mask(&mask, self.cols)
    }
}

impl From<&Grid> for FlagGrid {
    fn from(grid: &Grid) -> Self {
        Self::new(grid.rows(), grid.cols(), grid.flag_positions())
    }
}

/// How the counting algorithm is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Density {
    /// Decide from flag count and threshold with [`is_dense`].
    #[default]
    Auto,
    /// Always use the fill algorithm.
    Sparse,
    /// Always use the scan algorithm.
    Dense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Fill,
    Scan,
}

impl Algorithm {
    fn alternate(self) -> Self {
        match self {
            Algorithm::Fill => Algorithm::Scan,
            Algorithm::Scan => Algorithm::Fill,
        }
    }
}

/// Options for [`count_within`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CountOptions {
    pub density: Density,
    /// Rows held in memory at once by the scan algorithm; `None` for all.
    pub window_rows: Option<usize>,
    /// Also run the other algorithm and fail if the counts differ.
    pub cross_check: bool,
}

/// Result of [`count_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborCount {
    pub count: usize,
    pub algorithm: Algorithm,
}

/// Whether flags are dense enough that scanning beats filling.
///
/// Every flag covers at most `2d(d+1)` cells besides itself. If that
/// coverage, summed over all flags and divided by the grid size, exceeds
/// `d * DENSITY_TUNE_FACTOR`, the diamonds overlap heavily and the scan is
/// cheaper.
pub fn is_dense(grid_size: usize, threshold: u32, flag_count: usize) -> bool {
    let d = f64::from(threshold);
    let coverage = 2.0 * d * (d + 1.0);
    let density = flag_count as f64 * coverage / grid_size.max(1) as f64;
    let cutoff = d * DENSITY_TUNE_FACTOR;
    let dense = density > cutoff;
    info!("distance threshold {threshold}, flag count {flag_count}, grid size {grid_size}");
    info!("coverage per flag 2 * d * (d + 1) = {coverage}, density {density:.4}");
    info!("density cut-off d * {DENSITY_TUNE_FACTOR} = {cutoff}, dense: {dense}");
    dense
}

/// Count cells within `threshold` Manhattan distance of a flag (flags
/// included), choosing the algorithm per `options.density`.
pub fn count_within(
    flags: &FlagGrid,
    threshold: u32,
    options: &CountOptions,
) -> Result<NeighborCount, GridError> {
    let algorithm = match options.density {
        Density::Auto => {
            if is_dense(flags.total(), threshold, flags.flag_count()) {
                Algorithm::Scan
            } else {
                Algorithm::Fill
            }
        }
        Density::Sparse => Algorithm::Fill,
        Density::Dense => Algorithm::Scan,
    };
    info!("counting with {algorithm:?}");
    debug!("input flags:\n{}", flags.render());

    let count = run(flags, threshold, algorithm, options.window_rows);
    if options.cross_check {
        let alternate = run(flags, threshold, algorithm.alternate(), options.window_rows);
        info!("alternate count {alternate}");
        if alternate != count {
            return Err(GridError::CountMismatch {
                primary: count,
                alternate,
            });
        }
    }
    Ok(NeighborCount { count, algorithm })
}

fn run(flags: &FlagGrid, threshold: u32, algorithm: Algorithm, window_rows: Option<usize>) -> usize {
    match algorithm {
        Algorithm::Fill => count_fill(flags, threshold),
        Algorithm::Scan => count_scan(flags, threshold, window_rows),
    }
}

// ---------------------------------------------------------------------------
// Fill
// ---------------------------------------------------------------------------

/// Fill algorithm: mark the diamond around each flag.
pub fn count_fill(flags: &FlagGrid, threshold: u32) -> usize {
    fill_mask(flags, threshold).1
}

/// Cells within `threshold` of a flag, row-major, one line per row.
pub fn render_coverage(flags: &FlagGrid, threshold: u32) -> String {
    render_mask(&fill_mask(flags, threshold).0, flags.cols)
}

fn fill_mask(flags: &FlagGrid, threshold: u32) -> (Vec<bool>, usize) {
    let (rows, cols) = (flags.rows, flags.cols);
    let d = threshold as usize;
    let mut marked = vec![false; rows * cols];
    let mut count = 0;
    for f in &flags.flags {
        let first_row = f.row.saturating_sub(d);
        let last_row = f.row.saturating_add(d).min(rows - 1);
        for row in first_row..=last_row {
            let reach = d - row.abs_diff(f.row);
            let first_col = f.col.saturating_sub(reach);
            let last_col = f.col.saturating_add(reach).min(cols - 1);
            let line = &mut marked[row * cols + first_col..=row * cols + last_col];
            for cell in line {
                if !*cell {
                    *cell = true;
                    count += 1;
                }
            }
        }
    }
    (marked, count)
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Scan algorithm. With `window_rows`, only that many rows (plus a
/// `threshold`-row margin on each side) are held at once.
pub fn count_scan(flags: &FlagGrid, threshold: u32, window_rows: Option<usize>) -> usize {
    let (rows, cols) = (flags.rows, flags.cols);
    if rows == 0 || flags.flags.is_empty() {
        return 0;
    }
    // No cell is further than rows + cols from any flag.
    let threshold = threshold.min(u32::try_from(rows + cols).unwrap_or(u32::MAX - 1));
    let d = threshold as usize;
    let window = window_rows.unwrap_or(rows).clamp(1, rows);
    let mut count = 0;
    let mut start = 0;
    while start < rows {
        let end = (start + window).min(rows);
        // Any flag within `d` of rows [start, end) lies in [lo, hi), and so
        // does every shortest path from it.
        let lo = start.saturating_sub(d);
        let hi = end.saturating_add(d).min(rows);
        let first = flags.flags.partition_point(|f| f.row < lo);
        let last = flags.flags.partition_point(|f| f.row < hi);
        let seeds = &flags.flags[first..last];

        let levels = scan_levels(hi - lo, cols, lo, seeds, threshold);
        let inner = &levels[(start - lo) * cols..(end - lo) * cols];
        let found = inner.iter().filter(|&&l| l > 0).count();
        debug!("scan window rows {start}..{end} (held {lo}..{hi}): {found} cells");
        count += found;
        start = end;
    }
    count
}

/// Multi-pass level propagation over `rows x cols` cells whose first row is
/// grid row `row_offset`. Flags start at `threshold + 1`; pass `level`
/// marks unmarked cells next to a `level + 1` cell with `level`. Zero means
/// out of reach.
fn scan_levels(
    rows: usize,
    cols: usize,
    row_offset: usize,
    seeds: &[GridCoordinate],
    threshold: u32,
) -> Vec<u32> {
    let total = rows * cols;
    let mut levels = vec![0u32; total];
    for f in seeds {
        levels[(f.row - row_offset) * cols + f.col] = threshold + 1;
    }
    let mut marked = seeds.len();
    for level in (1..=threshold).rev() {
        if marked == total {
            debug!("all cells marked, stopping at level {level}");
            break;
        }
        let source = level + 1;
        let mut newly = 0;
        for row in 0..rows {
            for col in 0..cols {
                let i = row * cols + col;
                if levels[i] != 0 {
                    continue;
                }
                let near = (row > 0 && levels[i - cols] == source)
                    || (row + 1 < rows && levels[i + cols] == source)
                    || (col > 0 && levels[i - 1] == source)
                    || (col + 1 < cols && levels[i + 1] == source);
                if near {
                    levels[i] = level;
                    newly += 1;
                }
            }
        }
        marked += newly;
        debug!("after level {level}: {marked} cells marked");
        if newly == 0 {
            break;
        }
    }
    levels
}

fn render_mask(mask: &[bool], cols: usize) -> String {
    let mut out = String::with_capacity(mask.len() + mask.len() / cols.max(1));
    for row in mask.chunks(cols.max(1)) {
        out.extend(row.iter().map(|&m| if m { '1' } else { '0' }));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(rows: usize, cols: usize, at: &[(usize, usize)]) -> FlagGrid {
        FlagGrid::new(
            rows,
            cols,
            at.iter().map(|&(row, col)| GridCoordinate { row, col }).collect(),
        )
    }

    /// Reference answer: check every cell against every flag.
    fn brute_force(fg: &FlagGrid, threshold: u32) -> usize {
        let d = threshold as usize;
        (0..fg.rows())
            .flat_map(|r| (0..fg.cols()).map(move |c| (r, c)))
            .filter(|&(r, c)| {
                fg.flags()
                    .iter()
                    .any(|f| f.row.abs_diff(r) + f.col.abs_diff(c) <= d)
            })
            .count()
    }

    fn all_counts(fg: &FlagGrid, threshold: u32) -> [usize; 4] {
        [
            count_fill(fg, threshold),
            count_scan(fg, threshold, None),
            count_scan(fg, threshold, Some(1)),
            count_scan(fg, threshold, Some(2)),
        ]
    }

    #[test]
    fn threshold_zero_counts_flags() {
        let fg = flags(4, 4, &[(0, 0), (1, 2), (3, 3)]);
        assert_eq!(all_counts(&fg, 0), [3; 4]);
    }

    #[test]
    fn no_flags() {
        let fg = flags(3, 5, &[]);
        assert_eq!(all_counts(&fg, 4), [0; 4]);
    }

    #[test]
    fn centre_diamond() {
        let fg = flags(5, 5, &[(2, 2)]);
        assert_eq!(all_counts(&fg, 1), [5; 4]);
        assert_eq!(all_counts(&fg, 2), [13; 4]);
    }

    #[test]
    fn corner_clipped() {
        // r + c <= 2: 3 + 2 + 1 cells
        let fg = flags(5, 5, &[(0, 0)]);
        assert_eq!(all_counts(&fg, 2), [6; 4]);
    }

    #[test]
    fn edge_clipped() {
        let fg = flags(5, 5, &[(0, 2)]);
        assert_eq!(all_counts(&fg, 1), [4; 4]);
    }

    #[test]
    fn single_row_document_example() {
        let fg = flags(1, 3, &[(0, 0)]);
        assert_eq!(all_counts(&fg, 1), [2; 4]);
    }

    #[test]
    fn overlapping_diamonds() {
        let fg = flags(1, 5, &[(0, 0), (0, 2)]);
        assert_eq!(all_counts(&fg, 1), [4; 4]);

        // Opposite corners of a 3x3 at distance 2 cover everything.
        let fg = flags(3, 3, &[(0, 0), (2, 2)]);
        assert_eq!(all_counts(&fg, 2), [9; 4]);
    }

    #[test]
    fn threshold_larger_than_grid() {
        let fg = flags(3, 4, &[(1, 1)]);
        assert_eq!(all_counts(&fg, 50), [12; 4]);
    }

    #[test]
    fn windows_match_brute_force() {
        let fg = flags(
            9,
            7,
            &[(0, 6), (2, 1), (4, 4), (5, 0), (8, 3), (8, 6)],
        );
        for threshold in 0..6 {
            let expected = brute_force(&fg, threshold);
            assert_eq!(count_fill(&fg, threshold), expected, "fill d={threshold}");
            for window in 1..=10 {
                assert_eq!(
                    count_scan(&fg, threshold, Some(window)),
                    expected,
                    "scan d={threshold} window={window}"
                );
            }
        }
    }

    #[test]
    fn density_cut_off() {
        // d = 2: flags * 12 / 100 > 10  <=>  flags > 83.3
        assert!(is_dense(100, 2, 84));
        assert!(!is_dense(100, 2, 83));
        assert!(!is_dense(100, 0, 100));
        assert!(!is_dense(0, 3, 0));
    }

    #[test]
    fn density_override() {
        let fg = flags(10, 10, &[(5, 5)]);
        let sparse = count_within(&fg, 2, &CountOptions::default()).unwrap();
        assert_eq!(sparse.algorithm, Algorithm::Fill);
        let forced = count_within(
            &fg,
            2,
            &CountOptions {
                density: Density::Dense,
                ..CountOptions::default()
            },
        )
        .unwrap();
        assert_eq!(forced.algorithm, Algorithm::Scan);
        assert_eq!(sparse.count, forced.count);
        assert_eq!(sparse.count, 13);
    }

    #[test]
    fn auto_picks_scan_when_dense() {
        let all: Vec<(usize, usize)> = (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).collect();
        let fg = flags(10, 10, &all);
        let result = count_within(&fg, 2, &CountOptions::default()).unwrap();
        assert_eq!(result.algorithm, Algorithm::Scan);
        assert_eq!(result.count, 100);
    }

    #[test]
    fn cross_check_agrees() {
        let fg = flags(6, 6, &[(0, 0), (3, 4), (5, 1)]);
        let options = CountOptions {
            cross_check: true,
            window_rows: Some(2),
            ..CountOptions::default()
        };
        let result = count_within(&fg, 2, &options).unwrap();
        assert_eq!(result.count, brute_force(&fg, 2));
    }

    #[test]
    fn render_flags_and_coverage() {
        let fg = flags(3, 3, &[(1, 1)]);
        assert_eq!(fg.render(), "000\n010\n000\n");
        assert_eq!(render_coverage(&fg, 1), "010\n111\n010\n");
    }

    #[test]
    fn from_grid_uses_positive_cells() {
        let grid = Grid::from_rows(vec![vec![-1, 4], vec![10, -1]]).unwrap();
        let fg = FlagGrid::from(&grid);
        assert_eq!(
            fg.flags(),
            &[
                GridCoordinate { row: 0, col: 1 },
                GridCoordinate { row: 1, col: 0 },
            ]
        );
        assert_eq!(count_fill(&fg, 1), 4);
    }

    #[test]
    fn new_sorts_and_dedups() {
        let fg = flags(2, 2, &[(1, 1), (0, 1), (1, 1)]);
        assert_eq!(fg.flag_count(), 2);
        assert_eq!(fg.flags()[0], GridCoordinate { row: 0, col: 1 });
    }
}
