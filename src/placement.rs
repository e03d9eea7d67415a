//! Choosing which cells get positive values.
//!
//! Both strategies pick a subset of linear cell indices uniformly at random
//! without replacement, then give each chosen cell a value drawn uniformly
//! from `MIN_VALUE..=MAX_VALUE`. They differ only in cost.
use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::grid::{Grid, GridSpec, MAX_VALUE, MIN_VALUE};

/// Index selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Strategy {
    /// Draw random indices until `target` distinct ones have been seen.
    ///
    /// Cheap for sparse grids. Near 100% the last few cells take on the
    /// order of `total` draws each.
    #[default]
    Rejection,
    /// Floyd/partial-shuffle selection of exactly `target` indices; linear
    /// in `target` regardless of density.
    Sample,
}

/// Build a grid for `spec`, drawing all randomness from `rng`.
pub fn generate<R: Rng + ?Sized>(spec: &GridSpec, strategy: Strategy, rng: &mut R) -> Grid {
    let total = spec.total();
    let target = spec.target();
    let mut grid = Grid::sentinel(spec.rows(), spec.cols());
    debug!(
        "placing {target} of {total} cells ({}x{}) using {strategy:?}",
        spec.rows(),
        spec.cols()
    );
    if target == 0 {
        return grid;
    }
    match strategy {
        Strategy::Rejection => place_rejection(&mut grid, total, target, rng),
        Strategy::Sample => place_sample(&mut grid, total, target, rng),
    }
    grid
}

fn place_rejection<R: Rng + ?Sized>(grid: &mut Grid, total: usize, target: usize, rng: &mut R) {
    let mut chosen = HashSet::with_capacity(target);
    let mut draws: u64 = 0;
    while chosen.len() < target {
        draws += 1;
        let index = rng.gen_range(0..total);
        if chosen.insert(index) {
            grid.set_linear(index, rng.gen_range(MIN_VALUE..=MAX_VALUE));
        }
    }
    debug!("rejection sampling took {draws} draws for {target} cells");
}

fn place_sample<R: Rng + ?Sized>(grid: &mut Grid, total: usize, target: usize, rng: &mut R) {
    let indices = rand::seq::index::sample(rng, total, target);
    for index in indices.iter() {
        grid.set_linear(index, rng.gen_range(MIN_VALUE..=MAX_VALUE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SENTINEL;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const STRATEGIES: [Strategy; 2] = [Strategy::Rejection, Strategy::Sample];

    fn check_invariants(grid: &Grid, spec: &GridSpec) {
        assert_eq!(grid.rows(), spec.rows());
        assert_eq!(grid.cols(), spec.cols());
        assert!(grid.iter_rows().all(|r| r.len() == spec.cols()));
        assert_eq!(grid.positive_count(), spec.target());
        for row in grid.iter_rows() {
            for &v in row {
                assert!(v == SENTINEL || (MIN_VALUE..=MAX_VALUE).contains(&v), "{v}");
            }
        }
    }

    #[test]
    fn two_by_three_half() {
        for strategy in STRATEGIES {
            let spec = GridSpec::new(2, 3, 50.0).unwrap();
            let grid = generate(&spec, strategy, &mut StdRng::seed_from_u64(7));
            check_invariants(&grid, &spec);
            let sentinels = grid
                .iter_rows()
                .flatten()
                .filter(|&&v| v == SENTINEL)
                .count();
            assert_eq!(sentinels, 3);
        }
    }

    #[test]
    fn zero_percent_is_all_sentinel() {
        for strategy in STRATEGIES {
            let spec = GridSpec::new(4, 5, 0.0).unwrap();
            let grid = generate(&spec, strategy, &mut StdRng::seed_from_u64(1));
            assert!(grid.iter_rows().flatten().all(|&v| v == SENTINEL));
        }
    }

    #[test]
    fn full_percent_has_no_sentinel() {
        for strategy in STRATEGIES {
            let spec = GridSpec::new(8, 9, 100.0).unwrap();
            let grid = generate(&spec, strategy, &mut StdRng::seed_from_u64(2));
            check_invariants(&grid, &spec);
            assert!(grid.iter_rows().flatten().all(|&v| v != SENTINEL));
        }
    }

    #[test]
    fn single_cell() {
        for strategy in STRATEGIES {
            let spec = GridSpec::new(1, 1, 100.0).unwrap();
            let grid = generate(&spec, strategy, &mut StdRng::seed_from_u64(3));
            assert!(grid.get(0, 0).unwrap() >= MIN_VALUE);
        }
    }

    #[test]
    fn fractional_percentages() {
        for strategy in STRATEGIES {
            for pct in [0.5, 12.5, 33.3, 66.7, 99.9] {
                let spec = GridSpec::new(17, 23, pct).unwrap();
                let grid = generate(&spec, strategy, &mut StdRng::seed_from_u64(11));
                check_invariants(&grid, &spec);
            }
        }
    }

    #[test]
    fn same_seed_same_grid() {
        for strategy in STRATEGIES {
            let spec = GridSpec::new(20, 30, 40.0).unwrap();
            let a = generate(&spec, strategy, &mut StdRng::seed_from_u64(42));
            let b = generate(&spec, strategy, &mut StdRng::seed_from_u64(42));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let spec = GridSpec::new(20, 30, 40.0).unwrap();
        let a = generate(&spec, Strategy::Rejection, &mut StdRng::seed_from_u64(1));
        let b = generate(&spec, Strategy::Rejection, &mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }

    #[test]
    fn every_cell_reachable() {
        // 1 of 4 cells, many seeds: each position should come up.
        for strategy in STRATEGIES {
            let spec = GridSpec::new(2, 2, 25.0).unwrap();
            let mut seen = [false; 4];
            for seed in 0..200 {
                let grid = generate(&spec, strategy, &mut StdRng::seed_from_u64(seed));
                let pos = grid.flag_positions();
                assert_eq!(pos.len(), 1);
                seen[pos[0].row * 2 + pos[0].col] = true;
            }
            assert!(seen.iter().all(|&s| s), "{strategy:?}: {seen:?}");
        }
    }

    #[test]
    fn values_cover_range() {
        let spec = GridSpec::new(50, 50, 100.0).unwrap();
        let grid = generate(&spec, Strategy::Sample, &mut StdRng::seed_from_u64(5));
        for value in MIN_VALUE..=MAX_VALUE {
            assert!(
                grid.iter_rows().flatten().any(|&v| v == value),
                "value {value} never drawn"
            );
        }
    }

    #[test]
    fn thread_rng_works() {
        let spec = GridSpec::new(3, 3, 50.0).unwrap();
        let grid = generate(&spec, Strategy::default(), &mut rand::thread_rng());
        check_invariants(&grid, &spec);
    }
}
