use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use gridgen::compress::GridFile;
use gridgen::neighbors::{self, CountOptions, Density, FlagGrid};
use gridgen::output::{self, OutputMode};
use gridgen::{Grid, GridError, GridSpec, Strategy};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "gridgen",
    about = "Generate a random grid of integers and save it as JSON",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Count cells within a Manhattan distance of any positive cell
    Count(CountArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// The number of rows in the grid
    #[arg(required = true, allow_negative_numbers = true)]
    rows: Option<i64>,

    /// The number of columns in the grid
    #[arg(required = true, allow_negative_numbers = true)]
    cols: Option<i64>,

    /// The percentage of positive numbers (0-100)
    #[arg(required = true, allow_negative_numbers = true)]
    percentage: Option<f64>,

    /// Output file; .gz/.zst extensions are compressed
    #[arg(short = 'o', long, default_value = gridgen::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Seed the generator for reproducible grids
    #[arg(long)]
    seed: Option<u64>,

    /// How positive cells are chosen
    #[arg(long, value_enum, default_value_t = Strategy::Rejection)]
    strategy: Strategy,

    /// Write the whole document on one line
    #[arg(short = 'c', long)]
    compact: bool,

    /// Read the file back after writing and check it matches
    #[arg(long)]
    verify: bool,

    /// Also report how many cells lie within this distance of a positive cell
    #[arg(long, value_name = "DISTANCE")]
    count_within: Option<u32>,

    /// Print timing breakdown to stderr (for profiling)
    #[arg(long = "debug-timing", hide = true)]
    debug_timing: bool,
}

#[derive(Args)]
struct CountArgs {
    /// Grid file with a "data" array; .gz/.zst are decompressed
    file: PathBuf,

    /// Distance threshold; overrides "distanceThreshold" in the file
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Force the sparse (fill) or dense (scan) algorithm
    #[arg(long, value_enum, default_value_t = Density::Auto)]
    density: Density,

    /// Run both algorithms and fail if they disagree
    #[arg(long)]
    cross_check: bool,

    /// Scan at most this many rows at a time
    #[arg(long, value_name = "ROWS", conflicts_with = "mem_saver")]
    window_rows: Option<usize>,

    /// Scan in windows of 500 rows to bound memory
    #[arg(long)]
    mem_saver: bool,

    /// Print the flag map and the coverage map
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Count(args)) => run_count(args),
        None => run_generate(cli.generate),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let (Some(rows), Some(cols), Some(percentage)) = (args.rows, args.cols, args.percentage)
    else {
        bail!("rows, cols and percentage are required");
    };

    // Validate before touching the output file.
    let spec = GridSpec::new(rows, cols, percentage)?;
    info!(
        "generating {}x{} grid, {}% positive",
        spec.rows(),
        spec.cols(),
        spec.percentage()
    );

    println!(
        "Placing {} positive numbers in a {} cell grid...",
        spec.target(),
        spec.total()
    );

    let t0 = Instant::now();
    let grid = match args.seed {
        Some(seed) => {
            info!("using seed {seed}");
            gridgen::generate(&spec, args.strategy, &mut StdRng::seed_from_u64(seed))
        }
        None => gridgen::generate(&spec, args.strategy, &mut rand::thread_rng()),
    };
    let t_generate = t0.elapsed();

    let mode = if args.compact {
        OutputMode::Compact
    } else {
        OutputMode::Rows
    };

    let t1 = Instant::now();
    write_grid_file(&args.output, &grid, mode)?;
    let t_write = t1.elapsed();
    info!(
        "wrote {}x{} grid to {}",
        grid.rows(),
        grid.cols(),
        args.output.display()
    );

    let t_verify = if args.verify {
        let t2 = Instant::now();
        let written = gridgen::reader::read_grid(&args.output)?;
        if written != grid {
            bail!(
                "verification failed: {} does not match the generated grid",
                args.output.display()
            );
        }
        info!("verified {}", args.output.display());
        Some(t2.elapsed())
    } else {
        None
    };

    if args.debug_timing {
        print_timing(&spec, t_generate, t_write, t_verify);
    }

    println!(
        "Successfully generated grid and saved to {}",
        args.output.display()
    );

    if let Some(threshold) = args.count_within {
        let flags = FlagGrid::from(&grid);
        let result = neighbors::count_within(&flags, threshold, &CountOptions::default())?;
        println!(
            "Cells within distance {threshold} of a positive number: {}",
            result.count
        );
    }
    Ok(())
}

fn run_count(args: CountArgs) -> Result<()> {
    let start = Instant::now();
    let doc = gridgen::reader::read_flag_document(&args.file)?;
    let threshold = match args.threshold {
        Some(d) => gridgen::reader::to_threshold(d)?,
        None => doc.threshold.ok_or(GridError::MissingThreshold)?,
    };
    let window_rows = if args.mem_saver {
        Some(neighbors::MEM_SAVER_ROWS)
    } else {
        args.window_rows
    };
    let options = CountOptions {
        density: args.density,
        window_rows,
        cross_check: args.cross_check,
    };

    let result = neighbors::count_within(&doc.flags, threshold, &options)
        .with_context(|| format!("counting neighbors in: {}", args.file.display()))?;

    if args.print {
        println!("input flags:\n{}", doc.flags.render());
        println!(
            "within distance {threshold}:\n{}",
            neighbors::render_coverage(&doc.flags, threshold)
        );
    }
    println!("found neighbor count {}", result.count);
    info!(
        "counted with {:?} in {:.2}ms",
        result.algorithm,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

fn write_grid_file(path: &Path, grid: &Grid, mode: OutputMode) -> Result<()> {
    let mut out = GridFile::create(path)?;
    output::write_grid(&mut out, grid, mode)
        .with_context(|| format!("failed to write grid to: {}", path.display()))?;
    out.finish()
}

fn print_timing(spec: &GridSpec, generate: Duration, write: Duration, verify: Option<Duration>) {
    let total = generate + write + verify.unwrap_or_default();
    let pct = |d: Duration| d.as_secs_f64() / total.as_secs_f64().max(f64::EPSILON) * 100.0;
    eprintln!(
        "--- debug-timing: {}x{} ({} cells, {} positive) ---",
        spec.rows(),
        spec.cols(),
        spec.total(),
        spec.target()
    );
    eprintln!(
        "  generate: {:>8.2}ms  ({:.0}%)",
        generate.as_secs_f64() * 1000.0,
        pct(generate)
    );
    eprintln!(
        "  write:    {:>8.2}ms  ({:.0}%)",
        write.as_secs_f64() * 1000.0,
        pct(write)
    );
    if let Some(verify) = verify {
        eprintln!(
            "  verify:   {:>8.2}ms  ({:.0}%)",
            verify.as_secs_f64() * 1000.0,
            pct(verify)
        );
    }
    eprintln!("  total:    {:>8.2}ms", total.as_secs_f64() * 1000.0);
}
