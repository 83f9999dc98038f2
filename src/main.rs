//! Center of Gravity Solver - Command Line Interface
//!
//! Solves the p-median facility location model over tabular input.

use clap::{Parser, Subcommand, ValueEnum};
use cog_solver::batch::solve_batch;
use cog_solver::cog::{solve, SolveLogs};
use cog_solver::data::CogData;
use cog_solver::feasibility::diagnose;
use cog_solver::generate::GeneratorConfig;
use cog_solver::input::{CenterStatus, InputTables};
use cog_solver::logfile::LogFile;
use cog_solver::progress::{percent_error, StopFileProgress};
use cog_solver::solution::SolutionTables;
use cog_solver::solver::Engine;
use cog_solver::validate::find_failures;
use cog_solver::variants::solve_variants;

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cog-solver")]
#[command(version = "1.0")]
#[command(about = "Center of gravity (p-median) facility location with a MIP engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the `Number of Centroids` parameter
    Solve {
        /// Input JSON file or CSV directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file or CSV directory
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "highs")]
        engine: EngineArg,

        /// Creating this file during a solve stops it early
        #[arg(long, default_value = "cog.stop")]
        stop_file: PathBuf,

        #[arg(long, default_value = "output.txt")]
        diagnostic_log: PathBuf,

        #[arg(long, default_value = "error.txt")]
        error_log: PathBuf,
    },

    /// Solve every row of the `solutions` table in one run
    Batch {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "highs")]
        engine: EngineArg,

        #[arg(long, default_value = "cog.stop")]
        stop_file: PathBuf,

        #[arg(long, default_value = "output.txt")]
        diagnostic_log: PathBuf,
    },

    /// Solve copies of the input for several numbers of centroids
    Variants {
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving one JSON solution per number of centers
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_delimiter = ',', default_value = "3,4,5")]
        centroids: Vec<usize>,

        #[arg(long, value_enum, default_value = "highs")]
        engine: EngineArg,
    },

    /// Validate the input and diagnose its feasibility
    Check {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write a random sample data set
    Generate {
        /// Output JSON file or CSV directory
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "30")]
        sites: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Pairs farther apart than this get no distance row
        #[arg(long)]
        cutoff: Option<f64>,

        /// Centroid counts for the solutions table
        #[arg(long, value_delimiter = ',', default_value = "3,4,5")]
        solutions: Vec<usize>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum EngineArg {
    /// HiGHS (bundled)
    Highs,
    /// Gurobi (needs the `gurobi` feature and a license)
    Gurobi,
}

impl From<EngineArg> for Engine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Highs => Engine::Highs,
            EngineArg::Gurobi => Engine::Gurobi,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { input, output, engine, stop_file, diagnostic_log, error_log } => {
            run_solve(&input, &output, engine.into(), &stop_file, &diagnostic_log, &error_log);
        }

        Commands::Batch { input, output, engine, stop_file, diagnostic_log } => {
            run_batch(&input, &output, engine.into(), &stop_file, &diagnostic_log);
        }

        Commands::Variants { input, output, centroids, engine } => {
            run_variants(&input, &output, &centroids, engine.into());
        }

        Commands::Check { input } => {
            check_input(&input);
        }

        Commands::Generate { output, sites, seed, cutoff, solutions } => {
            let config = GeneratorConfig {
                num_sites: sites,
                seed,
                cutoff,
                solutions,
                ..Default::default()
            };
            let tables = config.generate();
            if let Err(e) = tables.to_path(&output) {
                fail(&e);
            }
            println!(
                "Wrote {} sites and {} distance rows to {:?}",
                tables.sites.len(),
                tables.distance.len(),
                output
            );
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn load(path: &Path) -> InputTables {
    println!("Loading data from {:?}...", path);
    match InputTables::from_path(path) {
        Ok(tables) => tables,
        Err(e) => fail(&format!("loading input: {}", e)),
    }
}

fn stop_file_progress(stop_file: &Path) -> StopFileProgress {
    let progress = StopFileProgress::new(stop_file);
    match progress.clear_stale() {
        Ok(true) => println!("Removed stale stop file {:?}", stop_file),
        Ok(false) => {}
        Err(e) => fail(&e),
    }
    println!("Create {:?} to stop the solve early", stop_file);
    progress
}

fn run_solve(
    input: &Path,
    output: &Path,
    engine: Engine,
    stop_file: &Path,
    diagnostic_log: &Path,
    error_log: &Path,
) {
    let tables = load(input);
    let backend = engine.backend();
    let mut logs = match (LogFile::create(diagnostic_log), LogFile::create(error_log)) {
        (Ok(diagnostic), Ok(errors)) => SolveLogs { diagnostic, errors },
        (Err(e), _) | (_, Err(e)) => fail(&e),
    };
    let progress = stop_file_progress(stop_file);

    println!("Solving with {}...", backend.name());
    let start = Instant::now();
    let result = solve(&tables, backend.as_ref(), &mut logs, &progress);
    progress.finish();

    let solution = match result {
        Ok(Some(solution)) => solution,
        Ok(None) => {
            println!("No solution. See {:?} for details.", error_log);
            return;
        }
        Err(e) => fail(&e),
    };

    println!("\n=== Solution ===");
    println!("Upper Bound: {:.2}", solution.upper_bound);
    println!("Lower Bound: {:.2}", solution.lower_bound);
    println!("Percent Error: {}", percent_error(solution.lower_bound, solution.upper_bound));
    println!("Centers: {}", solution.openings.iter().cloned().collect::<Vec<_>>().join(", "));
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());

    if let Err(e) = SolutionTables::from(&solution).to_path(output) {
        fail(&e);
    }
    println!("Solution saved to {:?}", output);
}

fn run_batch(input: &Path, output: &Path, engine: Engine, stop_file: &Path, diagnostic_log: &Path) {
    let tables = load(input);
    let backend = engine.backend();
    let mut log = LogFile::create(diagnostic_log).unwrap_or_else(|e| fail(&e));
    let progress = stop_file_progress(stop_file);

    println!("Solving {} models with {}...", tables.solutions.len(), backend.name());
    let result = solve_batch(&tables, backend.as_ref(), &mut log, &progress);
    progress.finish();

    let batch = match result {
        Ok(Some(batch)) => batch,
        Ok(None) => {
            println!("No solution");
            return;
        }
        Err(e) => fail(&e),
    };

    println!("\n{:<20} {:>14} {:>14} {:>10}", "Solution", "Upper Bound", "Lower Bound", "Error");
    println!("{}", "-".repeat(61));
    for (name, solution) in &batch.solutions {
        println!(
            "{:<20} {:>14.2} {:>14.2} {:>10}",
            name,
            solution.upper_bound,
            solution.lower_bound,
            percent_error(solution.lower_bound, solution.upper_bound)
        );
    }
    println!("Run Time: {:.2}s", batch.run_time);

    if let Err(e) = batch.tables().to_path(output) {
        fail(&e);
    }
    println!("Solutions saved to {:?}", output);
}

fn run_variants(input: &Path, output: &Path, centroids: &[usize], engine: Engine) {
    let tables = load(input);
    let backend = engine.backend();

    println!("Solving {} variants with {}...", centroids.len(), backend.name());
    let solutions = solve_variants(&tables, centroids, backend.as_ref()).unwrap_or_else(|e| fail(&e));
    if solutions.is_empty() {
        println!("No solution");
        return;
    }

    if let Err(e) = std::fs::create_dir_all(output) {
        fail(&format!("Cannot create {:?}: {}", output, e));
    }
    for (centers, solution) in &solutions {
        println!(
            "{} centers: Upper Bound {:.2}, Percent Error {}",
            centers,
            solution.upper_bound,
            percent_error(solution.lower_bound, solution.upper_bound)
        );
        let path = output.join(format!("solution_{}.json", centers));
        if let Err(e) = SolutionTables::from(solution).to_path(&path) {
            fail(&e);
        }
    }
    println!("Solutions saved to {:?}", output);
}

fn check_input(input: &Path) {
    let tables = load(input);

    println!("\n=== Data Summary ===");
    println!("Sites: {}", tables.sites.len());
    let candidates = tables
        .sites
        .iter()
        .filter(|s| s.center_status == CenterStatus::CanBeCenter)
        .count();
    println!("Candidate centers: {}", candidates);
    println!("Distance rows: {}", tables.distance.len());
    println!("Solutions rows: {}", tables.solutions.len());

    let failures = find_failures(&tables);
    if !failures.is_empty() {
        println!("\n{} data failures:", failures.len());
        for failure in &failures {
            println!("  {}", failure);
        }
        std::process::exit(1);
    }
    println!("\nNo data failures");

    let diagnosis = diagnose(&CogData::new(&tables));
    if !diagnosis.unassignable.is_empty() {
        println!("Un-assignable demand points: {}", diagnosis.unassignable.join(", "));
    }
    if !diagnosis.useless.is_empty() {
        println!("Useless sites: {}", diagnosis.useless.join(", "));
    }
    if !diagnosis.has_candidate_center {
        println!("Nothing can be a center!");
    }
    println!("Feasible: {}", diagnosis.is_feasible());
}
