//! Batch solve: one model per `solutions` row, optimized concurrently.
//!
//! The models share nothing, so the engines run side by side on a rayon pool
//! with one thread per model and a single engine thread each. The results
//! are joined into one multi-indexed solution.

use crate::data::CogData;
use crate::input::InputTables;
use crate::logfile::LogFile;
use crate::model::CogModel;
use crate::parameters::Parameters;
use crate::progress::Progress;
use crate::solution::{CogSolution, MultiSolutionTables};
use crate::solver::{MipBackend, MipOutcome, SolverConfig};
use crate::validate::{ensure_valid, SolveKind};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

/// Result of a batch solve
#[derive(Debug, Clone)]
pub struct BatchSolution {
    pub solutions: BTreeMap<String, CogSolution>,
    /// Wall clock seconds spent building and solving
    pub run_time: f64,
}

impl BatchSolution {
    pub fn tables(&self) -> MultiSolutionTables {
        MultiSolutionTables::from(&self.solutions)
    }
}

/// A dedicated pool with one thread per model.
///
/// HiGHS keeps a task scheduler per OS thread, sized by the first solve on
/// that thread, and rejects a later solve asking for another thread count.
/// Fresh threads start without one, and every model gets its own thread.
pub(crate) fn solve_pool(models: usize) -> Result<rayon::ThreadPool, String> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(models.max(1))
        .thread_name(|i| format!("cog-solve-{}", i))
        .build()
        .map_err(|e| format!("Failed to start {} solver threads: {}", models, e))
}

/// Solve every row of the `solutions` table.
///
/// Returns `Ok(None)` when there is nothing to solve, when any model can't be
/// built, or when no model produced a solution.
pub fn solve_batch(
    tables: &InputTables,
    backend: &dyn MipBackend,
    diagnostic_log: &mut LogFile,
    progress: &dyn Progress,
) -> Result<Option<BatchSolution>, String> {
    ensure_valid(tables, SolveKind::Batch)?;
    let start = Instant::now();
    let params = Parameters::from_rows(&tables.parameters).map_err(|e| e.join("; "))?;
    let data = CogData::new(tables);

    if tables.solutions.is_empty() {
        log::warn!("The solutions table is empty, nothing to solve");
        return Ok(None);
    }

    let mut models = Vec::with_capacity(tables.solutions.len());
    for row in &tables.solutions {
        let (diagnosis, model) =
            CogModel::build(&data, row.number_of_centroids as usize, params.formulation);
        match model {
            Ok(model) => models.push((row.name.clone(), model)),
            Err(e) => {
                if !diagnosis.unassignable.is_empty() {
                    log::warn!("unassignables {:?}", diagnosis.unassignable);
                }
                log::error!("Model {:?} can't be built: {}", row.name, e);
                return Ok(None);
            }
        }
    }

    let config = SolverConfig {
        mip_gap: params.mip_gap,
        threads: params.threading.then_some(1),
        time_limit: params.time_limit,
        log_to_console: params.log_to_console,
    };

    let optimize = |(name, model): &(String, CogModel)| -> Result<MipOutcome, String> {
        log::info!("Optimizing {:?} with {} centroids", name, model.number_of_centroids);
        backend
            .optimize(&model.problem, &config, progress)
            .map_err(|e| format!("Solution {:?}: {}", name, e))
    };
    let outcomes: Vec<MipOutcome> = if params.threading {
        let pool = solve_pool(models.len())?;
        pool.install(|| models.par_iter().map(optimize).collect::<Result<_, _>>())?
    } else {
        models.iter().map(optimize).collect::<Result<_, _>>()?
    };

    let mut solutions = BTreeMap::new();
    for ((name, model), outcome) in models.iter().zip(&outcomes) {
        match CogSolution::from_outcome(model, outcome) {
            Ok(solution) => {
                solutions.insert(name.clone(), solution);
            }
            Err(reason) => log::warn!("{}: {}", name, reason),
        }
    }

    let run_time = start.elapsed().as_secs_f64();
    let line = format!("Run Time : {}", run_time);
    log::info!("{}", line);
    diagnostic_log.write(&format!("{}\n", line));

    if solutions.is_empty() {
        return Ok(None);
    }
    Ok(Some(BatchSolution { solutions, run_time }))
}
