//! Single center of gravity solve with diagnostic and error logs.

use crate::data::CogData;
use crate::feasibility::diagnose;
use crate::input::InputTables;
use crate::logfile::{time_stamp, LogFile};
use crate::model::CogModel;
use crate::parameters::Parameters;
use crate::progress::Progress;
use crate::solution::CogSolution;
use crate::solver::{MipBackend, SolverConfig};
use crate::validate::{ensure_valid, SolveKind};

/// Logs written during a single solve
pub struct SolveLogs {
    pub diagnostic: LogFile,
    pub errors: LogFile,
}

impl SolveLogs {
    pub fn sink() -> Self {
        SolveLogs { diagnostic: LogFile::sink(), errors: LogFile::sink() }
    }
}

/// Solve the data set for its `Number of Centroids` parameter.
///
/// `Err` means the data set is invalid or the engine failed. `Ok(None)` means
/// the data is infeasible or the engine found no solution; the reason is in
/// the error log.
pub fn solve(
    tables: &InputTables,
    backend: &dyn MipBackend,
    logs: &mut SolveLogs,
    progress: &dyn Progress,
) -> Result<Option<CogSolution>, String> {
    ensure_valid(tables, SolveKind::Single)?;
    logs.diagnostic.write(&format!("COG output log\n{}\n\n", time_stamp()));
    logs.errors.write(&format!("COG error log\n{}\n\n", time_stamp()));

    let params = Parameters::from_rows(&tables.parameters).map_err(|e| e.join("; "))?;
    let data = CogData::new(tables);

    let diagnosis = diagnose(&data);
    diagnosis.log_to(&mut logs.errors);
    if !diagnosis.is_feasible() {
        log::warn!("Infeasibility detected, see the error log");
        return Ok(None);
    }
    if !diagnosis.useless.is_empty() {
        log::warn!("Useless sites: {:?}", diagnosis.useless);
    }
    progress.numerical_progress("Feasibility Analysis", 100.0);

    let model = CogModel::from_diagnosis(
        &data,
        &diagnosis,
        params.number_of_centroids,
        params.formulation,
        progress,
    )
    .map_err(|e| e.to_string())?;

    let config = SolverConfig {
        mip_gap: params.mip_gap,
        threads: None,
        time_limit: params.time_limit,
        log_to_console: params.log_to_console,
    };
    let outcome = backend.optimize(&model.problem, &config, progress)?;
    progress.numerical_progress("Core Optimization", 100.0);

    if outcome.status == crate::solver::MipStatus::Interrupted {
        logs.errors.write("Solve process interrupted by user feedback\n");
    }
    let solution = match CogSolution::from_outcome(&model, &outcome) {
        Ok(solution) => solution,
        Err(reason) => {
            log::warn!("{}", reason);
            logs.errors.write(&format!("{}\n", reason));
            return Ok(None);
        }
    };

    logs.diagnostic.write(&format!("Upper Bound: {}\n", solution.upper_bound));
    logs.diagnostic.write(&format!("Lower Bound: {}\n", solution.lower_bound));
    logs.diagnostic.write(&format!("Number Centroids: {}\n", solution.openings.len()));
    progress.numerical_progress("Full Cog Solve", 100.0);
    log::info!(
        "Solved with {}: {} centers, objective {}",
        backend.name(),
        solution.openings.len(),
        solution.upper_bound
    );
    Ok(Some(solution))
}
