//! HiGHS MIP engine.
//!
//! HiGHS exposes no progress callback through its Rust bindings, so only
//! phase progress is reported and a stop request is honored before the
//! engine starts.

use super::{ConstraintSense, MipBackend, MipOutcome, MipProblem, MipStatus, SolverConfig};
use crate::progress::Progress;
use ::highs::{Col, HighsModelStatus, RowProblem, Sense};

#[derive(Debug, Default, Clone, Copy)]
pub struct HighsBackend;

impl MipBackend for HighsBackend {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn optimize(
        &self,
        problem: &MipProblem,
        config: &SolverConfig,
        progress: &dyn Progress,
    ) -> Result<MipOutcome, String> {
        if !progress.numerical_progress("HiGHS Optimization", 0.0) {
            return Ok(MipOutcome::without_solution(MipStatus::Interrupted));
        }

        let mut pb = RowProblem::new();

        // Integrality must be set when the column is added
        let cols: Vec<Col> = problem
            .variables
            .iter()
            .map(|var| pb.add_column_with_integrality(var.objective, 0.0..=1.0, true))
            .collect();

        for constraint in &problem.constraints {
            let terms: Vec<(Col, f64)> = constraint
                .terms
                .iter()
                .map(|&(var, coef)| (cols[var.0], coef))
                .collect();
            let rhs = constraint.rhs;
            match constraint.sense {
                ConstraintSense::LessEqual => {
                    pb.add_row(..=rhs, terms);
                }
                ConstraintSense::Equal => {
                    pb.add_row(rhs..=rhs, terms);
                }
                ConstraintSense::GreaterEqual => {
                    pb.add_row(rhs.., terms);
                }
            }
        }

        let mut model = pb.optimise(Sense::Minimise);
        model.set_option("output_flag", config.log_to_console);
        model.set_option("mip_rel_gap", config.mip_gap);
        if let Some(threads) = config.threads {
            model.set_option("threads", threads as i32);
        }
        if let Some(limit) = config.time_limit {
            model.set_option("time_limit", limit);
        }

        log::debug!(
            "HiGHS solving {:?}: {} columns, {} rows",
            problem.name,
            cols.len(),
            problem.constraints.len()
        );
        let solved = model
            .try_solve()
            .map_err(|e| format!("HiGHS failed on {:?}: {:?}", problem.name, e))?;

        let status = match solved.status() {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => MipStatus::Optimal,
            HighsModelStatus::Infeasible => MipStatus::Infeasible,
            HighsModelStatus::Unbounded => MipStatus::Unbounded,
            HighsModelStatus::UnboundedOrInfeasible => MipStatus::InfeasibleOrUnbounded,
            HighsModelStatus::ReachedTimeLimit => MipStatus::TimeLimit,
            other => MipStatus::Other(format!("{:?}", other)),
        };

        progress.numerical_progress("HiGHS Optimization", 100.0);

        let found = match status {
            MipStatus::Optimal | MipStatus::TimeLimit => {
                incumbent(solved.objective_value(), solved.mip_gap())
            }
            _ => None,
        };
        let Some((objective, bound)) = found else {
            return Ok(MipOutcome::without_solution(status));
        };
        let values = solved.get_solution().columns().to_vec();

        Ok(MipOutcome { status, objective: Some(objective), bound, values: Some(values) })
    }
}

/// Objective and dual bound of a minimization, or `None` when HiGHS holds no
/// primal solution (its objective stays infinite).
///
/// HiGHS reports the gap relative to the primal bound: `|primal - dual| / |primal|`.
fn incumbent(objective: f64, mip_gap: f64) -> Option<(f64, Option<f64>)> {
    if !objective.is_finite() {
        return None;
    }
    let bound = (mip_gap.is_finite() && mip_gap >= 0.0).then(|| objective - mip_gap * objective.abs());
    Some((objective, bound))
}
