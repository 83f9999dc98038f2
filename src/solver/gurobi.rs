//! Gurobi MIP engine.
//!
//! Reports the incumbent and best bound to the [`Progress`] from the MIP
//! callback, and terminates the optimization when the progress asks for it.

use super::{ConstraintSense, MipBackend, MipOutcome, MipProblem, MipStatus, SolverConfig};
use crate::progress::Progress;
use grb::callback::{CbResult, Callback, Where};
use grb::prelude::*;

#[derive(Debug, Default, Clone, Copy)]
pub struct GurobiBackend;

struct MipProgressCallback<'a> {
    theme: String,
    progress: &'a dyn Progress,
    interrupted: bool,
}

impl Callback for MipProgressCallback<'_> {
    fn callback(&mut self, w: Where) -> CbResult {
        if let Where::MIP(ctx) = w {
            let lower_bound = ctx.obj_bnd()?;
            let upper_bound = ctx.obj_best()?;
            // No incumbent yet
            if upper_bound >= grb::INFINITY {
                return Ok(());
            }
            if !self.progress.mip_progress(&self.theme, lower_bound, upper_bound) {
                self.interrupted = true;
                ctx.terminate();
            }
        }
        Ok(())
    }
}

impl MipBackend for GurobiBackend {
    fn name(&self) -> &'static str {
        "gurobi"
    }

    fn optimize(
        &self,
        problem: &MipProblem,
        config: &SolverConfig,
        progress: &dyn Progress,
    ) -> Result<MipOutcome, String> {
        let env = Env::new("")
            .map_err(|e| format!("Failed to create Gurobi environment: {}", e))?;

        let mut model = Model::with_env(&problem.name, env)
            .map_err(|e| format!("Failed to create model: {}", e))?;

        model.set_param(param::MIPGap, config.mip_gap)
            .map_err(|e| format!("Failed to set MIP gap: {}", e))?;
        if let Some(threads) = config.threads {
            model.set_param(param::Threads, threads as i32)
                .map_err(|e| format!("Failed to set threads: {}", e))?;
        }
        if let Some(limit) = config.time_limit {
            model.set_param(param::TimeLimit, limit)
                .map_err(|e| format!("Failed to set time limit: {}", e))?;
        }
        model.set_param(param::LogToConsole, config.log_to_console as i32)
            .map_err(|e| format!("Failed to set console logging: {}", e))?;

        let mut vars: Vec<Var> = Vec::with_capacity(problem.num_vars());
        for variable in &problem.variables {
            let var = add_binvar!(model,
                name: &variable.name,
                obj: variable.objective
            ).map_err(|e| format!("Failed to add variable {}: {}", variable.name, e))?;
            vars.push(var);
        }

        model.update()
            .map_err(|e| format!("Failed to update model: {}", e))?;

        for constraint in &problem.constraints {
            let expr: Expr = constraint
                .terms
                .iter()
                .map(|&(var, coef)| coef * vars[var.0])
                .grb_sum();
            let rhs = constraint.rhs;
            let added = match constraint.sense {
                ConstraintSense::LessEqual => model.add_constr(&constraint.name, c!(expr <= rhs)),
                ConstraintSense::Equal => model.add_constr(&constraint.name, c!(expr == rhs)),
                ConstraintSense::GreaterEqual => model.add_constr(&constraint.name, c!(expr >= rhs)),
            };
            added.map_err(|e| format!("Failed to add constraint {}: {}", constraint.name, e))?;
        }

        model.update()
            .map_err(|e| format!("Failed to update model before optimization: {}", e))?;

        let mut callback = MipProgressCallback {
            theme: format!("{} Optimization", problem.name.to_uppercase()),
            progress,
            interrupted: false,
        };
        model.optimize_with_callback(&mut callback)
            .map_err(|e| format!("Optimization failed: {}", e))?;

        let status = model.status()
            .map_err(|e| format!("Failed to get status: {}", e))?;

        let status = match status {
            Status::Optimal => MipStatus::Optimal,
            Status::Infeasible => MipStatus::Infeasible,
            Status::Unbounded => MipStatus::Unbounded,
            Status::InfOrUnbd => MipStatus::InfeasibleOrUnbounded,
            Status::Interrupted => MipStatus::Interrupted,
            Status::TimeLimit => MipStatus::TimeLimit,
            other => MipStatus::Other(format!("{:?}", other)),
        };
        if callback.interrupted && status != MipStatus::Interrupted {
            log::warn!("Gurobi ignored the stop request, status {:?}", status);
        }

        let solution_count = model.get_attr(attr::SolCount).unwrap_or(0);
        if solution_count == 0 {
            return Ok(MipOutcome::without_solution(status));
        }

        let objective = model.get_attr(attr::ObjVal)
            .map_err(|e| format!("Failed to get objective: {}", e))?;
        let bound = model.get_attr(attr::ObjBound).ok();
        let values = model.get_obj_attr_batch(attr::X, vars)
            .map_err(|e| format!("Failed to get solution values: {}", e))?;

        Ok(MipOutcome {
            status,
            objective: Some(objective),
            bound,
            values: Some(values),
        })
    }
}
