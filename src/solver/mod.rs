//! MIP engines.
//!
//! Models are described once as a [`MipProblem`] and handed to a
//! [`MipBackend`]. HiGHS is always available; Gurobi needs the `gurobi`
//! feature.

mod highs;
pub use self::highs::HighsBackend;

// When built with the `gurobi` feature, expose the real implementation
#[cfg(feature = "gurobi")]
mod gurobi;
#[cfg(feature = "gurobi")]
pub use gurobi::GurobiBackend;

// Otherwise provide a lightweight stub so the rest of the codebase can compile
#[cfg(not(feature = "gurobi"))]
mod gurobi_stub {
	use super::{MipBackend, MipOutcome, MipProblem, SolverConfig};
	use crate::progress::Progress;

	#[derive(Debug, Default, Clone, Copy)]
	pub struct GurobiBackend;

	impl MipBackend for GurobiBackend {
		fn name(&self) -> &'static str { "gurobi" }
		fn optimize(&self, _problem: &MipProblem, _config: &SolverConfig, _progress: &dyn Progress) -> Result<MipOutcome, String> {
			Err("Gurobi feature not enabled in this build".to_string())
		}
	}
}

#[cfg(not(feature = "gurobi"))]
pub use gurobi_stub::GurobiBackend;

use crate::progress::Progress;

/// Index of a variable in a [`MipProblem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    LessEqual,
    Equal,
    GreaterEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub objective: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

/// A minimization problem over binary variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MipProblem {
    pub name: String,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

impl MipProblem {
    pub fn new(name: &str) -> Self {
        MipProblem { name: name.to_string(), ..Default::default() }
    }

    pub fn add_binary(&mut self, name: String, objective: f64) -> VarId {
        self.variables.push(Variable { name, objective });
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(&mut self, name: String, terms: Vec<(VarId, f64)>, sense: ConstraintSense, rhs: f64) {
        self.constraints.push(Constraint { name, terms, sense, rhs });
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Relative MIP gap tolerance
    pub mip_gap: f64,
    /// Number of engine threads (`None` = engine default)
    pub threads: Option<u32>,
    /// Time limit in seconds
    pub time_limit: Option<f64>,
    /// Let the engine print its own log
    pub log_to_console: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig { mip_gap: 0.001, threads: None, time_limit: None, log_to_console: false }
    }
}

/// Termination status reported by an engine
#[derive(Debug, Clone, PartialEq)]
pub enum MipStatus {
    Optimal,
    Infeasible,
    Unbounded,
    InfeasibleOrUnbounded,
    /// Stopped on request (progress returned `false`)
    Interrupted,
    TimeLimit,
    Other(String),
}

/// What an engine returns after optimizing
#[derive(Debug, Clone, PartialEq)]
pub struct MipOutcome {
    pub status: MipStatus,
    /// Objective of the incumbent, if any
    pub objective: Option<f64>,
    /// Best proven bound, when the engine reports one
    pub bound: Option<f64>,
    /// Value of every variable of the incumbent, in [`VarId`] order
    pub values: Option<Vec<f64>>,
}

impl MipOutcome {
    pub fn without_solution(status: MipStatus) -> Self {
        MipOutcome { status, objective: None, bound: None, values: None }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.as_ref().and_then(|v| v.get(var.0).copied())
    }
}

/// A MIP engine able to minimize a [`MipProblem`]
pub trait MipBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn optimize(
        &self,
        problem: &MipProblem,
        config: &SolverConfig,
        progress: &dyn Progress,
    ) -> Result<MipOutcome, String>;
}

/// Engines selectable at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Highs,
    Gurobi,
}

impl Engine {
    pub fn backend(self) -> Box<dyn MipBackend> {
        match self {
            Engine::Highs => Box::new(HighsBackend),
            Engine::Gurobi => Box::new(GurobiBackend::default()),
        }
    }
}
