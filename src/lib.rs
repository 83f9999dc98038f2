//! Center of Gravity Solver Library
//!
//! Builds the p-median ("center of gravity") model from tabular input and
//! hands it to an external MIP engine.
//!
//! # Features
//!
//! - JSON and CSV directory input and output
//! - Data validation and feasibility diagnosis with error logs
//! - Weak and strong linking formulations
//! - Batch solves of several centroid counts in parallel (rayon)
//! - HiGHS backend, Gurobi behind the `gurobi` feature
//! - Seeded sample data generation
//!
//! # Example
//!
//! ```no_run
//! use cog_solver::cog::{solve, SolveLogs};
//! use cog_solver::input::InputTables;
//! use cog_solver::progress::LogProgress;
//! use cog_solver::solver::HighsBackend;
//!
//! let tables = InputTables::from_path("cog.json").unwrap();
//! let mut logs = SolveLogs::sink();
//! if let Some(solution) = solve(&tables, &HighsBackend, &mut logs, &LogProgress).unwrap() {
//!     println!("Objective: {:.2}", solution.upper_bound);
//! }
//! ```

pub mod input;
pub mod parameters;
pub mod validate;
pub mod data;
pub mod logfile;
pub mod progress;
pub mod solver;
pub mod feasibility;
pub mod model;
pub mod solution;
pub mod cog;
pub mod batch;
pub mod variants;
pub mod generate;

pub use input::InputTables;
pub use solution::CogSolution;
