//! Solutions of the center of gravity model and their output tables.
//!
//! A single solve writes `openings`, `assignments` and `parameters`; a batch
//! solve writes the same tables with a leading `Solution` column.

use crate::input::{is_json_path, write_csv_table, write_json};
use crate::model::CogModel;
use crate::solver::{MipOutcome, MipStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub const LOWER_BOUND: &str = "Lower Bound";
pub const UPPER_BOUND: &str = "Upper Bound";

/// Solution values below this distance from 1 count as selected
const ONE_TOLERANCE: f64 = 1e-4;

#[inline]
fn almost_one(x: f64) -> bool {
    (x - 1.0).abs() < ONE_TOLERANCE
}

/// Opened centers and assignments of one solved model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CogSolution {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub openings: BTreeSet<String>,
    /// `(site, assigned to)`
    pub assignments: BTreeSet<(String, String)>,
}

impl CogSolution {
    /// Read a solution out of an engine outcome.
    ///
    /// Returns the reason as `Err` when the outcome carries no usable
    /// solution.
    pub fn from_outcome(model: &CogModel, outcome: &MipOutcome) -> Result<CogSolution, String> {
        match &outcome.status {
            MipStatus::InfeasibleOrUnbounded => {
                return Err("Optimization failed due to model status of inf_or_unbd".to_string())
            }
            MipStatus::Infeasible => {
                return Err("Optimization failed due to model status of infeasible".to_string())
            }
            MipStatus::Unbounded => {
                return Err("Optimization failed due to model status of unbounded".to_string())
            }
            MipStatus::Interrupted | MipStatus::TimeLimit => {
                let complete = model
                    .open_vars
                    .iter()
                    .all(|(_, var)| outcome.value(*var).is_some());
                if !complete || outcome.objective.is_none() {
                    return Err("No solution was found".to_string());
                }
            }
            MipStatus::Optimal => {}
            MipStatus::Other(status) => return Err(format!("unexpected status {}", status)),
        }

        let upper_bound = outcome
            .objective
            .ok_or_else(|| "No solution was found".to_string())?;
        let lower_bound = outcome.bound.unwrap_or(upper_bound);

        let selected = |var| outcome.value(var).map(almost_one).unwrap_or(false);
        let openings = model
            .open_vars
            .iter()
            .filter(|(_, var)| selected(*var))
            .map(|(site, _)| site.clone())
            .collect();
        let assignments = model
            .assign_vars
            .iter()
            .filter(|(_, var)| selected(*var))
            .map(|(pair, _)| pair.clone())
            .collect();

        Ok(CogSolution { lower_bound, upper_bound, openings, assignments })
    }

    /// The center a site is assigned to
    pub fn assigned_to(&self, site: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(n, _)| n == site)
            .map(|(_, a)| a.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningRow {
    #[serde(rename = "Site")]
    pub site: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Assigned To")]
    pub assigned_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultParameterRow {
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Output tables of a single solve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionTables {
    pub openings: Vec<OpeningRow>,
    pub assignments: Vec<AssignmentRow>,
    pub parameters: Vec<ResultParameterRow>,
}

impl From<&CogSolution> for SolutionTables {
    fn from(solution: &CogSolution) -> Self {
        SolutionTables {
            openings: solution
                .openings
                .iter()
                .map(|site| OpeningRow { site: site.clone() })
                .collect(),
            assignments: solution
                .assignments
                .iter()
                .map(|(site, to)| AssignmentRow { site: site.clone(), assigned_to: to.clone() })
                .collect(),
            parameters: vec![
                ResultParameterRow { parameter: LOWER_BOUND.to_string(), value: solution.lower_bound },
                ResultParameterRow { parameter: UPPER_BOUND.to_string(), value: solution.upper_bound },
            ],
        }
    }
}

impl SolutionTables {
    /// Write as a JSON file (`.json`) or a directory of CSV files
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        if is_json_path(path) {
            return write_json(path, self);
        }
        create_dir(path)?;
        write_csv_table(path, "openings", &self.openings)?;
        write_csv_table(path, "assignments", &self.assignments)?;
        write_csv_table(path, "parameters", &self.parameters)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedOpeningRow {
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "Site")]
    pub site: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedAssignmentRow {
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "Assigned To")]
    pub assigned_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedParameterRow {
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Output tables of a batch solve, every row keyed by its solution name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSolutionTables {
    pub openings: Vec<KeyedOpeningRow>,
    pub assignments: Vec<KeyedAssignmentRow>,
    pub parameters: Vec<KeyedParameterRow>,
}

impl MultiSolutionTables {
    pub fn insert(&mut self, key: &str, solution: &CogSolution) {
        let single = SolutionTables::from(solution);
        self.openings.extend(single.openings.into_iter().map(|row| KeyedOpeningRow {
            solution: key.to_string(),
            site: row.site,
        }));
        self.assignments.extend(single.assignments.into_iter().map(|row| KeyedAssignmentRow {
            solution: key.to_string(),
            site: row.site,
            assigned_to: row.assigned_to,
        }));
        self.parameters.extend(single.parameters.into_iter().map(|row| KeyedParameterRow {
            solution: key.to_string(),
            parameter: row.parameter,
            value: row.value,
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter value of one solution
    pub fn parameter(&self, key: &str, parameter: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|row| row.solution == key && row.parameter == parameter)
            .map(|row| row.value)
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        if is_json_path(path) {
            return write_json(path, self);
        }
        create_dir(path)?;
        write_csv_table(path, "openings", &self.openings)?;
        write_csv_table(path, "assignments", &self.assignments)?;
        write_csv_table(path, "parameters", &self.parameters)
    }
}

impl<'a> FromIterator<(&'a String, &'a CogSolution)> for MultiSolutionTables {
    fn from_iter<I: IntoIterator<Item = (&'a String, &'a CogSolution)>>(iter: I) -> Self {
        let mut tables = MultiSolutionTables::default();
        for (key, solution) in iter {
            tables.insert(key, solution);
        }
        tables
    }
}

impl From<&BTreeMap<String, CogSolution>> for MultiSolutionTables {
    fn from(solutions: &BTreeMap<String, CogSolution>) -> Self {
        solutions.iter().collect()
    }
}

fn create_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path).map_err(|e| format!("Failed to create directory {:?}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::MipProblem;

    /// Sites A and B, both candidates; A serves both
    fn two_site_model() -> CogModel {
        let mut problem = MipProblem::new("cog");
        let x_aa = problem.add_binary("A_A".to_string(), 0.0);
        let x_ba = problem.add_binary("B_A".to_string(), 5.0);
        let x_bb = problem.add_binary("B_B".to_string(), 0.0);
        let y_a = problem.add_binary("open_A".to_string(), 0.0);
        let y_b = problem.add_binary("open_B".to_string(), 0.0);
        CogModel {
            problem,
            assign_vars: vec![
                (("A".to_string(), "A".to_string()), x_aa),
                (("B".to_string(), "A".to_string()), x_ba),
                (("B".to_string(), "B".to_string()), x_bb),
            ],
            open_vars: vec![("A".to_string(), y_a), ("B".to_string(), y_b)],
            number_of_centroids: 1,
        }
    }

    fn outcome(status: MipStatus, values: Option<Vec<f64>>) -> MipOutcome {
        MipOutcome { status, objective: values.as_ref().map(|_| 5.0), bound: None, values }
    }

    #[test]
    fn test_optimal_outcome_maps_to_rows() {
        let model = two_site_model();
        let out = outcome(MipStatus::Optimal, Some(vec![1.0, 0.99999, 0.00001, 1.0, 0.0]));
        let solution = CogSolution::from_outcome(&model, &out).unwrap();

        assert_eq!(solution.openings, BTreeSet::from(["A".to_string()]));
        assert_eq!(solution.assigned_to("B"), Some("A"));
        assert_eq!(solution.assignments.len(), 2);
        // No engine bound: the objective stands in
        assert_eq!(solution.lower_bound, 5.0);
        assert_eq!(solution.upper_bound, 5.0);
    }

    #[test]
    fn test_engine_bound_used_as_lower_bound() {
        let model = two_site_model();
        let mut out = outcome(MipStatus::Optimal, Some(vec![1.0, 1.0, 0.0, 1.0, 0.0]));
        out.bound = Some(4.5);
        let solution = CogSolution::from_outcome(&model, &out).unwrap();
        assert_eq!(solution.lower_bound, 4.5);
    }

    #[test]
    fn test_failed_statuses() {
        let model = two_site_model();
        let cases = [
            (MipStatus::Infeasible, "infeasible"),
            (MipStatus::Unbounded, "unbounded"),
            (MipStatus::InfeasibleOrUnbounded, "inf_or_unbd"),
            (MipStatus::Other("NodeLimit".to_string()), "unexpected status NodeLimit"),
        ];
        for (status, message) in cases {
            let err = CogSolution::from_outcome(&model, &outcome(status, None)).unwrap_err();
            assert!(err.contains(message), "{}", err);
        }
    }

    #[test]
    fn test_interrupted_keeps_incumbent() {
        let model = two_site_model();
        let none = outcome(MipStatus::Interrupted, None);
        assert_eq!(CogSolution::from_outcome(&model, &none).unwrap_err(), "No solution was found");

        let some = outcome(MipStatus::TimeLimit, Some(vec![1.0, 1.0, 0.0, 1.0, 0.0]));
        let solution = CogSolution::from_outcome(&model, &some).unwrap();
        assert_eq!(solution.openings.len(), 1);
    }

    #[test]
    fn test_multi_tables_are_keyed() {
        let model = two_site_model();
        let out = outcome(MipStatus::Optimal, Some(vec![1.0, 1.0, 0.0, 1.0, 0.0]));
        let solution = CogSolution::from_outcome(&model, &out).unwrap();

        let mut solutions = BTreeMap::new();
        solutions.insert("one".to_string(), solution.clone());
        solutions.insert("again".to_string(), solution);
        let tables = MultiSolutionTables::from(&solutions);

        assert_eq!(tables.openings.len(), 2);
        assert_eq!(tables.assignments.len(), 4);
        assert_eq!(tables.parameter("one", UPPER_BOUND), Some(5.0));
        assert_eq!(tables.parameters[0].solution, "again");
        assert!(!tables.is_empty());
    }

    #[test]
    fn test_single_tables_written_as_csv() {
        let model = two_site_model();
        let out = outcome(MipStatus::Optimal, Some(vec![1.0, 1.0, 0.0, 1.0, 0.0]));
        let tables = SolutionTables::from(&CogSolution::from_outcome(&model, &out).unwrap());

        let dir = std::env::temp_dir().join(format!("cog-solution-{}", std::process::id()));
        tables.to_path(&dir).unwrap();
        let assignments = fs::read_to_string(dir.join("assignments.csv")).unwrap();
        assert_eq!(assignments, "Site,Assigned To\nA,A\nB,A\n");
        let parameters = fs::read_to_string(dir.join("parameters.csv")).unwrap();
        assert!(parameters.starts_with("Parameter,Value\nLower Bound,5.0\n"));
        let _ = fs::remove_dir_all(&dir);
    }
}
