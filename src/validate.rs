//! Integrity checks for a data set before any model gets built.

use crate::input::{InputTables, ParamValue};
use crate::parameters::{positive_integer, Parameters};
use std::collections::HashSet;
use std::fmt;

/// Category of a data problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DuplicateKey,
    ForeignKey,
    DataType,
    Parameter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFailure {
    pub table: &'static str,
    pub kind: FailureKind,
    pub message: String,
}

impl DataFailure {
    fn new(table: &'static str, kind: FailureKind, message: String) -> Self {
        DataFailure { table, kind, message }
    }
}

impl fmt::Display for DataFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}: {}", self.table, self.kind, self.message)
    }
}

/// Which solve the data set is checked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveKind {
    /// Reads `Number of Centroids`; the `solutions` table is ignored
    Single,
    /// Reads the `solutions` table
    Batch,
}

fn non_negative_finite(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Collect every problem with the data set
pub fn find_failures(tables: &InputTables) -> Vec<DataFailure> {
    let mut failures = Vec::new();

    let mut site_names = HashSet::new();
    for site in &tables.sites {
        if !site_names.insert(site.name.as_str()) {
            failures.push(DataFailure::new(
                "sites",
                FailureKind::DuplicateKey,
                format!("site {:?} appears more than once", site.name),
            ));
        }
        if !non_negative_finite(site.demand) {
            failures.push(DataFailure::new(
                "sites",
                FailureKind::DataType,
                format!("site {:?} has invalid demand {}", site.name, site.demand),
            ));
        }
    }

    let mut arcs = HashSet::new();
    for row in &tables.distance {
        if !arcs.insert((row.source.as_str(), row.destination.as_str())) {
            failures.push(DataFailure::new(
                "distance",
                FailureKind::DuplicateKey,
                format!("distance {:?} -> {:?} appears more than once", row.source, row.destination),
            ));
        }
        for endpoint in [&row.source, &row.destination] {
            if !site_names.contains(endpoint.as_str()) {
                failures.push(DataFailure::new(
                    "distance",
                    FailureKind::ForeignKey,
                    format!(
                        "distance {:?} -> {:?} references unknown site {:?}",
                        row.source, row.destination, endpoint
                    ),
                ));
            }
        }
        if !non_negative_finite(row.distance) {
            failures.push(DataFailure::new(
                "distance",
                FailureKind::DataType,
                format!(
                    "distance {:?} -> {:?} has invalid value {}",
                    row.source, row.destination, row.distance
                ),
            ));
        }
    }

    let mut parameter_names = HashSet::new();
    for row in &tables.parameters {
        if !parameter_names.insert(row.parameter.as_str()) {
            failures.push(DataFailure::new(
                "parameters",
                FailureKind::DuplicateKey,
                format!("parameter {:?} appears more than once", row.parameter),
            ));
        }
    }
    if let Err(errors) = Parameters::from_rows(&tables.parameters) {
        failures.extend(
            errors
                .into_iter()
                .map(|e| DataFailure::new("parameters", FailureKind::Parameter, e)),
        );
    }

    let mut solution_names = HashSet::new();
    for row in &tables.solutions {
        if !solution_names.insert(row.name.as_str()) {
            failures.push(DataFailure::new(
                "solutions",
                FailureKind::DuplicateKey,
                format!("solution {:?} appears more than once", row.name),
            ));
        }
        let count = ParamValue::Number(row.number_of_centroids);
        if let Err(e) = positive_integer("Number of Centroids", &count) {
            failures.push(DataFailure::new(
                "solutions",
                FailureKind::DataType,
                format!("solution {:?}: {}", row.name, e),
            ));
        }
    }

    failures
}

/// Fail with a readable summary if the data set has problems for this kind
/// of solve. Problems in tables the solve doesn't read are only warnings.
pub fn ensure_valid(tables: &InputTables, kind: SolveKind) -> Result<(), String> {
    let (failures, ignored): (Vec<DataFailure>, Vec<DataFailure>) = find_failures(tables)
        .into_iter()
        .partition(|f| kind == SolveKind::Batch || f.table != "solutions");
    for failure in &ignored {
        log::warn!("{} (not read by this solve)", failure);
    }
    if failures.is_empty() {
        return Ok(());
    }
    for failure in &failures {
        log::error!("{}", failure);
    }
    let summary: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
    Err(format!(
        "Input data has {} failure(s):\n  {}",
        failures.len(),
        summary.join("\n  ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CenterStatus, DistanceRow, ParameterRow, SiteRow, SolutionRow};

    fn site(name: &str, demand: f64) -> SiteRow {
        SiteRow { name: name.to_string(), demand, center_status: CenterStatus::CanBeCenter }
    }

    fn arc(from: &str, to: &str, distance: f64) -> DistanceRow {
        DistanceRow { source: from.to_string(), destination: to.to_string(), distance }
    }

    #[test]
    fn test_clean_data_has_no_failures() {
        let tables = InputTables {
            sites: vec![site("A", 1.0), site("B", 0.0)],
            distance: vec![arc("A", "B", 4.0)],
            ..Default::default()
        };
        assert!(find_failures(&tables).is_empty());
        assert!(ensure_valid(&tables, SolveKind::Single).is_ok());
        assert!(ensure_valid(&tables, SolveKind::Batch).is_ok());
    }

    #[test]
    fn test_foreign_keys_checked_on_both_ends() {
        let tables = InputTables {
            sites: vec![site("A", 1.0)],
            distance: vec![arc("A", "Z", 4.0), arc("Y", "A", 1.0)],
            ..Default::default()
        };
        let failures = find_failures(&tables);
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.kind == FailureKind::ForeignKey));
    }

    #[test]
    fn test_data_types_and_duplicates() {
        let tables = InputTables {
            sites: vec![site("A", -1.0), site("A", 2.0), site("B", f64::INFINITY)],
            distance: vec![arc("A", "B", -3.0), arc("A", "B", 3.0)],
            parameters: vec![
                ParameterRow { parameter: "MIP Gap".to_string(), value: ParamValue::Number(-1.0) },
            ],
            solutions: vec![
                SolutionRow { name: "s".to_string(), number_of_centroids: 0.0 },
                SolutionRow { name: "s".to_string(), number_of_centroids: 1.5 },
            ],
        };
        let failures = find_failures(&tables);
        let count = |kind| failures.iter().filter(|f| f.kind == kind).count();

        assert_eq!(count(FailureKind::DuplicateKey), 3);
        assert_eq!(count(FailureKind::DataType), 5);
        assert_eq!(count(FailureKind::Parameter), 1);
        assert_eq!(count(FailureKind::ForeignKey), 0);
        assert!(ensure_valid(&tables, SolveKind::Single).unwrap_err().contains("failure"));
    }

    #[test]
    fn test_solutions_table_only_checked_for_batch() {
        let tables = InputTables {
            sites: vec![site("A", 1.0)],
            distance: vec![arc("A", "A", 0.0)],
            solutions: vec![SolutionRow { name: "bad".to_string(), number_of_centroids: 0.0 }],
            ..Default::default()
        };

        assert_eq!(find_failures(&tables).len(), 1);
        assert!(ensure_valid(&tables, SolveKind::Single).is_ok());
        let err = ensure_valid(&tables, SolveKind::Batch).unwrap_err();
        assert!(err.contains("bad"));
    }
}
