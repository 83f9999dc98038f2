//! The center of gravity (p-median) model.
//!
//! Variables:
//! - Binary `x[n][a]` = 1 if site `n` is served by center `a`, for every
//!   assignable pair, weighted by `distance(n, a) * demand(n)`
//! - Binary `y[c]` = 1 if candidate `c` is opened as a center
//!
//! Every site with demand is assigned exactly once, assignments need an open
//! center, and exactly `p` centers open.

use crate::data::CogData;
use crate::feasibility::{diagnose, Diagnosis};
use crate::parameters::Formulation;
use crate::progress::{LogProgress, Progress};
use crate::solver::{ConstraintSense, MipProblem, VarId};

/// Why no model could be built
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    UnassignableDemand(Vec<String>),
    NoCandidateCenter,
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::UnassignableDemand(sites) => {
                write!(f, "unassignable demand points {:?}", sites)
            }
            ModelError::NoCandidateCenter => write!(f, "Nothing can be a center!"),
        }
    }
}

/// A built model and the mapping from its variables back to sites
#[derive(Debug, Clone)]
pub struct CogModel {
    pub problem: MipProblem,
    /// `((site, assigned to), x)`
    pub assign_vars: Vec<((String, String), VarId)>,
    /// `(site, y)`
    pub open_vars: Vec<(String, VarId)>,
    pub number_of_centroids: usize,
}

impl CogModel {
    /// Diagnose the data, then build the model.
    ///
    /// The diagnosis is returned in both cases so callers can log it.
    pub fn build(
        data: &CogData,
        number_of_centroids: usize,
        formulation: Formulation,
    ) -> (Diagnosis, Result<CogModel, ModelError>) {
        let diagnosis = diagnose(data);
        let model = Self::from_diagnosis(data, &diagnosis, number_of_centroids, formulation, &LogProgress);
        (diagnosis, model)
    }

    /// Build the model for data already diagnosed, reporting "Core Model
    /// Creation" once the variables exist and again when it is complete.
    pub fn from_diagnosis(
        data: &CogData,
        diagnosis: &Diagnosis,
        number_of_centroids: usize,
        formulation: Formulation,
        progress: &dyn Progress,
    ) -> Result<CogModel, ModelError> {
        if !diagnosis.unassignable.is_empty() {
            return Err(ModelError::UnassignableDemand(diagnosis.unassignable.clone()));
        }
        if !diagnosis.has_candidate_center {
            return Err(ModelError::NoCandidateCenter);
        }
        Ok(Self::build_unchecked(data, number_of_centroids, formulation, progress))
    }

    fn build_unchecked(
        data: &CogData,
        number_of_centroids: usize,
        formulation: Formulation,
        progress: &dyn Progress,
    ) -> CogModel {
        let mut problem = MipProblem::new("cog");

        let assign_vars: Vec<((String, String), VarId)> = data
            .assignable_pairs()
            .into_iter()
            .map(|(n, a)| {
                let cost = data.distance(n, a) * data.demand(n);
                let var = problem.add_binary(format!("{}_{}", n, a), cost);
                ((n.to_string(), a.to_string()), var)
            })
            .collect();

        let open_vars: Vec<(String, VarId)> = data
            .candidate_centers()
            .map(|c| (c.to_string(), problem.add_binary(format!("open_{}", c), 0.0)))
            .collect();
        progress.numerical_progress("Core Model Creation", 50.0);

        // Each site with demand goes to exactly one center
        for (n, site) in &data.sites {
            if site.demand > 0.0 {
                let terms: Vec<(VarId, f64)> = assign_vars
                    .iter()
                    .filter(|((from, _), _)| from == n)
                    .map(|(_, var)| (*var, 1.0))
                    .collect();
                problem.add_constraint(format!("must_assign_{}", n), terms, ConstraintSense::Equal, 1.0);
            }
        }

        // Only open centers receive assignments
        for (center, open) in &open_vars {
            let incoming: Vec<VarId> = assign_vars
                .iter()
                .filter(|((_, to), _)| to == center)
                .map(|(_, var)| *var)
                .collect();
            if incoming.is_empty() {
                continue;
            }
            match formulation {
                Formulation::Weak => {
                    let mut terms: Vec<(VarId, f64)> = incoming.iter().map(|&x| (x, 1.0)).collect();
                    terms.push((*open, -(incoming.len() as f64)));
                    problem.add_constraint(
                        format!("weak_force_open_{}", center),
                        terms,
                        ConstraintSense::LessEqual,
                        0.0,
                    );
                }
                Formulation::Strong => {
                    for x in incoming {
                        problem.add_constraint(
                            format!("strong_force_open_{}", center),
                            vec![(x, 1.0), (*open, -1.0)],
                            ConstraintSense::LessEqual,
                            0.0,
                        );
                    }
                }
            }
        }

        let open_terms = open_vars.iter().map(|(_, y)| (*y, 1.0)).collect();
        problem.add_constraint(
            "numCentroids".to_string(),
            open_terms,
            ConstraintSense::Equal,
            number_of_centroids as f64,
        );

        progress.numerical_progress("Core Model Creation", 100.0);
        log::debug!(
            "Built cog model: {} assignment vars, {} opening vars, {} constraints",
            assign_vars.len(),
            open_vars.len(),
            problem.constraints.len()
        );

        CogModel { problem, assign_vars, open_vars, number_of_centroids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CenterStatus, DistanceRow, InputTables, SiteRow};

    /// Three sites on a line, 0 -- 10 -- 30, all candidates with self distances
    fn line_data() -> CogData {
        let pos: [(&str, f64, f64); 3] = [("A", 0.0, 4.0), ("B", 10.0, 1.0), ("C", 30.0, 2.0)];
        let mut tables = InputTables::default();
        for &(name, _, demand) in &pos {
            tables.sites.push(SiteRow {
                name: name.to_string(),
                demand,
                center_status: CenterStatus::CanBeCenter,
            });
        }
        for (i, &(a, xa, _)) in pos.iter().enumerate() {
            for &(b, xb, _) in &pos[i..] {
                tables.distance.push(DistanceRow {
                    source: a.to_string(),
                    destination: b.to_string(),
                    distance: (xa - xb).abs(),
                });
            }
        }
        CogData::new(&tables)
    }

    #[test]
    fn test_strong_formulation_shape() {
        let (_, model) = CogModel::build(&line_data(), 2, Formulation::Strong);
        let model = model.unwrap();

        assert_eq!(model.assign_vars.len(), 9);
        assert_eq!(model.open_vars.len(), 3);
        // 3 must_assign + 9 linking + numCentroids
        assert_eq!(model.problem.constraints.len(), 13);

        let (_, var) = model
            .assign_vars
            .iter()
            .find(|((n, a), _)| n == "A" && a == "C")
            .unwrap();
        assert_eq!(model.problem.variables[var.0].objective, 120.0);
        assert_eq!(model.problem.variables[var.0].name, "A_C");

        let last = model.problem.constraints.last().unwrap();
        assert_eq!(last.name, "numCentroids");
        assert_eq!(last.rhs, 2.0);
    }

    #[test]
    fn test_weak_formulation_aggregates_links() {
        let (_, model) = CogModel::build(&line_data(), 1, Formulation::Weak);
        let model = model.unwrap();

        // 3 must_assign + 3 weak links + numCentroids
        assert_eq!(model.problem.constraints.len(), 7);
        let weak = model
            .problem
            .constraints
            .iter()
            .find(|c| c.name == "weak_force_open_B")
            .unwrap();
        assert_eq!(weak.terms.len(), 4);
        assert_eq!(weak.terms.last().unwrap().1, -3.0);
    }

    #[test]
    fn test_zero_demand_sites_not_forced() {
        let mut tables = InputTables::default();
        for (name, demand) in [("A", 1.0), ("B", 0.0)] {
            tables.sites.push(SiteRow {
                name: name.to_string(),
                demand,
                center_status: CenterStatus::CanBeCenter,
            });
        }
        tables.distance.push(DistanceRow {
            source: "A".to_string(),
            destination: "A".to_string(),
            distance: 0.0,
        });
        let (diagnosis, model) = CogModel::build(&CogData::new(&tables), 1, Formulation::Strong);
        let model = model.unwrap();

        assert_eq!(diagnosis.useless, vec!["B".to_string()]);
        let must_assign: Vec<&str> = model
            .problem
            .constraints
            .iter()
            .filter(|c| c.name.starts_with("must_assign"))
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(must_assign, vec!["must_assign_A"]);
    }

    #[derive(Default)]
    struct Stages(std::sync::Mutex<Vec<(String, f64)>>);

    impl Progress for Stages {
        fn numerical_progress(&self, theme: &str, percent: f64) -> bool {
            if let Ok(mut stages) = self.0.lock() {
                stages.push((theme.to_string(), percent));
            }
            true
        }
    }

    #[test]
    fn test_model_creation_progress_stages() {
        let data = line_data();
        let diagnosis = diagnose(&data);
        let stages = Stages::default();
        CogModel::from_diagnosis(&data, &diagnosis, 1, Formulation::Strong, &stages).unwrap();

        let stages = stages.0.into_inner().unwrap();
        assert_eq!(
            stages,
            vec![
                ("Core Model Creation".to_string(), 50.0),
                ("Core Model Creation".to_string(), 100.0),
            ]
        );
    }

    #[test]
    fn test_infeasible_data_builds_nothing() {
        let mut tables = InputTables::default();
        tables.sites.push(SiteRow {
            name: "Lonely".to_string(),
            demand: 1.0,
            center_status: CenterStatus::PureDemandPoint,
        });
        let (diagnosis, model) = CogModel::build(&CogData::new(&tables), 1, Formulation::Strong);

        assert_eq!(model.unwrap_err(), ModelError::UnassignableDemand(vec!["Lonely".to_string()]));
        assert!(!diagnosis.is_feasible());
    }
}
