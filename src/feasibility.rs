//! Infeasibility pre-diagnosis, run before a model is built.

use crate::data::CogData;
use crate::logfile::LogFile;

/// What the data says about feasibility before any solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnosis {
    /// Sites with demand that no center can serve
    pub unassignable: Vec<String>,
    /// Sites without demand that can't serve anybody either
    pub useless: Vec<String>,
    pub has_candidate_center: bool,
}

impl Diagnosis {
    /// A model can only be built if every demand point has somewhere to go
    /// and at least one site can be a center.
    pub fn is_feasible(&self) -> bool {
        self.unassignable.is_empty() && self.has_candidate_center
    }

    /// Write the findings to an error and warning log.
    ///
    /// Unassignable demand is reported alone.
    pub fn log_to(&self, log: &mut LogFile) {
        if !self.unassignable.is_empty() {
            log.write("The following sites have demand, but can't be assigned to anything.\n");
            log.log_table("Un-assignable Demand Points", &site_table(&self.unassignable));
            return;
        }
        if !self.useless.is_empty() {
            log.write(
                "The following sites have no demand, and can't serve as the center point for any assignments.\n",
            );
            log.log_table("Useless Sites", &site_table(&self.useless));
        }
        if !self.has_candidate_center {
            log.write("Nothing can be a center!\n");
        }
    }
}

fn site_table(sites: &[String]) -> Vec<Vec<String>> {
    std::iter::once(vec!["Site".to_string()])
        .chain(sites.iter().map(|s| vec![s.clone()]))
        .collect()
}

pub fn diagnose(data: &CogData) -> Diagnosis {
    let names: Vec<&str> = data.sites.keys().map(String::as_str).collect();

    let unassignable = data
        .sites
        .iter()
        .filter(|(n, site)| site.demand > 0.0 && !names.iter().any(|y| data.can_assign(n, y)))
        .map(|(n, _)| n.clone())
        .collect();

    let useless = data
        .sites
        .iter()
        .filter(|(n, site)| site.demand == 0.0 && !names.iter().any(|y| data.can_assign(y, n)))
        .map(|(n, _)| n.clone())
        .collect();

    Diagnosis {
        unassignable,
        useless,
        has_candidate_center: data.candidate_centers().next().is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CenterStatus, DistanceRow, InputTables, SiteRow};

    fn data(sites: &[(&str, f64, CenterStatus)], arcs: &[(&str, &str, f64)]) -> CogData {
        CogData::new(&InputTables {
            sites: sites
                .iter()
                .map(|&(name, demand, center_status)| SiteRow {
                    name: name.to_string(),
                    demand,
                    center_status,
                })
                .collect(),
            distance: arcs
                .iter()
                .map(|&(a, b, d)| DistanceRow {
                    source: a.to_string(),
                    destination: b.to_string(),
                    distance: d,
                })
                .collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_unassignable_demand_blocks_model() {
        use CenterStatus::*;
        let data = data(
            &[("Hub", 0.0, CanBeCenter), ("Near", 3.0, PureDemandPoint), ("Far", 2.0, PureDemandPoint)],
            &[("Near", "Hub", 1.0)],
        );
        let diagnosis = diagnose(&data);

        assert_eq!(diagnosis.unassignable, vec!["Far".to_string()]);
        assert!(diagnosis.useless.is_empty());
        assert!(!diagnosis.is_feasible());

        let mut log = LogFile::memory();
        diagnosis.log_to(&mut log);
        assert!(log.contents().contains("Un-assignable Demand Points"));
        assert!(log.contents().contains("Far"));
    }

    #[test]
    fn test_useless_sites_are_only_a_warning() {
        use CenterStatus::*;
        let data = data(
            &[("Hub", 1.0, CanBeCenter), ("Idle", 0.0, PureDemandPoint)],
            &[("Hub", "Hub", 0.0)],
        );
        let diagnosis = diagnose(&data);

        assert_eq!(diagnosis.useless, vec!["Idle".to_string()]);
        assert!(diagnosis.is_feasible());

        let mut log = LogFile::memory();
        diagnosis.log_to(&mut log);
        assert!(log.contents().contains("Useless Sites"));
    }

    #[test]
    fn test_useless_sites_not_reported_next_to_unassignable_demand() {
        use CenterStatus::*;
        let data = data(
            &[("Hub", 1.0, CanBeCenter), ("Idle", 0.0, PureDemandPoint), ("Far", 2.0, PureDemandPoint)],
            &[("Hub", "Hub", 0.0)],
        );
        let diagnosis = diagnose(&data);
        assert_eq!(diagnosis.unassignable, vec!["Far".to_string()]);

        let mut log = LogFile::memory();
        diagnosis.log_to(&mut log);
        assert!(log.contents().contains("Un-assignable Demand Points"));
        assert!(!log.contents().contains("Useless Sites"));
        assert!(!log.contents().contains("Idle"));
    }

    #[test]
    fn test_no_candidate_center() {
        use CenterStatus::*;
        let data = data(&[("A", 0.0, PureDemandPoint), ("B", 0.0, PureDemandPoint)], &[]);
        let diagnosis = diagnose(&data);

        assert!(diagnosis.unassignable.is_empty());
        assert!(!diagnosis.has_candidate_center);
        assert!(!diagnosis.is_feasible());

        let mut log = LogFile::memory();
        diagnosis.log_to(&mut log);
        assert!(log.contents().contains("Nothing can be a center!"));
    }
}
