//! Sample data sets.
//!
//! Sites are scattered on a square and distances are Euclidean. A share of
//! the sites are candidate centers; pairs farther apart than the cutoff get
//! no distance row, which makes them unassignable to each other.

use crate::input::{
    CenterStatus, DistanceRow, InputTables, ParamValue, SiteRow, SolutionRow,
};
use crate::parameters::NUMBER_OF_CENTROIDS;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub num_sites: usize,
    /// Probability for a site to be a candidate center
    pub center_share: f64,
    /// Probability for a site to have zero demand
    pub zero_demand_share: f64,
    pub max_demand: u32,
    /// Side of the square the sites are placed on
    pub side: f64,
    /// Pairs farther apart get no distance row
    pub cutoff: Option<f64>,
    /// Centroid counts written to the `solutions` table; the first sites are
    /// made candidates so that every count is feasible
    pub solutions: Vec<usize>,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            num_sites: 30,
            center_share: 0.5,
            zero_demand_share: 0.1,
            max_demand: 100,
            side: 100.0,
            cutoff: None,
            solutions: vec![3, 4, 5],
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn generate(&self) -> InputTables {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut tables = InputTables::default();
        let mut coords = Vec::with_capacity(self.num_sites);
        // Enough candidates for the largest requested number of centers
        let forced_centers = self.solutions.iter().copied().max().unwrap_or(1).max(1);

        for i in 0..self.num_sites {
            let name = format!("Site{:03}", i + 1);
            let center = i < forced_centers || rng.gen_bool(self.center_share);
            let demand = if rng.gen_bool(self.zero_demand_share) {
                0.0
            } else {
                rng.gen_range(1..=self.max_demand.max(1)) as f64
            };
            coords.push((name.clone(), rng.gen_range(0.0..self.side), rng.gen_range(0.0..self.side)));
            tables.sites.push(SiteRow {
                name,
                demand,
                center_status: if center {
                    CenterStatus::CanBeCenter
                } else {
                    CenterStatus::PureDemandPoint
                },
            });
        }

        // One row per unordered pair; the lookup is symmetric
        for (i, (a, xa, ya)) in coords.iter().enumerate() {
            for (b, xb, yb) in &coords[i..] {
                let d = ((xa - xb).powi(2) + (ya - yb).powi(2)).sqrt();
                if self.cutoff.map_or(true, |cutoff| d <= cutoff) {
                    tables.distance.push(DistanceRow {
                        source: a.clone(),
                        destination: b.clone(),
                        distance: (d * 100.0).round() / 100.0,
                    });
                }
            }
        }

        let first = self.solutions.first().copied().unwrap_or(1);
        tables.set_parameter(NUMBER_OF_CENTROIDS, ParamValue::Number(first as f64));
        tables.solutions = self
            .solutions
            .iter()
            .map(|&p| SolutionRow { name: format!("p{}", p), number_of_centroids: p as f64 })
            .collect();

        log::debug!(
            "Generated {} sites and {} distance rows (seed {})",
            tables.sites.len(),
            tables.distance.len(),
            self.seed
        );
        tables
    }
}

/// Three candidate sites on a line at 0, 10 and 30 with demands 4, 1 and 2
pub fn line_tables(number_of_centroids: usize) -> InputTables {
    let line: [(&str, f64, f64); 3] = [("A", 0.0, 4.0), ("B", 10.0, 1.0), ("C", 30.0, 2.0)];
    let mut tables = InputTables::default();
    for (i, &(name, x, demand)) in line.iter().enumerate() {
        tables.sites.push(SiteRow {
            name: name.to_string(),
            demand,
            center_status: CenterStatus::CanBeCenter,
        });
        for &(other, y, _) in &line[i..] {
            tables.distance.push(DistanceRow {
                source: name.to_string(),
                destination: other.to_string(),
                distance: (x - y).abs(),
            });
        }
    }
    tables.set_parameter(NUMBER_OF_CENTROIDS, ParamValue::Number(number_of_centroids as f64));
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::diagnose;
    use crate::data::CogData;
    use crate::validate::find_failures;

    #[test]
    fn test_generation_is_deterministic() {
        let config = GeneratorConfig { num_sites: 12, ..Default::default() };
        assert_eq!(config.generate(), config.generate());

        let other = GeneratorConfig { seed: 1, ..config.clone() };
        assert_ne!(config.generate(), other.generate());
    }

    #[test]
    fn test_generated_data_is_valid_and_feasible() {
        let config = GeneratorConfig { num_sites: 20, ..Default::default() };
        let tables = config.generate();

        assert!(find_failures(&tables).is_empty());
        assert_eq!(tables.sites.len(), 20);
        // Every unordered pair including self pairs
        assert_eq!(tables.distance.len(), 20 * 21 / 2);
        assert_eq!(tables.solutions.len(), 3);
        assert!(diagnose(&CogData::new(&tables)).is_feasible());
    }

    #[test]
    fn test_cutoff_drops_far_pairs() {
        let config = GeneratorConfig { num_sites: 20, cutoff: Some(10.0), ..Default::default() };
        let tables = config.generate();
        assert!(tables.distance.len() < 20 * 21 / 2);
        assert!(tables.distance.iter().all(|row| row.distance <= 10.0));
    }

    #[test]
    fn test_line_tables() {
        let tables = line_tables(2);
        assert_eq!(tables.sites.len(), 3);
        assert_eq!(tables.distance.len(), 6);
        assert!(find_failures(&tables).is_empty());
    }
}
