//! Indexed view of the sites and distances of a validated data set.

use crate::input::{CenterStatus, InputTables};
use std::collections::{BTreeMap, HashMap};

/// A site as the model sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub demand: f64,
    pub center_status: CenterStatus,
}

impl Site {
    #[inline]
    pub fn can_be_center(&self) -> bool {
        self.center_status == CenterStatus::CanBeCenter
    }
}

/// Sites keyed by name (ordered, so models are built deterministically) and
/// the directed distance rows.
#[derive(Debug, Clone)]
pub struct CogData {
    pub sites: BTreeMap<String, Site>,
    distance: HashMap<(String, String), f64>,
}

impl CogData {
    pub fn new(tables: &InputTables) -> Self {
        let sites = tables
            .sites
            .iter()
            .map(|row| {
                (
                    row.name.clone(),
                    Site { demand: row.demand, center_status: row.center_status },
                )
            })
            .collect();
        let distance = tables
            .distance
            .iter()
            .map(|row| ((row.source.clone(), row.destination.clone()), row.distance))
            .collect();
        CogData { sites, distance }
    }

    /// Distance between two sites.
    ///
    /// The `(x, y)` row wins; the reverse row is used when it is missing, and
    /// pairs with neither are unreachable (infinite).
    pub fn distance(&self, x: &str, y: &str) -> f64 {
        // Tuple keys of owned strings can't be borrowed as (&str, &str)
        let key = (x.to_string(), y.to_string());
        if let Some(&d) = self.distance.get(&key) {
            return d;
        }
        let reverse = (key.1, key.0);
        self.distance.get(&reverse).copied().unwrap_or(f64::INFINITY)
    }

    /// `x` may be served by `y`
    pub fn can_assign(&self, x: &str, y: &str) -> bool {
        self.sites.get(y).map(Site::can_be_center).unwrap_or(false)
            && self.distance(x, y) < f64::INFINITY
    }

    pub fn demand(&self, name: &str) -> f64 {
        self.sites.get(name).map(|s| s.demand).unwrap_or(0.0)
    }

    /// Names of the candidate centers, in name order
    pub fn candidate_centers(&self) -> impl Iterator<Item = &str> {
        self.sites
            .iter()
            .filter(|(_, site)| site.can_be_center())
            .map(|(name, _)| name.as_str())
    }

    /// Every `(site, center)` pair that can be assigned, in name order
    pub fn assignable_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for n in self.sites.keys() {
            for c in self.candidate_centers() {
                if self.can_assign(n, c) {
                    pairs.push((n.as_str(), c));
                }
            }
        }
        pairs
    }
}
