//! Concurrent copies of a single solve, one per number of centroids.

use crate::batch::solve_pool;
use crate::cog::{solve, SolveLogs};
use crate::input::{InputTables, ParamValue};
use crate::parameters::NUMBER_OF_CENTROIDS;
use crate::progress::LogProgress;
use crate::solution::CogSolution;
use crate::solver::MipBackend;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Solve a copy of `tables` for each entry of `centroid_counts`, all copies
/// at once on their own threads.
///
/// The results are keyed by the number of centers opened. Copies without a
/// solution are skipped; an invalid data set or an engine failure in any
/// copy is an error.
pub fn solve_variants(
    tables: &InputTables,
    centroid_counts: &[usize],
    backend: &dyn MipBackend,
) -> Result<BTreeMap<usize, CogSolution>, String> {
    let copies: Vec<(usize, InputTables)> = centroid_counts
        .iter()
        .map(|&p| {
            let mut copy = tables.clone();
            copy.set_parameter(NUMBER_OF_CENTROIDS, ParamValue::Number(p as f64));
            (p, copy)
        })
        .collect();

    let results: Vec<(usize, Option<CogSolution>)> = solve_pool(copies.len())?.install(|| {
        copies
            .par_iter()
            .map(|(p, copy)| {
                solve(copy, backend, &mut SolveLogs::sink(), &LogProgress)
                    .map(|solution| (*p, solution))
                    .map_err(|e| format!("{} centroids: {}", p, e))
            })
            .collect::<Result<_, _>>()
    })?;

    let mut solutions = BTreeMap::new();
    for (p, solution) in results {
        match solution {
            Some(solution) => {
                solutions.insert(solution.openings.len(), solution);
            }
            None => log::warn!("No solution with {} centroids", p),
        }
    }
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::line_tables;
    use crate::solver::HighsBackend;

    #[test]
    fn test_variants_keyed_by_openings() {
        let solutions = solve_variants(&line_tables(1), &[1, 2, 3], &HighsBackend).unwrap();

        assert_eq!(solutions.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!((solutions[&1].upper_bound - 70.0).abs() < 1e-6);
        assert!((solutions[&2].upper_bound - 10.0).abs() < 1e-6);
        assert!(solutions[&3].upper_bound.abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_variants_are_skipped() {
        let solutions = solve_variants(&line_tables(1), &[2, 4], &HighsBackend).unwrap();
        assert_eq!(solutions.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_invalid_data_fails_every_variant() {
        let mut tables = line_tables(1);
        tables.distance[0].source = "Nowhere".to_string();
        assert!(solve_variants(&tables, &[1, 2], &HighsBackend).is_err());
    }
}
