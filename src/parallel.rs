//! Parallel batch queries using Rayon.
//!
//! The tree is only read during a batch, so many queries can share it
//! without locking.

use crate::interval::GeneRecord;
use crate::tree::IntervalTree;
use rayon::prelude::*;

/// Minimum number of queries before enabling parallelization.
/// Below this threshold, sequential processing is faster due to
/// thread spawn overhead.
pub const PARALLEL_THRESHOLD: usize = 256;

/// Run every query, returning one result list per query in input order.
pub fn search_batch<'a>(tree: &'a IntervalTree, queries: &[(i64, i64)]) -> Vec<Vec<&'a GeneRecord>> {
    if queries.len() < PARALLEL_THRESHOLD {
        return queries
            .iter()
            .map(|&(start, end)| tree.overlap_search(start, end))
            .collect();
    }
    queries
        .par_iter()
        .map(|&(start, end)| tree.overlap_search(start, end))
        .collect()
}

/// Count overlaps for every query, in input order.
pub fn count_batch(tree: &IntervalTree, queries: &[(i64, i64)]) -> Vec<usize> {
    if queries.len() < PARALLEL_THRESHOLD {
        return queries
            .iter()
            .map(|&(start, end)| tree.count_overlaps(start, end))
            .collect();
    }
    queries
        .par_iter()
        .map(|&(start, end)| tree.count_overlaps(start, end))
        .collect()
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub queries: usize,
    pub total_hits: usize,
    pub empty_queries: usize,
}

impl BatchStats {
    pub fn from_counts(counts: &[usize]) -> Self {
        Self {
            queries: counts.len(),
            total_hits: counts.iter().sum(),
            empty_queries: counts.iter().filter(|&&c| c == 0).count(),
        }
    }
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "queries={} hits={} empty={}",
            self.queries, self.total_hits, self.empty_queries
        )
    }
}
