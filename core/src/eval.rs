//! Retrieval quality metrics. Pure functions; degenerate inputs score 0.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

pub fn precision_recall_f1<T: Eq + Hash>(retrieved: &HashSet<T>, relevant: &HashSet<T>) -> PrecisionRecall {
    let tp = retrieved.intersection(relevant).count() as f64;
    let precision = if retrieved.is_empty() { 0.0 } else { tp / retrieved.len() as f64 };
    let recall = if relevant.is_empty() { 0.0 } else { tp / relevant.len() as f64 };
    let f1 = if precision + recall > 0.0 { 2.0 * precision * recall / (precision + recall) } else { 0.0 };
    PrecisionRecall { precision, recall, f1 }
}

/// Relevant documents among the first `k` retrieved, divided by `k` even when fewer than `k`
/// were retrieved.
pub fn precision_at_k<T: Eq + Hash>(retrieved: &[T], relevant: &HashSet<T>, k: usize) -> f64 {
    if retrieved.is_empty() || k == 0 {
        return 0.0;
    }
    let top: HashSet<&T> = retrieved.iter().take(k).collect();
    let hits = top.into_iter().filter(|d| relevant.contains(*d)).count();
    hits as f64 / k as f64
}

pub fn average_precision<T: Eq + Hash>(retrieved: &[T], relevant: &HashSet<T>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut found = 0usize;
    for (i, doc) in retrieved.iter().enumerate() {
        if relevant.contains(doc) {
            found += 1;
            sum += found as f64 / (i + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

/// Mean of [`average_precision`] over the top `k` results of every gold query that also has
/// an entry in `query_results`.
pub fn mean_average_precision<T: Eq + Hash>(
    query_results: &HashMap<String, Vec<T>>,
    gold: &HashMap<String, HashSet<T>>,
    k: usize,
) -> f64 {
    let mut queries: Vec<&String> = gold.keys().filter(|q| query_results.contains_key(*q)).collect();
    if queries.is_empty() {
        return 0.0;
    }
    // fixed order keeps the float sum reproducible
    queries.sort();
    let total: f64 = queries
        .iter()
        .map(|q| {
            let results = &query_results[*q];
            let top = &results[..k.min(results.len())];
            average_precision(top, &gold[*q])
        })
        .sum();
    total / queries.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_sets_are_perfect() {
        let r = set(&["a", "b"]);
        let m = precision_recall_f1(&r, &r);
        assert_eq!((m.precision, m.recall, m.f1), (1.0, 1.0, 1.0));
    }

    #[test]
    fn partial_overlap() {
        let m = precision_recall_f1(&set(&["a", "b", "c", "d"]), &set(&["a", "e"]));
        assert_eq!(m.precision, 0.25);
        assert_eq!(m.recall, 0.5);
        assert!((m.f1 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sides_score_zero() {
        let m = precision_recall_f1(&set(&[]), &set(&["a"]));
        assert_eq!((m.precision, m.recall, m.f1), (0.0, 0.0, 0.0));
        let m = precision_recall_f1(&set(&["a"]), &set(&[]));
        assert_eq!((m.precision, m.recall, m.f1), (0.0, 0.0, 0.0));
    }

    #[test]
    fn precision_at_k_divides_by_k() {
        let relevant = set(&["a", "c"]);
        assert_eq!(precision_at_k(&list(&["a", "b"]), &relevant, 3), 1.0 / 3.0);
        assert_eq!(precision_at_k(&list(&["a", "b", "c"]), &relevant, 2), 0.5);
        assert_eq!(precision_at_k::<String>(&[], &relevant, 3), 0.0);
    }

    #[test]
    fn average_precision_rewards_early_hits() {
        let relevant = set(&["a", "c"]);
        // hits at ranks 1 and 3: (1/1 + 2/3) / 2
        let ap = average_precision(&list(&["a", "b", "c"]), &relevant);
        assert!((ap - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!(average_precision(&list(&["c", "a"]), &relevant) > ap);
        assert_eq!(average_precision(&list(&["a"]), &set(&[])), 0.0);
    }

    #[test]
    fn map_only_counts_queries_with_results() {
        let mut results = HashMap::new();
        results.insert("q1".to_string(), list(&["a", "x", "b"]));
        results.insert("q3".to_string(), list(&["z"]));
        let mut gold = HashMap::new();
        gold.insert("q1".to_string(), set(&["a", "b"]));
        gold.insert("q2".to_string(), set(&["c"]));

        // q1 cut to top 2: only "a" at rank 1 -> AP = 1/2
        assert_eq!(mean_average_precision(&results, &gold, 2), 0.5);
        assert_eq!(mean_average_precision(&HashMap::new(), &gold, 5), 0.0);
    }
}
