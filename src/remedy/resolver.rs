//! Remedy Resolver
//!
//! Resolution happens in two independent steps:
//!
//! 1. [`RemedyResolver::rank`] scores a query against every distinct
//!    condition key and returns the candidates at or above the threshold,
//!    best first. Equal scores keep the table's original order.
//! 2. [`SelectionPolicy::select`] walks the ranked list and keeps the
//!    candidates whose treatment lookup succeeds.
//!
//! The pipeline uses [`SelectionPolicy::First`]: the top candidate with a
//! treatment wins and nothing is aggregated.

use serde::Serialize;

use super::table::RemedyTable;
use crate::inference::similarity::{partial_ratio, Score};

/// Default resolution threshold (0-100)
pub const DEFAULT_REMEDY_THRESHOLD: Score = 80;

/// A condition key scored against a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub key: String,
    pub score: Score,
}

/// A candidate whose treatment was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Text the table was searched with (a label or a symptom term)
    pub query: String,
    /// Matched condition key
    pub key: String,
    pub score: Score,
    pub treatment: String,
}

/// How many resolvable candidates to keep from a ranked list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First resolvable candidate only
    #[default]
    First,
    /// Up to `k` resolvable candidates
    TopK(usize),
    /// Every resolvable candidate
    All,
}

impl SelectionPolicy {
    /// Keep resolvable candidates from a ranked list, preserving rank order
    pub fn select(
        &self,
        query: &str,
        ranked: &[MatchCandidate],
        table: &RemedyTable,
    ) -> Vec<Resolution> {
        let limit = match *self {
            SelectionPolicy::First => 1,
            SelectionPolicy::TopK(k) => k,
            SelectionPolicy::All => usize::MAX,
        };

        ranked
            .iter()
            .filter_map(|candidate| {
                table.treatment_for(&candidate.key).map(|treatment| Resolution {
                    query: query.to_string(),
                    key: candidate.key.clone(),
                    score: candidate.score,
                    treatment: treatment.to_string(),
                })
            })
            .take(limit)
            .collect()
    }
}

/// Fuzzy resolver from a query to remedy-table keys
#[derive(Debug, Clone, Copy)]
pub struct RemedyResolver {
    threshold: Score,
}

impl Default for RemedyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RemedyResolver {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_REMEDY_THRESHOLD)
    }

    pub fn with_threshold(threshold: Score) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Score {
        self.threshold
    }

    /// Rank every distinct table key against the query
    ///
    /// Candidates below the threshold are discarded. The sort is stable, so
    /// ties keep the first-occurrence order of the table.
    pub fn rank(&self, query: &str, table: &RemedyTable) -> Vec<MatchCandidate> {
        let query = query.trim().to_lowercase();

        let mut candidates: Vec<MatchCandidate> = table
            .keys()
            .iter()
            .filter_map(|key| {
                let score = partial_ratio(&query, &key.to_lowercase());
                (score >= self.threshold).then(|| MatchCandidate {
                    key: key.clone(),
                    score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        tracing::debug!(query = %query, candidates = candidates.len(), "ranked remedy keys");
        candidates
    }

    /// Rank then select with the given policy
    pub fn resolve(
        &self,
        query: &str,
        table: &RemedyTable,
        policy: SelectionPolicy,
    ) -> Vec<Resolution> {
        let ranked = self.rank(query, table);
        policy.select(query, &ranked, table)
    }

    /// First resolvable match, if any
    pub fn resolve_first(&self, query: &str, table: &RemedyTable) -> Option<Resolution> {
        self.resolve(query, table, SelectionPolicy::First)
            .into_iter()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remedy::table::RemedyRecord;

    fn table() -> RemedyTable {
        RemedyTable::from_records([
            RemedyRecord::new("Fever", "Tulsi decoction"),
            RemedyRecord::new("Malaria", "Giloy juice"),
            RemedyRecord::new("Typhoid Fever", "Guduchi kwath"),
            RemedyRecord::new("Common Cold", "Ginger tea"),
            RemedyRecord::new("fever", "Duplicate fever row"),
            RemedyRecord::new("", "Blank"),
        ])
    }

    #[test]
    fn test_rank_orders_by_score_then_table_order() {
        let resolver = RemedyResolver::new();
        let ranked = resolver.rank("fever", &table());
        // both keys contain "fever" exactly; table order breaks the tie
        assert_eq!(
            ranked,
            vec![
                MatchCandidate { key: "Fever".into(), score: 100 },
                MatchCandidate { key: "Typhoid Fever".into(), score: 100 },
            ]
        );
    }

    #[test]
    fn test_rank_never_below_threshold() {
        let table = table();
        for threshold in [0, 50, 80, 95, 100] {
            let resolver = RemedyResolver::with_threshold(threshold);
            for query in ["fever", "malria", "cold", "xyz", ""] {
                for c in resolver.rank(query, &table) {
                    assert!(c.score >= threshold);
                }
            }
        }
    }

    #[test]
    fn test_rank_is_sorted_descending() {
        let ranked = RemedyResolver::with_threshold(0).rank("malaria", &table());
        assert_eq!(ranked.first().map(|c| c.key.as_str()), Some("Malaria"));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_resolve_first() {
        let resolver = RemedyResolver::new();
        let table = table();

        let hit = resolver.resolve_first("Malaria", &table).unwrap();
        assert_eq!(hit.key, "Malaria");
        assert_eq!(hit.treatment, "Giloy juice");
        assert_eq!(hit.query, "Malaria");

        // duplicate "fever" row never shadows the first one
        let hit = resolver.resolve_first("FEVER", &table).unwrap();
        assert_eq!(hit.treatment, "Tulsi decoction");

        assert!(resolver.resolve_first("Dengue", &table).is_none());
    }

    #[test]
    fn test_selection_policies() {
        let resolver = RemedyResolver::new();
        let table = table();

        let all = resolver.resolve("fever", &table, SelectionPolicy::All);
        assert_eq!(all.len(), 2);
        let top1 = resolver.resolve("fever", &table, SelectionPolicy::TopK(1));
        assert_eq!(top1, all[..1].to_vec());
        let first = resolver.resolve("fever", &table, SelectionPolicy::First);
        assert_eq!(first, top1);
        assert!(resolver
            .resolve("fever", &table, SelectionPolicy::TopK(0))
            .is_empty());
    }

    #[test]
    fn test_select_skips_unresolvable() {
        let table = table();
        let ranked = vec![
            MatchCandidate { key: "Unknown".into(), score: 100 },
            MatchCandidate { key: "Common Cold".into(), score: 90 },
        ];
        let picked = SelectionPolicy::First.select("cold", &ranked, &table);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].key, "Common Cold");
    }
}
