//! Fuzzy search over the material catalog

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::matcher::normalize;
use crate::models::MaterialCatalogEntry;

/// A catalog search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Material id
    pub id: String,
    /// Display label
    pub label: String,
    /// Relevance in `[0, 1]`
    pub score: f32,
}

/// Ranks catalog entries against a typed query
pub struct MaterialSearch {
    skim: SkimMatcherV2,
    min_score: f32,
}

impl MaterialSearch {
    /// Create a searcher with the default cutoff
    pub fn new() -> Self {
        Self {
            skim: SkimMatcherV2::default(),
            min_score: 0.6,
        }
    }

    /// Set the minimum relevance
    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_score = score;
        self
    }

    /// Search `entries`, best first, at most `limit` hits
    pub fn search<'a, I>(&self, query: &str, entries: I, limit: usize) -> Vec<SearchHit>
    where
        I: IntoIterator<Item = &'a MaterialCatalogEntry>,
    {
        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = entries
            .into_iter()
            .filter_map(|entry| {
                let score = self.calculate_score(&query, &normalize(&entry.search_text()));
                (score >= self.min_score).then(|| SearchHit {
                    id: entry.id.clone(),
                    label: entry.label(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        hits.truncate(limit);
        hits
    }

    /// Mean of the skim and Jaro-Winkler similarities on normalized text
    fn calculate_score(&self, query: &str, text: &str) -> f32 {
        if query == text {
            return 1.0;
        }

        let mut scores = Vec::with_capacity(2);

        // skim scores are unbounded; ~100 is a solid subsequence match
        if let Some(skim_score) = self.skim.fuzzy_match(text, query) {
            scores.push((skim_score as f32 / 100.0).min(1.0));
        }

        scores.push(jaro_winkler(query, text) as f32);

        scores.iter().sum::<f32>() / scores.len() as f32
    }
}

impl Default for MaterialSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<MaterialCatalogEntry> {
        vec![
            MaterialCatalogEntry::new("UTC 70D Thread", Some("Black".into())).with_id("thread"),
            MaterialCatalogEntry::new("Hook", None).with_id("hook"),
            MaterialCatalogEntry::new("Marabou", Some("Olive".into())).with_id("marabou"),
        ]
    }

    #[test]
    fn test_exact_match_first() {
        let search = MaterialSearch::new();
        let entries = entries();
        let hits = search.search("hook", &entries, 10);
        assert_eq!(hits[0].id, "hook");
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn test_subsequence_match() {
        let search = MaterialSearch::new();
        let entries = entries();
        let hits = search.search("thread", &entries, 10);
        assert_eq!(hits[0].id, "thread");
        assert_eq!(hits[0].label, "UTC 70D Thread (Black)");
    }

    #[test]
    fn test_no_match_and_limit() {
        let search = MaterialSearch::new();
        let entries = entries();
        assert!(search.search("zzzz", &entries, 10).is_empty());
        assert!(search.search("  ", &entries, 10).is_empty());

        let loose = MaterialSearch::new().with_min_score(0.0);
        assert_eq!(loose.search("o", &entries, 2).len(), 2);
    }
}
