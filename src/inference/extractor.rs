//! Symptom Extractor
//!
//! Matches each token of normalized text against the vocabulary and keeps
//! the best-scoring term when it clears the threshold.

use serde::Serialize;

use super::similarity::{partial_ratio, Score};
use super::tokenizer::tokens;
use crate::vocabulary::Vocabulary;

/// Default extraction threshold (0-100)
pub const DEFAULT_SYMPTOM_THRESHOLD: Score = 80;

/// One accepted vocabulary match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomMatch {
    /// Vocabulary term
    pub term: String,
    /// Feature position of the term
    pub position: usize,
    /// Token that first produced the match
    pub token: String,
    /// Partial similarity between token and term
    pub score: Score,
}

/// Symptoms recognized in one request, in first-extraction order
///
/// Every entry is a vocabulary member and appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedSymptoms {
    matches: Vec<SymptomMatch>,
}

impl ExtractedSymptoms {
    /// Record a match unless its term is already present
    fn insert(&mut self, m: SymptomMatch) -> bool {
        if self.contains_position(m.position) {
            return false;
        }
        self.matches.push(m);
        true
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn contains_position(&self, position: usize) -> bool {
        self.matches.iter().any(|m| m.position == position)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.matches.iter().any(|m| m.term == term)
    }

    /// Terms in extraction order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.term.as_str())
    }

    /// Feature positions in extraction order
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.matches.iter().map(|m| m.position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SymptomMatch> {
        self.matches.iter()
    }

    pub fn first(&self) -> Option<&SymptomMatch> {
        self.matches.first()
    }
}

impl<'a> IntoIterator for &'a ExtractedSymptoms {
    type Item = &'a SymptomMatch;
    type IntoIter = std::slice::Iter<'a, SymptomMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// Fuzzy symptom extractor over a fixed vocabulary
#[derive(Debug, Clone, Copy)]
pub struct SymptomExtractor<'a> {
    vocabulary: &'a Vocabulary,
    threshold: Score,
}

impl<'a> SymptomExtractor<'a> {
    /// Create an extractor with the default threshold
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self::with_threshold(vocabulary, DEFAULT_SYMPTOM_THRESHOLD)
    }

    pub fn with_threshold(vocabulary: &'a Vocabulary, threshold: Score) -> Self {
        Self {
            vocabulary,
            threshold,
        }
    }

    pub fn threshold(&self) -> Score {
        self.threshold
    }

    /// Best vocabulary term for a single token
    ///
    /// Returns `(position, score)` of the highest-scoring term; on a tie the
    /// earliest term in vocabulary order wins. The threshold is not applied.
    pub fn best_match(&self, token: &str) -> Option<(usize, Score)> {
        let mut best: Option<(usize, Score)> = None;
        for (position, term) in self.vocabulary.iter().enumerate() {
            let score = partial_ratio(token, term);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((position, score)),
            }
        }
        best
    }

    /// Extract symptoms from already-normalized text
    pub fn extract(&self, normalized: &str) -> ExtractedSymptoms {
        let mut symptoms = ExtractedSymptoms::default();

        for token in tokens(normalized) {
            let Some((position, score)) = self.best_match(token) else {
                continue;
            };
            if score < self.threshold {
                tracing::debug!(token, score, "token below symptom threshold");
                continue;
            }
            let term = self.vocabulary.get(position).unwrap_or_default().to_string();
            tracing::debug!(token, term = %term, score, "symptom matched");
            symptoms.insert(SymptomMatch {
                term,
                position,
                token: token.to_string(),
                score,
            });
        }

        symptoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::tokenizer::normalize;

    fn vocab() -> Vocabulary {
        Vocabulary::new(["fever", "nausea", "body pain", "headache", "cough"]).unwrap()
    }

    #[test]
    fn test_extract_multiple() {
        let vocab = vocab();
        let extractor = SymptomExtractor::new(&vocab);
        let symptoms = extractor.extract(&normalize("fever, nausea, body pain"));

        assert_eq!(
            symptoms.terms().collect::<Vec<_>>(),
            vec!["fever", "nausea", "body pain"]
        );
        // "body" and "pain" both land on "body pain"; the first token is kept
        let body = symptoms.iter().find(|m| m.term == "body pain").unwrap();
        assert_eq!(body.token, "body");
        assert_eq!(body.position, 2);
    }

    #[test]
    fn test_extract_nothing() {
        let vocab = vocab();
        let extractor = SymptomExtractor::new(&vocab);
        assert!(extractor.extract(&normalize("xyzzy plugh")).is_empty());
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("   ").is_empty());
    }

    #[test]
    fn test_threshold_controls_acceptance() {
        let vocab = vocab();
        // "nausia" vs "nausea" scores 83
        assert_eq!(SymptomExtractor::new(&vocab).extract("nausia").len(), 1);
        assert!(SymptomExtractor::with_threshold(&vocab, 90)
            .extract("nausia")
            .is_empty());
    }

    #[test]
    fn test_extract_common_misspellings() {
        let vocab = Vocabulary::new(["vomiting", "diarrhoea", "nausea"]).unwrap();
        let symptoms = SymptomExtractor::new(&vocab).extract("vomitting diarrhea nasuea");

        assert_eq!(
            symptoms.terms().collect::<Vec<_>>(),
            vec!["vomiting", "diarrhoea", "nausea"]
        );
        let scores: Vec<_> = symptoms.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![88, 88, 83]);
    }

    #[test]
    fn test_tie_prefers_earliest_term() {
        let vocab = Vocabulary::new(["joint pain", "stomach pain"]).unwrap();
        let extractor = SymptomExtractor::new(&vocab);
        assert_eq!(extractor.best_match("pain"), Some((0, 100)));
    }

    #[test]
    fn test_every_match_is_in_vocabulary() {
        let vocab = vocab();
        let extractor = SymptomExtractor::new(&vocab);
        let symptoms = extractor.extract(&normalize("I have a headache and a bad cough, fever too"));
        for m in &symptoms {
            assert_eq!(vocab.get(m.position), Some(m.term.as_str()));
            assert!(m.score >= extractor.threshold());
        }
        assert!(symptoms.contains("headache"));
        assert!(symptoms.contains("cough"));
    }
}
