//! Symptom Vocabulary
//!
//! The fixed, ordered list of symptom terms the classifier was trained on.
//! Position `i` in the vocabulary is position `i` in every feature vector,
//! so the order must match the one used at training time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Vocabulary errors
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("Vocabulary is empty")]
    Empty,
    #[error("Duplicate vocabulary term '{term}' at positions {first} and {second}")]
    Duplicate {
        term: String,
        first: usize,
        second: usize,
    },
}

/// Ordered, immutable set of recognized symptom terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from terms that are already in matching form.
    pub fn new<I, S>(terms: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut positions = HashMap::with_capacity(terms.len());
        for (i, term) in terms.iter().enumerate() {
            if let Some(&first) = positions.get(term) {
                return Err(VocabularyError::Duplicate {
                    term: term.clone(),
                    first,
                    second: i,
                });
            }
            positions.insert(term.clone(), i);
        }

        Ok(Self { terms, positions })
    }

    /// Build a vocabulary from raw training column names.
    ///
    /// Column names such as `"Body_Pain"` become `"body pain"`.
    pub fn from_feature_names<I, S>(names: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| feature_name_to_term(name.as_ref())),
        )
    }

    /// Number of terms (and feature vector length)
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Term at a feature position
    pub fn get(&self, position: usize) -> Option<&str> {
        self.terms.get(position).map(String::as_str)
    }

    /// Feature position of a term
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.positions.contains_key(term)
    }

    /// Terms in feature order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = VocabularyError;

    fn try_from(terms: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

/// Convert a training column name into its matching form
pub fn feature_name_to_term(name: &str) -> String {
    name.trim().replace('_', " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_order() {
        let vocab = Vocabulary::new(["fever", "nausea", "body pain"]).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.position("nausea"), Some(1));
        assert_eq!(vocab.get(2), Some("body pain"));
        assert!(vocab.contains("fever"));
        assert!(!vocab.contains("cough"));
    }

    #[test]
    fn test_from_feature_names() {
        let vocab = Vocabulary::from_feature_names(["High_Fever", "nausea", "Body_Pain "]).unwrap();
        assert_eq!(
            vocab.iter().collect::<Vec<_>>(),
            vec!["high fever", "nausea", "body pain"]
        );
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            Vocabulary::new(Vec::<String>::new()),
            Err(VocabularyError::Empty)
        ));
        match Vocabulary::from_feature_names(["itching", "Itching"]) {
            Err(VocabularyError::Duplicate { first, second, .. }) => {
                assert_eq!((first, second), (0, 1));
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_serde_as_plain_array() {
        let vocab = Vocabulary::new(["fever", "cough"]).unwrap();
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["fever","cough"]"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position("cough"), Some(1));
    }
}
