//! Feature Encoder
//!
//! Turns an extracted symptom set into the binary indicator vector the
//! classifier expects, one slot per vocabulary term in vocabulary order.

use serde::Serialize;

use super::extractor::ExtractedSymptoms;
use crate::vocabulary::Vocabulary;

/// Binary indicator vector over vocabulary positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    /// All-zero vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    /// Vector with ones at the given positions; out-of-range positions are ignored
    pub fn from_positions(len: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut values = vec![0; len];
        for position in positions {
            if let Some(slot) = values.get_mut(position) {
                *slot = 1;
            }
        }
        Self(values)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of set positions
    pub fn ones(&self) -> usize {
        self.0.iter().filter(|&&v| v == 1).count()
    }

    /// Set positions in ascending order
    pub fn active_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 1)
            .map(|(i, _)| i)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Values as `f32`, for similarity arithmetic
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| f32::from(v)).collect()
    }
}

/// Takes 0/1 indicator values as they are
impl From<Vec<u8>> for FeatureVector {
    fn from(values: Vec<u8>) -> Self {
        Self(values)
    }
}

/// Encode extracted symptoms against the vocabulary
pub fn encode(symptoms: &ExtractedSymptoms, vocabulary: &Vocabulary) -> FeatureVector {
    FeatureVector::from_positions(vocabulary.len(), symptoms.positions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::extractor::SymptomExtractor;

    fn vocab() -> Vocabulary {
        Vocabulary::new(["itching", "fever", "nausea", "body pain", "cough"]).unwrap()
    }

    #[test]
    fn test_encode_positions() {
        let vocab = vocab();
        let symptoms = SymptomExtractor::new(&vocab).extract("cough fever");
        let vector = encode(&symptoms, &vocab);

        assert_eq!(vector.as_slice(), &[0, 1, 0, 0, 1]);
        assert_eq!(vector.active_positions().collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn test_encode_empty_set() {
        let vocab = vocab();
        let vector = encode(&ExtractedSymptoms::default(), &vocab);
        assert_eq!(vector, FeatureVector::zeros(vocab.len()));
        assert_eq!(vector.ones(), 0);
    }

    #[test]
    fn test_length_and_ones_match_symptoms() {
        let vocab = vocab();
        let extractor = SymptomExtractor::new(&vocab);
        for text in ["fever", "fever nausea", "itching cough body pain fever", "nothing here"] {
            let symptoms = extractor.extract(text);
            let vector = encode(&symptoms, &vocab);
            assert_eq!(vector.len(), vocab.len());
            assert_eq!(vector.ones(), symptoms.len());
        }
    }

    #[test]
    fn test_from_indicator_values() {
        let vector = FeatureVector::from(vec![0, 1, 1, 0]);
        assert_eq!(vector, FeatureVector::from_positions(4, [1, 2]));
        assert_eq!(vector.active_positions().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_from_positions_ignores_out_of_range() {
        let vector = FeatureVector::from_positions(3, [0, 7, 2, 2]);
        assert_eq!(vector.as_slice(), &[1, 0, 1]);
    }
}
