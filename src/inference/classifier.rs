//! Disease Classifier Contract
//!
//! The trained predictor is an external collaborator. The pipeline only
//! relies on two capabilities:
//!
//! - [`DiseaseClassifier::predict`]: feature vector → numeric class code
//! - [`LabelDecoder::decode`]: class code → human-readable label
//!
//! Predictions must be deterministic for a fixed vector, and the vector
//! length must equal the vocabulary length used at training time.
//! [`CentroidClassifier`](super::centroid::CentroidClassifier) is the
//! implementation shipped with this crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use super::features::FeatureVector;

/// Numeric class code produced by a classifier
pub type ClassCode = usize;

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Feature vector length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Class code {0} has no label")]
    UnknownCode(ClassCode),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

/// Trained multi-class predictor
pub trait DiseaseClassifier: Send + Sync {
    /// Predict a class code for a feature vector
    fn predict(&self, features: &FeatureVector) -> Result<ClassCode, ClassifierError>;

    /// Feature vector length the model was trained on
    fn num_features(&self) -> usize;

    /// Short description for diagnostics
    fn model_info(&self) -> String;
}

/// Inverse label mapping supplied with the classifier
pub trait LabelDecoder: Send + Sync {
    /// Decode a class code into its label
    fn decode(&self, code: ClassCode) -> Option<&str>;

    /// Number of known labels
    fn num_classes(&self) -> usize;
}

/// Sorted, de-duplicated label set; code `i` is the `i`-th label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder on raw labels
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Use an already-sorted class list as-is
    pub fn from_classes(classes: Vec<String>) -> Result<Self, ClassifierError> {
        if classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ClassifierError::InvalidModel(
                "classes must be sorted and unique".into(),
            ));
        }
        Ok(Self { classes })
    }

    /// Code of a label
    pub fn encode(&self, label: &str) -> Option<ClassCode> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl LabelDecoder for LabelEncoder {
    fn decode(&self, code: ClassCode) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    fn num_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Predict and decode in one step
pub fn predict_label(
    classifier: &dyn DiseaseClassifier,
    decoder: &dyn LabelDecoder,
    features: &FeatureVector,
) -> Result<String, ClassifierError> {
    let code = classifier.predict(features)?;
    decoder
        .decode(code)
        .map(str::to_string)
        .ok_or(ClassifierError::UnknownCode(code))
}
