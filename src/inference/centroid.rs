//! Nearest-Centroid Disease Classifier
//!
//! Each class is represented by the L2-normalized mean of its training
//! vectors. Prediction is a dot product against every centroid, the same
//! scan the intent index does over pre-normalized embeddings.
//!
//! # Artifact format
//!
//! ```json
//! {
//!   "features":  ["itching", "skin rash", ...],
//!   "classes":   ["Acne", "Allergy", ...],
//!   "centroids": [[0.0, 0.41, ...], ...]
//! }
//! ```
//!
//! `features` is the vocabulary, `classes` is the label decoder, and
//! `centroids[i]` belongs to `classes[i]`.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use super::classifier::{ClassCode, ClassifierError, DiseaseClassifier, LabelEncoder};
use super::features::FeatureVector;
use crate::vocabulary::{Vocabulary, VocabularyError};

/// Artifact loading errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("Invalid classifier: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Serialized model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub centroids: Vec<Vec<f32>>,
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Split the bundle into vocabulary, classifier and label decoder
    pub fn into_parts(
        self,
    ) -> Result<(Vocabulary, CentroidClassifier, LabelEncoder), ArtifactError> {
        let vocabulary = Vocabulary::new(self.features)?;
        let labels = LabelEncoder::from_classes(self.classes)?;
        let classifier = CentroidClassifier::new(vocabulary.len(), self.centroids)?;
        if classifier.num_classes() != labels.classes().len() {
            return Err(ClassifierError::InvalidModel(format!(
                "{} centroids for {} classes",
                classifier.num_classes(),
                labels.classes().len()
            ))
            .into());
        }
        Ok((vocabulary, classifier, labels))
    }
}

/// Nearest-centroid classifier over binary symptom vectors
#[derive(Debug, Clone)]
pub struct CentroidClassifier {
    /// Flat `[num_classes][dim]` matrix of normalized centroids
    centroids: Vec<f32>,
    dim: usize,
    num_classes: usize,
}

impl CentroidClassifier {
    /// Build from per-class centroids; each is L2-normalized on the way in.
    pub fn new(dim: usize, centroids: Vec<Vec<f32>>) -> Result<Self, ClassifierError> {
        if centroids.is_empty() || dim == 0 {
            return Err(ClassifierError::InvalidModel("no centroids".into()));
        }

        let num_classes = centroids.len();
        let mut flat = Vec::with_capacity(num_classes * dim);
        for (code, centroid) in centroids.iter().enumerate() {
            if centroid.len() != dim {
                return Err(ClassifierError::InvalidModel(format!(
                    "centroid {} has {} values, expected {}",
                    code,
                    centroid.len(),
                    dim
                )));
            }
            let norm = l2_norm(centroid);
            if norm > 1e-8 {
                flat.extend(centroid.iter().map(|v| v / norm));
            } else {
                flat.extend_from_slice(centroid);
            }
        }

        Ok(Self {
            centroids: flat,
            dim,
            num_classes,
        })
    }

    /// Fit centroids as the per-class mean of training rows
    pub fn fit(
        dim: usize,
        rows: &[(Vec<u8>, ClassCode)],
        num_classes: usize,
    ) -> Result<Self, ClassifierError> {
        let mut sums = vec![vec![0.0f32; dim]; num_classes];
        let mut counts = vec![0usize; num_classes];

        for (row, code) in rows {
            if row.len() != dim {
                return Err(ClassifierError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            let sum = sums
                .get_mut(*code)
                .ok_or(ClassifierError::UnknownCode(*code))?;
            for (acc, &v) in sum.iter_mut().zip(row) {
                *acc += f32::from(v);
            }
            counts[*code] += 1;
        }

        for (sum, &count) in sums.iter_mut().zip(&counts) {
            if count > 0 {
                for v in sum.iter_mut() {
                    *v /= count as f32;
                }
            }
        }

        Self::new(dim, sums)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Normalized centroid of a class
    pub fn centroid(&self, code: ClassCode) -> Option<&[f32]> {
        if code >= self.num_classes {
            return None;
        }
        let offset = code * self.dim;
        Some(&self.centroids[offset..offset + self.dim])
    }

    /// Cosine score of every class, in class-code order
    pub fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>, ClassifierError> {
        if features.len() != self.dim {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.dim,
                actual: features.len(),
            });
        }

        let mut query = features.to_f32();
        let norm = l2_norm(&query);
        if norm > 1e-8 {
            for v in query.iter_mut() {
                *v /= norm;
            }
        }

        Ok(self
            .centroids
            .chunks_exact(self.dim)
            .map(|centroid| dot_product(&query, centroid))
            .collect())
    }

    /// Export the normalized centroids as an artifact
    pub fn to_artifact(&self, vocabulary: &Vocabulary, labels: &LabelEncoder) -> ModelArtifact {
        ModelArtifact {
            features: vocabulary.terms().to_vec(),
            classes: labels.classes().to_vec(),
            centroids: self
                .centroids
                .chunks_exact(self.dim)
                .map(<[f32]>::to_vec)
                .collect(),
        }
    }
}

impl DiseaseClassifier for CentroidClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<ClassCode, ClassifierError> {
        let scores = self.scores(features)?;

        // strict comparison keeps the lowest code on ties
        let mut best_code = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (code, &score) in scores.iter().enumerate() {
            if score > best_score {
                best_score = score;
                best_code = code;
            }
        }
        Ok(best_code)
    }

    fn num_features(&self) -> usize {
        self.dim
    }

    fn model_info(&self) -> String {
        format!(
            "nearest-centroid ({} classes × {} features)",
            self.num_classes, self.dim
        )
    }
}

#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
