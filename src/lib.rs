//! Vaidya - Symptom-to-Remedy Recommendation Engine
//!
//! Turns a free-text description of symptoms into a predicted condition and
//! a traditional (Ayurvedic) remedy suggestion. Suggestions are informational
//! only; see [`DISCLAIMER`].
//!
//! # Features
//!
//! - **Fuzzy symptom extraction**: token-level partial matching against a fixed vocabulary
//! - **Pluggable classifier**: any `DiseaseClassifier + LabelDecoder` pair; a nearest-centroid model ships in-crate
//! - **Fuzzy remedy lookup**: ranked partial matching over condition keys with a selectable policy
//! - **Offline training**: one-hot CSV → stratified split → JSON model artifact
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vaidya::{DiagnosisContext, DiagnosisPipeline, ModelArtifact, RemedyRecord, RemedyTable, Route};
//!
//! let artifact = ModelArtifact {
//!     features: vec!["fever".into(), "chills".into(), "sneezing".into()],
//!     classes: vec!["Allergy".into(), "Malaria".into()],
//!     centroids: vec![vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]],
//! };
//! let remedies = RemedyTable::from_records([RemedyRecord::new("Malaria", "Giloy juice")]);
//! let context = DiagnosisContext::from_artifact(artifact, remedies).unwrap();
//!
//! let pipeline = DiagnosisPipeline::new(Arc::new(context));
//! let diagnosis = pipeline.diagnose("fever with chills").unwrap();
//!
//! assert_eq!(diagnosis.route, Route::Classified);
//! assert_eq!(diagnosis.predicted_label.as_deref(), Some("Malaria"));
//! assert_eq!(diagnosis.remedies[0].treatment, "Giloy juice");
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Free text     │  "fever, chills and body pain"
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Normalize +     │  lowercase, letters only, fuzzy match per token
//! │ Extract         │
//! └────────┬────────┘
//!          │
//!     ┌────┴──────────────┐
//!     ▼ 1 symptom         ▼ 2+ symptoms
//! ┌────────┐        ┌───────────────┐
//! │ Remedy │        │ Encode +      │  binary vector → class code → label
//! │ lookup │        │ Classify      │
//! └────────┘        └───────┬───────┘
//!                           ▼
//!                   ┌───────────────┐
//!                   │ Remedy lookup │  label first, then each symptom
//!                   └───────────────┘
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod inference;
pub mod remedy;
pub mod train;
pub mod vocabulary;

use std::path::PathBuf;
use thiserror::Error;

// Re-export commonly used types
pub use config::{ConfigError, VaidyaConfig};
pub use inference::{
    ArtifactError, CentroidClassifier, ClassifierError, Diagnosis, DiagnosisContext,
    DiagnosisError, DiagnosisPipeline, DiagnosisWarning, DiseaseClassifier, ExtractedSymptoms,
    FeatureVector, LabelDecoder, LabelEncoder, ModelArtifact, PipelineConfig, Route, Stage,
    SymptomExtractor,
};
pub use remedy::{
    MatchCandidate, RemedyRecord, RemedyResolver, RemedyTable, RemedyTableError, Resolution,
    SelectionPolicy,
};
pub use train::{TrainConfig, TrainError, TrainReport};
pub use vocabulary::{Vocabulary, VocabularyError};

/// Shown after every result
pub const DISCLAIMER: &str = "Disclaimer: These suggestions are based on traditional \
    Ayurvedic knowledge and are not a medical diagnosis. Always consult a certified \
    Ayurvedic or medical professional before starting any treatment.";

/// Error type for loading artifacts from a config
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },
    #[error("Failed to load remedy table {path}: {source}")]
    Remedies {
        path: PathBuf,
        #[source]
        source: RemedyTableError,
    },
}

/// Load the model and remedy table named by a config
pub fn load_context(config: &VaidyaConfig) -> Result<DiagnosisContext, LoadError> {
    let model_path = config.model_path();
    let artifact = ModelArtifact::load(&model_path).map_err(|source| LoadError::Model {
        path: model_path.clone(),
        source,
    })?;

    let remedies_path = config.remedies_path();
    let remedies = RemedyTable::load_with_columns(&remedies_path, &config.remedy_columns())
        .map_err(|source| LoadError::Remedies {
            path: remedies_path,
            source,
        })?;

    DiagnosisContext::from_artifact(artifact, remedies).map_err(|source| LoadError::Model {
        path: model_path,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_context_reports_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(config::CONFIG_FILE_NAME);
        std::fs::write(&config_path, "").unwrap();
        let config = VaidyaConfig::load(&config_path).unwrap();

        let err = load_context(&config).unwrap_err();
        assert!(matches!(err, LoadError::Model { ref path, .. } if path.ends_with("model/model.json")));
    }

    #[test]
    fn test_load_context_from_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(config::CONFIG_FILE_NAME), "").unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join("data/ayurvedic_treatment.csv"),
            "Disease,Treatment\nMalaria,Giloy juice\n",
        )
        .unwrap();
        ModelArtifact {
            features: vec!["fever".into(), "chills".into()],
            classes: vec!["Malaria".into()],
            centroids: vec![vec![1.0, 1.0]],
        }
        .save(dir.path().join("model/model.json"))
        .unwrap();

        let config = VaidyaConfig::find_and_load(dir.path()).unwrap();
        let context = load_context(&config).unwrap();
        assert_eq!(context.vocabulary().len(), 2);
        assert_eq!(context.remedies().len(), 1);
    }
}
