//! Offline Training for Vaidya
//!
//! Builds the model artifact the diagnosis pipeline loads at startup.
//!
//! # Steps
//!
//! ```text
//! Training.csv ─→ SymptomDataset ─→ LabelEncoder (sorted classes)
//!                       │
//!                       ▼
//!             stratified_split (seeded)
//!               │              │
//!             train          test
//!               │              │
//!               ▼              ▼
//!      CentroidClassifier ─→ evaluate ─→ TrainReport
//!               │
//!               ▼
//!        model/model.json
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vaidya::train::{train, TrainConfig};
//!
//! let report = train(&TrainConfig::default())?;
//! println!("{report}");
//! ```

pub mod dataset;
pub mod trainer;

use thiserror::Error;

use crate::inference::{ArtifactError, ClassifierError};
use crate::vocabulary::VocabularyError;

pub use dataset::{Sample, SymptomDataset, DEFAULT_TARGET_COLUMN};
pub use trainer::{
    accuracy, fit, macro_f1, stratified_split, train, Split, TrainConfig, TrainReport,
    TrainedModel,
};

/// Training errors
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse training data: {0}")]
    Csv(#[from] csv::Error),
    #[error("Training data has no '{0}' column")]
    MissingColumn(String),
    #[error("Line {line}, column '{column}': expected 0 or 1, got '{value}'")]
    InvalidCell {
        line: u64,
        column: String,
        value: String,
    },
    #[error("Not enough training data: {0}")]
    NotEnoughData(String),
    #[error("Invalid test fraction {0}; must be between 0 and 1")]
    InvalidTestFraction(f64),
    #[error("Invalid feature names: {0}")]
    Vocabulary(#[from] VocabularyError),
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("Failed to write model: {0}")]
    Artifact(#[from] ArtifactError),
}
