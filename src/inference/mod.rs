//! Inference Layer for Vaidya
//!
//! Turns free text into a predicted condition:
//!
//! ```text
//! raw text ─→ tokenizer::normalize ─→ SymptomExtractor ─→ ExtractedSymptoms
//!                                                              │
//!                                        features::encode ◀────┘
//!                                              │
//!                                              ▼
//!                                 DiseaseClassifier + LabelDecoder
//!                                              │
//!                                              ▼
//!                                        predicted label
//! ```
//!
//! [`DiagnosisPipeline`] wires these stages to the remedy resolver and owns
//! the branching between single- and multi-symptom requests.

pub mod centroid;
pub mod classifier;
pub mod extractor;
pub mod features;
pub mod pipeline;
pub mod similarity;
pub mod tokenizer;

pub use centroid::{ArtifactError, CentroidClassifier, ModelArtifact};
pub use classifier::{
    predict_label, ClassCode, ClassifierError, DiseaseClassifier, LabelDecoder, LabelEncoder,
};
pub use extractor::{ExtractedSymptoms, SymptomExtractor, SymptomMatch, DEFAULT_SYMPTOM_THRESHOLD};
pub use features::{encode, FeatureVector};
pub use pipeline::{
    Diagnosis, DiagnosisContext, DiagnosisError, DiagnosisPipeline, DiagnosisResult,
    DiagnosisWarning, PipelineConfig, Route, Stage,
};
pub use similarity::{partial_ratio, Score, MAX_SCORE};
pub use tokenizer::normalize;
