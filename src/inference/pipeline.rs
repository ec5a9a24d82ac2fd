//! Diagnosis Pipeline
//!
//! Ties the normalizer, extractor, feature encoder, classifier and remedy
//! resolver together.
//!
//! # Flow
//!
//! ```text
//! "fever, nausea, body pain"
//!       │
//!       ▼
//! ┌─────────────────────────────────┐
//! │  normalize + extract symptoms   │
//! └─────────────┬───────────────────┘
//!               │ |symptoms|
//!     ┌─────────┼──────────────────────────┐
//!     ▼ 0       ▼ 1                        ▼ ≥2
//!   Empty   SingleSymptom             MultiSymptom
//!   (error)  resolve(symptom)          encode → classify → resolve(label)
//!               │                          │
//!               │                          ├─ hit  → Done
//!               │                          └─ miss → resolve(each symptom)
//!               ▼                          ▼
//!          Done | NoMatch             Done | NoMatch
//! ```
//!
//! A lone symptom never reaches the classifier; several symptoms trust the
//! classifier first and fall back to per-symptom lookup only when the
//! predicted label has no remedy.
//!
//! All loaded artifacts live in an immutable [`DiagnosisContext`]. Pipelines
//! share it through an `Arc`, so differently-configured pipelines can run
//! side by side without locking.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::centroid::{ArtifactError, ModelArtifact};
use super::classifier::{predict_label, ClassifierError, DiseaseClassifier, LabelDecoder};
use super::extractor::{ExtractedSymptoms, SymptomExtractor, DEFAULT_SYMPTOM_THRESHOLD};
use super::features::{encode, FeatureVector};
use super::similarity::Score;
use super::tokenizer::{is_blank, normalize};
use crate::remedy::{
    RemedyResolver, RemedyTable, Resolution, SelectionPolicy, DEFAULT_REMEDY_THRESHOLD,
};
use crate::vocabulary::Vocabulary;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("Please enter your symptoms")]
    EmptyInput,
    #[error("No symptoms matched. Try using simpler or more descriptive terms")]
    NoSymptomsRecognized,
    #[error("Classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Result type for diagnosis operations
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing recognized; terminal
    Empty,
    /// No remedy resolved on the taken branch; terminal
    NoMatch,
    /// Exactly one symptom
    SingleSymptom,
    /// Two or more symptoms
    MultiSymptom,
    /// At least one remedy resolved; terminal
    Done,
}

impl Stage {
    /// Branch taken for a given symptom count
    pub fn for_symptom_count(count: usize) -> Self {
        match count {
            0 => Stage::Empty,
            1 => Stage::SingleSymptom,
            _ => Stage::MultiSymptom,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Empty | Stage::NoMatch | Stage::Done)
    }
}

/// How the reported remedies were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Direct lookup on the lone symptom
    SingleSymptom,
    /// Lookup on the classifier's label
    Classified,
    /// Per-symptom lookup after the label had no remedy
    SymptomFallback,
}

/// Caller-visible, non-fatal conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisWarning {
    /// One symptom is not enough for a prediction
    SingleSymptom,
    /// No remedy cleared the threshold on the taken branch
    NoRemedyFound,
}

impl fmt::Display for DiagnosisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosisWarning::SingleSymptom => write!(
                f,
                "Only one symptom detected. This is not enough for accurate disease prediction"
            ),
            DiagnosisWarning::NoRemedyFound => write!(f, "No remedy found"),
        }
    }
}

/// Outcome of one request
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    /// Recognized symptoms in extraction order
    pub symptoms: ExtractedSymptoms,
    pub route: Route,
    /// Terminal stage: `Done` or `NoMatch`
    pub stage: Stage,
    /// Classifier output (multi-symptom requests only)
    pub predicted_label: Option<String>,
    pub remedies: Vec<Resolution>,
    pub warnings: Vec<DiagnosisWarning>,
}

impl Diagnosis {
    fn finish(
        symptoms: ExtractedSymptoms,
        route: Route,
        predicted_label: Option<String>,
        remedies: Vec<Resolution>,
        mut warnings: Vec<DiagnosisWarning>,
    ) -> Self {
        let stage = if remedies.is_empty() {
            warnings.push(DiagnosisWarning::NoRemedyFound);
            Stage::NoMatch
        } else {
            Stage::Done
        };
        Self {
            symptoms,
            route,
            stage,
            predicted_label,
            remedies,
            warnings,
        }
    }

    pub fn has_remedy(&self) -> bool {
        !self.remedies.is_empty()
    }

    pub fn has_warning(&self, warning: DiagnosisWarning) -> bool {
        self.warnings.contains(&warning)
    }
}

/// Loaded, read-only artifacts
pub struct DiagnosisContext {
    vocabulary: Vocabulary,
    classifier: Box<dyn DiseaseClassifier>,
    labels: Box<dyn LabelDecoder>,
    remedies: RemedyTable,
}

impl DiagnosisContext {
    /// Assemble a context, checking the classifier matches the vocabulary
    pub fn new(
        vocabulary: Vocabulary,
        classifier: Box<dyn DiseaseClassifier>,
        labels: Box<dyn LabelDecoder>,
        remedies: RemedyTable,
    ) -> Result<Self, ClassifierError> {
        if classifier.num_features() != vocabulary.len() {
            return Err(ClassifierError::DimensionMismatch {
                expected: vocabulary.len(),
                actual: classifier.num_features(),
            });
        }
        Ok(Self {
            vocabulary,
            classifier,
            labels,
            remedies,
        })
    }

    /// Build from a model bundle and a remedy table
    pub fn from_artifact(
        artifact: ModelArtifact,
        remedies: RemedyTable,
    ) -> Result<Self, ArtifactError> {
        let (vocabulary, classifier, labels) = artifact.into_parts()?;
        tracing::info!(
            symptoms = vocabulary.len(),
            model = %classifier.model_info(),
            "model loaded"
        );
        Ok(Self::new(
            vocabulary,
            Box::new(classifier),
            Box::new(labels),
            remedies,
        )?)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn classifier(&self) -> &dyn DiseaseClassifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &dyn LabelDecoder {
        self.labels.as_ref()
    }

    pub fn remedies(&self) -> &RemedyTable {
        &self.remedies
    }
}

impl fmt::Debug for DiagnosisContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosisContext")
            .field("vocabulary", &self.vocabulary.len())
            .field("classifier", &self.classifier.model_info())
            .field("labels", &self.labels.num_classes())
            .field("remedies", &self.remedies.len())
            .finish()
    }
}

/// Per-pipeline tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub symptom_threshold: Score,
    pub remedy_threshold: Score,
    /// Applied on the single-symptom and classified branches
    pub selection: SelectionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symptom_threshold: DEFAULT_SYMPTOM_THRESHOLD,
            remedy_threshold: DEFAULT_REMEDY_THRESHOLD,
            selection: SelectionPolicy::First,
        }
    }
}

/// Symptom text → condition → remedy
#[derive(Debug, Clone)]
pub struct DiagnosisPipeline {
    context: Arc<DiagnosisContext>,
    config: PipelineConfig,
}

impl DiagnosisPipeline {
    pub fn new(context: Arc<DiagnosisContext>) -> Self {
        Self::with_config(context, PipelineConfig::default())
    }

    pub fn with_config(context: Arc<DiagnosisContext>, config: PipelineConfig) -> Self {
        Self { context, config }
    }

    /// Same context, different tuning
    pub fn reconfigured(&self, config: PipelineConfig) -> Self {
        Self::with_config(Arc::clone(&self.context), config)
    }

    pub fn context(&self) -> &DiagnosisContext {
        &self.context
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn extractor(&self) -> SymptomExtractor<'_> {
        SymptomExtractor::with_threshold(&self.context.vocabulary, self.config.symptom_threshold)
    }

    fn resolver(&self) -> RemedyResolver {
        RemedyResolver::with_threshold(self.config.remedy_threshold)
    }

    /// Normalize and extract symptoms without diagnosing
    pub fn extract(&self, text: &str) -> ExtractedSymptoms {
        self.extractor().extract(&normalize(text))
    }

    /// Feature vector for a symptom set
    pub fn encode(&self, symptoms: &ExtractedSymptoms) -> FeatureVector {
        encode(symptoms, &self.context.vocabulary)
    }

    /// Run the full decision procedure on free text
    pub fn diagnose(&self, text: &str) -> DiagnosisResult<Diagnosis> {
        if is_blank(text) {
            return Err(DiagnosisError::EmptyInput);
        }

        let symptoms = self.extract(text);
        match Stage::for_symptom_count(symptoms.len()) {
            Stage::SingleSymptom => Ok(self.single_symptom(symptoms)),
            Stage::MultiSymptom => self.multi_symptom(symptoms),
            _ => {
                tracing::info!("no symptoms recognized");
                Err(DiagnosisError::NoSymptomsRecognized)
            }
        }
    }

    fn single_symptom(&self, symptoms: ExtractedSymptoms) -> Diagnosis {
        let term = symptoms.first().map(|m| m.term.clone()).unwrap_or_default();
        tracing::info!(symptom = %term, "single symptom, skipping classifier");

        let remedies =
            self.resolver()
                .resolve(&term, &self.context.remedies, self.config.selection);

        Diagnosis::finish(
            symptoms,
            Route::SingleSymptom,
            None,
            remedies,
            vec![DiagnosisWarning::SingleSymptom],
        )
    }

    fn multi_symptom(&self, symptoms: ExtractedSymptoms) -> DiagnosisResult<Diagnosis> {
        let features = self.encode(&symptoms);
        let label = predict_label(
            self.context.classifier(),
            self.context.labels(),
            &features,
        )?;
        tracing::info!(symptoms = symptoms.len(), label = %label, "condition predicted");

        let resolver = self.resolver();
        let remedies = resolver.resolve(&label, &self.context.remedies, self.config.selection);
        if !remedies.is_empty() {
            return Ok(Diagnosis::finish(
                symptoms,
                Route::Classified,
                Some(label),
                remedies,
                Vec::new(),
            ));
        }

        tracing::warn!(label = %label, "predicted condition has no remedy, trying each symptom");
        let fallback: Vec<Resolution> = symptoms
            .terms()
            .filter_map(|term| resolver.resolve_first(term, &self.context.remedies))
            .collect();

        Ok(Diagnosis::finish(
            symptoms,
            Route::SymptomFallback,
            Some(label),
            fallback,
            Vec::new(),
        ))
    }
}
