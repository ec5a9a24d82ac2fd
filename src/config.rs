//! Vaidya Project Configuration
//!
//! Handles parsing and management of vaidya.toml configuration files.
//! Relative paths in the file are resolved against the directory the file
//! was loaded from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::inference::{PipelineConfig, Score, DEFAULT_SYMPTOM_THRESHOLD, MAX_SCORE};
use crate::remedy::{
    RemedyColumns, SelectionPolicy, DEFAULT_CONDITION_COLUMN, DEFAULT_REMEDY_THRESHOLD,
    DEFAULT_TREATMENT_COLUMN,
};
use crate::train::{TrainConfig, DEFAULT_TARGET_COLUMN};

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = "vaidya.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching vaidya.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VaidyaConfig {
    /// Model and remedy table locations
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Remedy table column names
    #[serde(default)]
    pub remedies: RemediesConfig,

    /// Fuzzy matching thresholds and selection
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Offline training settings
    #[serde(default)]
    pub training: TrainingConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory the config was loaded from
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl VaidyaConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: VaidyaConfig = toml::from_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("symptom_threshold", self.matching.symptom_threshold),
            ("remedy_threshold", self.matching.remedy_threshold),
        ] {
            if value > MAX_SCORE {
                return Err(ConfigError::Invalid(format!(
                    "matching.{} must be at most {}, got {}",
                    name, MAX_SCORE, value
                )));
            }
        }
        if self.matching.selection == SelectionMode::TopK && self.matching.top_k == 0 {
            return Err(ConfigError::Invalid(
                "matching.top_k must be at least 1".to_string(),
            ));
        }
        let fraction = self.training.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "training.test_fraction must be between 0 and 1, got {}",
                fraction
            )));
        }
        Ok(())
    }

    /// Resolve a configured path against the config file's directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(&self.artifacts.model)
    }

    pub fn remedies_path(&self) -> PathBuf {
        self.resolve(&self.artifacts.remedies)
    }

    pub fn remedy_columns(&self) -> RemedyColumns {
        RemedyColumns {
            condition: self.remedies.condition_column.clone(),
            treatment: self.remedies.treatment_column.clone(),
        }
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        match self.matching.selection {
            SelectionMode::First => SelectionPolicy::First,
            SelectionMode::TopK => SelectionPolicy::TopK(self.matching.top_k),
            SelectionMode::All => SelectionPolicy::All,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            symptom_threshold: self.matching.symptom_threshold,
            remedy_threshold: self.matching.remedy_threshold,
            selection: self.selection_policy(),
        }
    }

    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            data_path: self.resolve(&self.training.data),
            output_path: self.model_path(),
            target_column: self.training.target_column.clone(),
            test_fraction: self.training.test_fraction,
            seed: self.training.seed,
        }
    }
}

/// Artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Model bundle (vocabulary, centroids, labels)
    #[serde(default = "default_model_path")]
    pub model: String,

    /// Remedy CSV
    #[serde(default = "default_remedies_path")]
    pub remedies: String,
}

fn default_model_path() -> String {
    "model/model.json".to_string()
}

fn default_remedies_path() -> String {
    "data/ayurvedic_treatment.csv".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model: default_model_path(),
            remedies: default_remedies_path(),
        }
    }
}

/// Remedy table headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediesConfig {
    #[serde(default = "default_condition_column")]
    pub condition_column: String,

    #[serde(default = "default_treatment_column")]
    pub treatment_column: String,
}

fn default_condition_column() -> String {
    DEFAULT_CONDITION_COLUMN.to_string()
}

fn default_treatment_column() -> String {
    DEFAULT_TREATMENT_COLUMN.to_string()
}

impl Default for RemediesConfig {
    fn default() -> Self {
        Self {
            condition_column: default_condition_column(),
            treatment_column: default_treatment_column(),
        }
    }
}

/// How many remedy candidates to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    #[default]
    First,
    TopK,
    All,
}

/// Matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum token → symptom score (0-100)
    #[serde(default = "default_symptom_threshold")]
    pub symptom_threshold: Score,

    /// Minimum query → condition key score (0-100)
    #[serde(default = "default_remedy_threshold")]
    pub remedy_threshold: Score,

    #[serde(default)]
    pub selection: SelectionMode,

    /// Limit for `selection = "top-k"`
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_symptom_threshold() -> Score {
    DEFAULT_SYMPTOM_THRESHOLD
}

fn default_remedy_threshold() -> Score {
    DEFAULT_REMEDY_THRESHOLD
}

fn default_top_k() -> usize {
    3
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            symptom_threshold: default_symptom_threshold(),
            remedy_threshold: default_remedy_threshold(),
            selection: SelectionMode::First,
            top_k: default_top_k(),
        }
    }
}

/// Training settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// One-hot training CSV
    #[serde(default = "default_training_data")]
    pub data: String,

    #[serde(default = "default_target_column")]
    pub target_column: String,

    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_training_data() -> String {
    "data/Training.csv".to_string()
}

fn default_target_column() -> String {
    DEFAULT_TARGET_COLUMN.to_string()
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data: default_training_data(),
            target_column: default_target_column(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
