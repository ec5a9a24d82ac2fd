//! Vaidya Training Loop
//!
//! Label encoding, a seeded stratified split, centroid fitting and held-out
//! evaluation. The same seed and data always produce the same artifact.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::dataset::{SymptomDataset, DEFAULT_TARGET_COLUMN};
use super::TrainError;
use crate::inference::{
    CentroidClassifier, ClassCode, DiseaseClassifier, FeatureVector, LabelEncoder, ModelArtifact,
};

/// Configuration for a training run
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Path to the one-hot training CSV
    pub data_path: PathBuf,
    /// Where to write the model artifact
    pub output_path: PathBuf,
    /// Label column
    pub target_column: String,
    /// Share of each class held out for evaluation
    pub test_fraction: f64,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/Training.csv"),
            output_path: PathBuf::from("model/model.json"),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Row indices of a train/test split
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Evaluation summary of a training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub num_features: usize,
    pub num_classes: usize,
    /// Held-out accuracy (0.0 when nothing was held out)
    pub accuracy: f64,
    /// Held-out macro-averaged F1
    pub macro_f1: f64,
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Samples:   {} ({} train / {} test)",
            self.samples, self.train_samples, self.test_samples
        )?;
        writeln!(f, "Features:  {}", self.num_features)?;
        writeln!(f, "Classes:   {}", self.num_classes)?;
        writeln!(f, "Accuracy:  {:.4}", self.accuracy)?;
        write!(f, "Macro F1:  {:.4}", self.macro_f1)
    }
}

/// Fitted artifact and its report
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub artifact: ModelArtifact,
    pub report: TrainReport,
}

/// Per-class shuffle-and-hold-out split
///
/// Each class holds out `round(n * test_fraction)` rows but always keeps at
/// least one for training. Classes are visited in code order with a single
/// seeded generator, and both halves come back sorted.
pub fn stratified_split(
    codes: &[ClassCode],
    num_classes: usize,
    test_fraction: f64,
    seed: u64,
) -> Split {
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); num_classes];
    for (row, &code) in codes.iter().enumerate() {
        if let Some(rows) = by_class.get_mut(code) {
            rows.push(row);
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut split = Split::default();
    for mut rows in by_class {
        if rows.is_empty() {
            continue;
        }
        rows.shuffle(&mut rng);
        let n = rows.len();
        let held = ((n as f64 * test_fraction).round() as usize).min(n - 1);
        split.test.extend_from_slice(&rows[..held]);
        split.train.extend_from_slice(&rows[held..]);
    }

    split.train.sort_unstable();
    split.test.sort_unstable();
    split
}

/// Share of predictions equal to the truth
pub fn accuracy(truth: &[ClassCode], predicted: &[ClassCode]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// Unweighted mean of per-class F1 over every class seen in either slice
pub fn macro_f1(truth: &[ClassCode], predicted: &[ClassCode], num_classes: usize) -> f64 {
    let mut tp = vec![0usize; num_classes];
    let mut fp = vec![0usize; num_classes];
    let mut fn_ = vec![0usize; num_classes];
    let mut seen = vec![false; num_classes];

    for (&t, &p) in truth.iter().zip(predicted) {
        if t >= num_classes || p >= num_classes {
            continue;
        }
        seen[t] = true;
        seen[p] = true;
        if t == p {
            tp[t] += 1;
        } else {
            fp[p] += 1;
            fn_[t] += 1;
        }
    }

    let scores: Vec<f64> = (0..num_classes)
        .filter(|&c| seen[c])
        .map(|c| {
            let denom = 2 * tp[c] + fp[c] + fn_[c];
            if denom == 0 {
                0.0
            } else {
                (2 * tp[c]) as f64 / denom as f64
            }
        })
        .collect();

    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Fit a centroid model on a dataset and evaluate it on a held-out split
pub fn fit(
    dataset: &SymptomDataset,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainedModel, TrainError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainError::InvalidTestFraction(test_fraction));
    }
    if dataset.is_empty() {
        return Err(TrainError::NotEnoughData("no usable rows".into()));
    }

    let vocabulary = dataset.vocabulary()?;
    let labels = LabelEncoder::fit(dataset.labels());
    let codes: Vec<ClassCode> = dataset
        .labels()
        .map(|label| {
            labels
                .encode(label)
                .ok_or_else(|| TrainError::NotEnoughData(format!("unencoded label '{label}'")))
        })
        .collect::<Result<_, _>>()?;

    let split = stratified_split(&codes, labels.classes().len(), test_fraction, seed);
    tracing::info!(
        train = split.train.len(),
        test = split.test.len(),
        classes = labels.classes().len(),
        "stratified split"
    );

    let samples = dataset.samples();
    let rows: Vec<(Vec<u8>, ClassCode)> = split
        .train
        .iter()
        .map(|&i| (samples[i].features.clone(), codes[i]))
        .collect();
    let classifier = CentroidClassifier::fit(vocabulary.len(), &rows, labels.classes().len())?;

    let mut truth = Vec::with_capacity(split.test.len());
    let mut predicted = Vec::with_capacity(split.test.len());
    for &i in &split.test {
        let features = FeatureVector::from(samples[i].features.clone());
        truth.push(codes[i]);
        predicted.push(classifier.predict(&features)?);
    }
    if truth.is_empty() {
        tracing::warn!("no rows held out; evaluation metrics are zero");
    }

    let report = TrainReport {
        samples: dataset.len(),
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        num_features: vocabulary.len(),
        num_classes: labels.classes().len(),
        accuracy: accuracy(&truth, &predicted),
        macro_f1: macro_f1(&truth, &predicted, labels.classes().len()),
    };
    tracing::info!(accuracy = report.accuracy, macro_f1 = report.macro_f1, "model evaluated");

    Ok(TrainedModel {
        artifact: classifier.to_artifact(&vocabulary, &labels),
        report,
    })
}

/// Load data, fit, and write the artifact
pub fn train(config: &TrainConfig) -> Result<TrainReport, TrainError> {
    let dataset = SymptomDataset::load(&config.data_path, &config.target_column)?;
    let model = fit(&dataset, config.test_fraction, config.seed)?;
    model.artifact.save(&config.output_path)?;
    tracing::info!(path = %config.output_path.display(), "model saved");
    Ok(model.report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
fever,chills,sneezing,itching,prognosis
1,1,0,0,Malaria
1,1,0,0,Malaria
1,0,0,0,Malaria
1,1,0,0,Malaria
1,1,0,0,Malaria
0,0,1,1,Allergy
0,0,1,1,Allergy
0,0,1,0,Allergy
0,0,1,1,Allergy
0,0,0,1,Allergy
";

    fn dataset() -> SymptomDataset {
        SymptomDataset::from_reader(CSV.as_bytes(), DEFAULT_TARGET_COLUMN).unwrap()
    }

    #[test]
    fn test_split_is_stratified_and_deterministic() {
        let codes = vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2];
        let a = stratified_split(&codes, 3, 0.2, 42);
        let b = stratified_split(&codes, 3, 0.2, 42);
        assert_eq!(a, b);

        // one held out from each 5-row class, none from the singleton
        assert_eq!(a.test.len(), 2);
        assert_eq!(a.train.len(), 9);
        assert!(a.train.contains(&10));
        assert_eq!(a.test.iter().filter(|&&i| codes[i] == 0).count(), 1);
        assert_eq!(a.test.iter().filter(|&&i| codes[i] == 1).count(), 1);

        let mut all: Vec<usize> = a.train.iter().chain(&a.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..codes.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_keeps_one_training_row() {
        let codes = vec![0, 0];
        let split = stratified_split(&codes, 1, 0.9, 7);
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn test_metrics() {
        let truth = vec![0, 0, 1, 1];
        assert_eq!(accuracy(&truth, &truth), 1.0);
        assert_eq!(macro_f1(&truth, &truth, 2), 1.0);

        let predicted = vec![0, 1, 1, 1];
        assert_eq!(accuracy(&truth, &predicted), 0.75);
        // class 0: 2/(2+0+1) = 0.667, class 1: 4/(4+1+0) = 0.8
        let f1 = macro_f1(&truth, &predicted, 2);
        assert!((f1 - (2.0 / 3.0 + 0.8) / 2.0).abs() < 1e-9);

        assert_eq!(accuracy(&[], &[]), 0.0);
        assert_eq!(macro_f1(&[], &[], 2), 0.0);
    }

    #[test]
    fn test_fit_separable_data() {
        let model = fit(&dataset(), 0.2, 42).unwrap();
        let report = &model.report;
        assert_eq!(report.samples, 10);
        assert_eq!(report.test_samples, 2);
        assert_eq!(report.num_classes, 2);
        assert_eq!(report.num_features, 4);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(model.artifact.classes, vec!["Allergy", "Malaria"]);
        assert_eq!(
            model.artifact.features,
            vec!["fever", "chills", "sneezing", "itching"]
        );
    }

    #[test]
    fn test_fit_rejects_bad_fraction() {
        for fraction in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                fit(&dataset(), fraction, 42),
                Err(TrainError::InvalidTestFraction(_))
            ));
        }
    }
}
