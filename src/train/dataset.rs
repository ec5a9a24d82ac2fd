//! Symptom Dataset Loading
//!
//! Reads the one-hot training CSV: one 0/1 column per symptom plus a target
//! column holding the condition label.
//!
//! ```text
//! itching,skin_rash,...,prognosis,
//! 1,1,...,Fungal infection,
//! ```
//!
//! Index-like columns (`Unnamed: N` or an empty header from a trailing comma)
//! are ignored, and any row with a blank cell in a kept column is skipped.
//! Repeated headers get a `.1`, `.2`, ... suffix so every feature keeps its
//! own slot.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::TrainError;
use crate::vocabulary::Vocabulary;

/// Default name of the label column
pub const DEFAULT_TARGET_COLUMN: &str = "prognosis";

/// One training row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// 0/1 indicator per feature column
    pub features: Vec<u8>,
    pub label: String,
}

/// Parsed training table
#[derive(Debug, Clone)]
pub struct SymptomDataset {
    feature_names: Vec<String>,
    samples: Vec<Sample>,
    skipped_rows: usize,
}

impl SymptomDataset {
    /// Load from a CSV file
    pub fn load(path: impl AsRef<Path>, target_column: &str) -> Result<Self, TrainError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file, target_column)?;
        tracing::info!(
            path = %path.display(),
            samples = dataset.len(),
            features = dataset.feature_names.len(),
            skipped = dataset.skipped_rows,
            "training data loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader
    pub fn from_reader<R: Read>(reader: R, target_column: &str) -> Result<Self, TrainError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = mangle_duplicates(reader.headers()?.iter().map(str::trim));

        let kept: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_index_column(h))
            .map(|(i, _)| i)
            .collect();
        let target = kept
            .iter()
            .copied()
            .find(|&i| headers[i] == target_column)
            .ok_or_else(|| TrainError::MissingColumn(target_column.to_string()))?;
        let feature_columns: Vec<usize> = kept.into_iter().filter(|&i| i != target).collect();
        if feature_columns.is_empty() {
            return Err(TrainError::NotEnoughData("no feature columns".into()));
        }

        let mut samples = Vec::new();
        let mut skipped_rows = 0;
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            // header is line 1
            let line = row.position().map_or(index as u64 + 2, |p| p.line());

            let cell = |i: usize| row.get(i).map(str::trim).unwrap_or_default();
            let label = cell(target);
            if label.is_empty() || feature_columns.iter().any(|&i| cell(i).is_empty()) {
                skipped_rows += 1;
                continue;
            }

            let mut features = Vec::with_capacity(feature_columns.len());
            for &i in &feature_columns {
                let value = match cell(i) {
                    "0" => 0,
                    "1" => 1,
                    other => {
                        return Err(TrainError::InvalidCell {
                            line,
                            column: headers[i].clone(),
                            value: other.to_string(),
                        })
                    }
                };
                features.push(value);
            }
            samples.push(Sample {
                features,
                label: label.to_string(),
            });
        }

        if skipped_rows > 0 {
            tracing::warn!(skipped = skipped_rows, "skipped rows with blank cells");
        }

        Ok(Self {
            feature_names: feature_columns.iter().map(|&i| headers[i].clone()).collect(),
            samples,
            skipped_rows,
        })
    }

    /// Raw feature column names, in column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Vocabulary derived from the feature columns
    pub fn vocabulary(&self) -> Result<Vocabulary, TrainError> {
        Ok(Vocabulary::from_feature_names(&self.feature_names)?)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Labels in row order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.label.as_str())
    }

    /// Rows dropped for blank cells
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn is_index_column(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed")
}

/// Suffix repeated headers with `.1`, `.2`, ...
fn mangle_duplicates<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .map(|header| {
            let mut name = header.to_string();
            if header.is_empty() {
                return name;
            }
            // a suffixed name can itself collide with a literal header
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
itching,skin_rash,High_Fever,prognosis,
1,1,0,Fungal infection,
0,0,1,Malaria,
0,1,,Malaria,
1,0,0,Allergy,
";

    #[test]
    fn test_load_drops_index_columns_and_blank_rows() {
        let dataset = SymptomDataset::from_reader(CSV.as_bytes(), DEFAULT_TARGET_COLUMN).unwrap();
        assert_eq!(dataset.feature_names(), &["itching", "skin_rash", "High_Fever"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.skipped_rows(), 1);
        assert_eq!(
            dataset.samples()[1],
            Sample {
                features: vec![0, 0, 1],
                label: "Malaria".into()
            }
        );
        assert_eq!(
            dataset.labels().collect::<Vec<_>>(),
            vec!["Fungal infection", "Malaria", "Allergy"]
        );
    }

    #[test]
    fn test_vocabulary_uses_matching_form() {
        let dataset = SymptomDataset::from_reader(CSV.as_bytes(), DEFAULT_TARGET_COLUMN).unwrap();
        let vocab = dataset.vocabulary().unwrap();
        assert_eq!(vocab.terms(), &["itching", "skin rash", "high fever"]);
    }

    #[test]
    fn test_unnamed_column_ignored() {
        let csv = "Unnamed: 0,fever,prognosis\n7,1,Malaria\n";
        let dataset = SymptomDataset::from_reader(csv.as_bytes(), "prognosis").unwrap();
        assert_eq!(dataset.feature_names(), &["fever"]);
        assert_eq!(dataset.samples()[0].features, vec![1]);
    }

    #[test]
    fn test_invalid_cell() {
        let csv = "fever,cough,prognosis\n1,2,Malaria\n";
        let err = SymptomDataset::from_reader(csv.as_bytes(), "prognosis").unwrap_err();
        match err {
            TrainError::InvalidCell { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "cough");
                assert_eq!(value, "2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_target() {
        let err = SymptomDataset::from_reader(CSV.as_bytes(), "disease").unwrap_err();
        assert!(matches!(err, TrainError::MissingColumn(c) if c == "disease"));
    }

    #[test]
    fn test_duplicate_headers_mangled() {
        let csv = "fluid_overload,fluid_overload,prognosis\n1,0,Hepatitis\n";
        let dataset = SymptomDataset::from_reader(csv.as_bytes(), "prognosis").unwrap();
        assert_eq!(dataset.feature_names(), &["fluid_overload", "fluid_overload.1"]);
        assert!(dataset.vocabulary().is_ok());
    }

    #[test]
    fn test_mangled_names_never_collide() {
        let names = mangle_duplicates(["a", "a", "a.1", "a", ""].into_iter());
        assert_eq!(names, vec!["a", "a.1", "a.1.1", "a.2", ""]);

        let csv = "cough,cough,cough.1,prognosis\n1,0,1,Bronchitis\n";
        let dataset = SymptomDataset::from_reader(csv.as_bytes(), "prognosis").unwrap();
        assert_eq!(dataset.feature_names(), &["cough", "cough.1", "cough.1.1"]);
        assert_eq!(dataset.vocabulary().unwrap().len(), 3);
    }
}
