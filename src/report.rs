//! JSON summary of a run
//!
//! Written at the end of [`crate::pipeline::run`] when a report path is
//! configured; readable again for comparing runs.

use crate::core::{ClassifierError, DataSplits, Result};
use crate::logistic::FitSummary;
use crate::metrics::AccuracyReport;
use crate::sweep::SweepResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Accuracy and optimizer outcome of one logistic regression stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticOutcome {
    pub accuracy: AccuracyReport,
    /// One entry per class for one-vs-rest, a single entry for softmax
    pub fits: Vec<FitSummary>,
}

/// Sizes of the prepared data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSummary {
    pub n_classes: usize,
    pub n_features: usize,
    pub n_training: usize,
    pub n_validation: usize,
    pub n_testing: usize,
}

impl DataSummary {
    pub fn from_splits(splits: &DataSplits) -> Self {
        Self {
            n_classes: splits.n_classes,
            n_features: splits.n_features(),
            n_training: splits.train.n_samples(),
            n_validation: splits.validation.n_samples(),
            n_testing: splits.test.n_samples(),
        }
    }
}

/// Everything a run reported, in stage order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub library_version: String,
    /// RFC 3339 creation time
    pub created_at: String,
    pub dataset: String,
    pub data: DataSummary,
    pub binary_logistic: Option<LogisticOutcome>,
    pub svm: Vec<SweepResult>,
    pub multiclass_logistic: Option<LogisticOutcome>,
}

impl RunSummary {
    pub fn new(dataset: &Path, splits: &DataSplits) -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            dataset: dataset.display().to_string(),
            data: DataSummary::from_splits(splits),
            binary_logistic: None,
            svm: Vec::new(),
            multiclass_logistic: None,
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| ClassifierError::SerializationError(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ClassifierError::SerializationError(e.to_string()))
    }
}
