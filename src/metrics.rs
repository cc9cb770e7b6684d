//! Classification metrics
//!
//! Accuracy is the only number the console reports; the confusion matrix is
//! there for looking at which digits get mixed up.

use crate::core::{ClassifierError, LabelVector, Result, SplitKind};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of positions where `predicted` equals `actual`
pub fn accuracy(predicted: &LabelVector, actual: &LabelVector) -> Result<f64> {
    check_lengths(predicted, actual)?;
    let correct = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    Ok(correct as f64 / actual.len() as f64)
}

fn check_lengths(predicted: &LabelVector, actual: &LabelVector) -> Result<()> {
    if actual.is_empty() {
        return Err(ClassifierError::EmptyDataset);
    }
    if predicted.len() != actual.len() {
        return Err(ClassifierError::mismatch(
            "predicted labels",
            actual.len(),
            predicted.len(),
        ));
    }
    Ok(())
}

/// Counts of (actual, predicted) label pairs
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    /// `counts[[actual, predicted]]`
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn from_labels(
        predicted: &LabelVector,
        actual: &LabelVector,
        n_classes: usize,
    ) -> Result<Self> {
        check_lengths(predicted, actual)?;
        let mut counts = Array2::zeros((n_classes, n_classes));
        for (&p, &a) in predicted.iter().zip(actual.iter()) {
            let label = p.max(a);
            if label >= n_classes {
                return Err(ClassifierError::InvalidLabel { label, n_classes });
            }
            counts[[a, p]] += 1;
        }
        Ok(Self { counts })
    }

    pub fn n_classes(&self) -> usize {
        self.counts.nrows()
    }

    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.counts[[actual, predicted]]
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    /// Trace over total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.counts.diag().sum() as f64 / total as f64
        }
    }

    /// Fraction of each class's samples predicted correctly; 0 for absent classes
    pub fn recall(&self) -> Vec<f64> {
        self.counts
            .rows()
            .into_iter()
            .enumerate()
            .map(|(class, row)| {
                let support = row.sum();
                if support == 0 {
                    0.0
                } else {
                    row[class] as f64 / support as f64
                }
            })
            .collect()
    }

    /// Fraction of each class's predictions that were right; 0 for never-predicted classes
    pub fn precision(&self) -> Vec<f64> {
        self.counts
            .columns()
            .into_iter()
            .enumerate()
            .map(|(class, column)| {
                let predicted = column.sum();
                if predicted == 0 {
                    0.0
                } else {
                    column[class] as f64 / predicted as f64
                }
            })
            .collect()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.counts.iter().max().copied().unwrap_or(0).to_string().len().max(3);
        write!(f, "{:>5}", "")?;
        for class in 0..self.n_classes() {
            write!(f, " {class:>width$}")?;
        }
        for (class, row) in self.counts.rows().into_iter().enumerate() {
            write!(f, "\n{class:>5}")?;
            for count in row.iter() {
                write!(f, " {count:>width$}")?;
            }
        }
        Ok(())
    }
}

/// Accuracy of one trained model on each of the three splits, as fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub training: f64,
    pub validation: f64,
    pub testing: f64,
}

impl AccuracyReport {
    pub fn new(training: f64, validation: f64, testing: f64) -> Self {
        Self {
            training,
            validation,
            testing,
        }
    }

    /// Build a report by scoring each split with `score`
    pub fn from_fn<F>(mut score: F) -> Result<Self>
    where
        F: FnMut(SplitKind) -> Result<f64>,
    {
        Ok(Self {
            training: score(SplitKind::Training)?,
            validation: score(SplitKind::Validation)?,
            testing: score(SplitKind::Testing)?,
        })
    }

    pub fn get(&self, kind: SplitKind) -> f64 {
        match kind {
            SplitKind::Training => self.training,
            SplitKind::Validation => self.validation,
            SplitKind::Testing => self.testing,
        }
    }

    /// One ` <Split> set Accuracy:<pct>%` line per split
    pub fn lines(&self) -> Vec<String> {
        SplitKind::ALL
            .iter()
            .map(|&kind| format_accuracy(kind, self.get(kind)))
            .collect()
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Console line for one split, accuracy given as a fraction
pub fn format_accuracy(kind: SplitKind, accuracy: f64) -> String {
    format!(" {kind} set Accuracy:{:.2}%", accuracy * 100.0)
}
