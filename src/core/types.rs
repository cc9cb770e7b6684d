//! Core type definitions

use crate::core::{ClassifierError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `N×D` matrix, one sample per row
pub type FeatureMatrix = Array2<f64>;

/// `N` class labels in `[0, n_classes)`
pub type LabelVector = Array1<usize>;

/// `(D+1)×K` matrix, column `k` is the bias-augmented weight vector of class `k`
pub type WeightMatrix = Array2<f64>;

/// Number of digit classes in the dataset
pub const N_DIGIT_CLASSES: usize = 10;

/// Feature matrix together with its labels
#[derive(Debug, Clone)]
pub struct Split {
    pub data: FeatureMatrix,
    pub labels: LabelVector,
}

impl Split {
    /// Create a split, checking that every row has a label
    pub fn new(data: FeatureMatrix, labels: LabelVector) -> Result<Self> {
        if data.nrows() != labels.len() {
            return Err(ClassifierError::mismatch(
                "split labels",
                data.nrows(),
                labels.len(),
            ));
        }
        Ok(Self { data, labels })
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Number of samples carrying each label in `[0, n_classes)`
    pub fn class_counts(&self, n_classes: usize) -> Vec<usize> {
        let mut counts = vec![0; n_classes];
        for &label in self.labels.iter() {
            if label < n_classes {
                counts[label] += 1;
            }
        }
        counts
    }
}

/// Check a labelled training set before fitting `n_classes` classes
pub fn validate_labels(data: &FeatureMatrix, labels: &LabelVector, n_classes: usize) -> Result<()> {
    if data.nrows() == 0 {
        return Err(ClassifierError::EmptyDataset);
    }
    if data.nrows() != labels.len() {
        return Err(ClassifierError::mismatch("labels", data.nrows(), labels.len()));
    }
    if n_classes < 2 {
        return Err(ClassifierError::InvalidParameter(format!(
            "need at least two classes, got {n_classes}"
        )));
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
        return Err(ClassifierError::InvalidLabel { label, n_classes });
    }
    Ok(())
}

/// Which of the three fixed splits a number refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    Training,
    Validation,
    Testing,
}

impl SplitKind {
    pub const ALL: [SplitKind; 3] = [SplitKind::Training, SplitKind::Validation, SplitKind::Testing];
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitKind::Training => "Training",
            SplitKind::Validation => "Validation",
            SplitKind::Testing => "Testing",
        };
        f.write_str(name)
    }
}

/// The train/validation/test partition of a dataset
#[derive(Debug, Clone)]
pub struct DataSplits {
    pub train: Split,
    pub validation: Split,
    pub test: Split,
    /// Number of distinct classes labels are drawn from
    pub n_classes: usize,
}

impl DataSplits {
    pub fn get(&self, kind: SplitKind) -> &Split {
        match kind {
            SplitKind::Training => &self.train,
            SplitKind::Validation => &self.validation,
            SplitKind::Testing => &self.test,
        }
    }

    pub fn n_features(&self) -> usize {
        self.train.n_features()
    }
}

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(ClassifierError::mismatch(
                "sparse vector values",
                indices.len(),
                values.len(),
            ));
        }

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Ok(Self { indices, values })
    }

    /// Keep the non-zero entries of a dense row
    ///
    /// Digit images are mostly background, so most pixels drop out here.
    pub fn from_dense(row: ArrayView1<f64>) -> Self {
        let (indices, values) = row
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, &v)| (i, v))
            .unzip();
        Self { indices, values }
    }

    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Training sample for a binary SVM
#[derive(Clone, Debug)]
pub struct Sample {
    pub features: SparseVector,
    /// +1 or -1
    pub label: f64,
}

impl Sample {
    pub fn new(features: SparseVector, label: f64) -> Self {
        Self { features, label }
    }
}

/// Dual solution produced by the SMO solver
#[derive(Debug, Clone)]
pub struct DualSolution {
    /// Lagrange multipliers, one per training sample
    pub alpha: Vec<f64>,
    /// Bias term of the decision function
    pub b: f64,
    /// Indices of samples with non-zero alpha
    pub support_vectors: Vec<usize>,
    pub iterations: usize,
    /// Dual objective value at the solution
    pub objective_value: f64,
}

/// Configuration of the SMO solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Stopping tolerance on the maximal KKT violation
    pub epsilon: f64,
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10_000_000,
            cache_size: 200 * 1024 * 1024,
        }
    }
}

/// Options shared by the unconstrained minimizers
#[derive(Debug, Clone)]
pub struct MinimizeOptions {
    pub max_iterations: usize,
    /// Convergence is declared once the largest gradient component falls below this
    pub gradient_tolerance: f64,
    /// Function evaluations allowed per line search
    pub max_line_search_steps: usize,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            gradient_tolerance: 1e-5,
            max_line_search_steps: 20,
        }
    }
}

/// Outcome of an unconstrained minimization
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub params: Array1<f64>,
    /// Objective value at `params`
    pub value: f64,
    pub iterations: usize,
    /// Objective/gradient evaluations, including line search trials
    pub evaluations: usize,
    /// True when the gradient tolerance was reached before the iteration cap
    pub converged: bool,
}
