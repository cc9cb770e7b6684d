//! Kernel functions for the SVM
//!
//! Kernels work on [`SparseVector`](crate::core::SparseVector) rows: digit
//! images are mostly background, so dot products only touch the inked pixels.

pub mod linear;
pub mod rbf;

pub use self::linear::LinearKernel;
pub use self::rbf::RbfKernel;

use crate::core::{ClassifierError, FeatureMatrix, Result, SparseVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to be valid for SVM.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;

    /// Compute K(x, y) given the precomputed squared norms of both vectors
    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        let _ = (x_norm_sq, y_norm_sq);
        self.compute(x, y)
    }
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        (**self).compute(x, y)
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        (**self).compute_with_norms(x, y, x_norm_sq, y_norm_sq)
    }
}

/// Kernel family named in a sweep configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Rbf,
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelType::Linear => f.write_str("linear"),
            KernelType::Rbf => f.write_str("rbf"),
        }
    }
}

/// RBF bandwidth, either fixed or derived from the training data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gamma {
    /// `1 / n_features`
    #[default]
    Auto,
    /// `1 / (n_features * Var(X))` over every entry of the training matrix
    Scale,
    Value(f64),
}

impl Gamma {
    /// Concrete gamma for a training matrix
    pub fn resolve(&self, data: &FeatureMatrix) -> Result<f64> {
        let n_features = data.ncols();
        if n_features == 0 {
            return Err(ClassifierError::InvalidParameter(
                "cannot derive gamma without features".to_string(),
            ));
        }
        let gamma = match *self {
            Gamma::Auto => 1.0 / n_features as f64,
            Gamma::Scale => {
                let mean = data.mean().unwrap_or(0.0);
                let variance = data.mapv(|v| (v - mean).powi(2)).mean().unwrap_or(0.0);
                if variance > 0.0 {
                    1.0 / (n_features as f64 * variance)
                } else {
                    1.0
                }
            }
            Gamma::Value(gamma) => gamma,
        };
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "gamma must be positive, got {gamma}"
            )));
        }
        Ok(gamma)
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gamma::Auto => f.write_str("auto"),
            Gamma::Scale => f.write_str("scale"),
            Gamma::Value(gamma) => write!(f, "{gamma}"),
        }
    }
}

/// A kernel chosen at run time
#[derive(Debug, Clone, Copy)]
pub enum SvmKernel {
    Linear(LinearKernel),
    Rbf(RbfKernel),
}

impl SvmKernel {
    /// Build the kernel for `kernel_type`, resolving gamma against `data`
    pub fn build(kernel_type: KernelType, gamma: Gamma, data: &FeatureMatrix) -> Result<Self> {
        Ok(match kernel_type {
            KernelType::Linear => SvmKernel::Linear(LinearKernel::new()),
            KernelType::Rbf => SvmKernel::Rbf(RbfKernel::new(gamma.resolve(data)?)?),
        })
    }
}

impl Kernel for SvmKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        match self {
            SvmKernel::Linear(k) => k.compute(x, y),
            SvmKernel::Rbf(k) => k.compute(x, y),
        }
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        match self {
            SvmKernel::Linear(k) => k.compute_with_norms(x, y, x_norm_sq, y_norm_sq),
            SvmKernel::Rbf(k) => k.compute_with_norms(x, y, x_norm_sq, y_norm_sq),
        }
    }
}
