//! Kernel support vector machines
//!
//! [`BinarySvm`] trains a single two-class machine through the SMO solver;
//! [`OneVsOneSvm`] combines one per class pair into a digit classifier.
//! [`SvmBackend`] is the seam the sweep drives, so it can run against a stub.

pub mod binary;
pub mod multiclass;

pub use self::binary::{BinarySvm, TrainedBinarySvm};
pub use self::multiclass::{OneVsOneSvm, TrainedOneVsOne};

use crate::core::{DataSplits, Result, SolverConfig, SplitKind};
use crate::kernel::{Gamma, KernelType, SvmKernel};
use crate::metrics::{accuracy, AccuracyReport, ConfusionMatrix};
use log::{debug, log_enabled, Level};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regularization used when a configuration leaves `C` unset
pub const DEFAULT_C: f64 = 1.0;

/// One SVM setting to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmConfig {
    pub kernel: KernelType,
    /// Ignored by the linear kernel
    #[serde(default)]
    pub gamma: Gamma,
    /// `None` means the default of 1
    #[serde(default)]
    pub c: Option<f64>,
}

impl SvmConfig {
    pub fn linear() -> Self {
        Self {
            kernel: KernelType::Linear,
            gamma: Gamma::default(),
            c: None,
        }
    }

    pub fn rbf() -> Self {
        Self {
            kernel: KernelType::Rbf,
            gamma: Gamma::default(),
            c: None,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Gamma::Value(gamma);
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = Some(c);
        self
    }

    pub fn c_value(&self) -> f64 {
        self.c.unwrap_or(DEFAULT_C)
    }

    /// Human-readable heading printed above the configuration's results
    pub fn description(&self) -> String {
        match (self.kernel, self.c) {
            (KernelType::Linear, None) => {
                "Using linear kernel(all other parameters are kept default)".to_string()
            }
            (KernelType::Linear, Some(c)) => format!("Using linear kernel and C={c}"),
            (KernelType::Rbf, c) => {
                let gamma = match self.gamma {
                    Gamma::Auto => "default".to_string(),
                    other => other.to_string(),
                };
                match c {
                    None => format!(
                        "Using radial basis function with value of gamma set to {gamma}(all other parameters are kept default)"
                    ),
                    Some(c) => format!(
                        "Using radial basis function with value of gamma set to {gamma} and C={c}"
                    ),
                }
            }
        }
    }
}

impl fmt::Display for SvmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel={}", self.kernel)?;
        if self.kernel == KernelType::Rbf {
            write!(f, " gamma={}", self.gamma)?;
        }
        write!(f, " C={}", self.c_value())
    }
}

/// Something that can train an SVM on the training split and score all three
pub trait SvmBackend {
    fn fit_and_score(&self, splits: &DataSplits, config: &SvmConfig) -> Result<AccuracyReport>;
}

/// The in-crate SMO implementation, one-vs-one over the digit classes
#[derive(Debug, Clone)]
pub struct SmoBackend {
    solver: SolverConfig,
}

impl SmoBackend {
    /// `solver.c` is replaced by each configuration's `C`
    pub fn new(solver: SolverConfig) -> Self {
        Self { solver }
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver
    }
}

impl Default for SmoBackend {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl SvmBackend for SmoBackend {
    fn fit_and_score(&self, splits: &DataSplits, config: &SvmConfig) -> Result<AccuracyReport> {
        let kernel = SvmKernel::build(config.kernel, config.gamma, &splits.train.data)?;
        let solver = SolverConfig {
            c: config.c_value(),
            ..self.solver.clone()
        };
        debug!("Training SVM with {config} ({kernel:?})");

        let model = OneVsOneSvm::new(kernel, solver).fit(
            &splits.train.data,
            &splits.train.labels,
            splits.n_classes,
        )?;

        AccuracyReport::from_fn(|kind: SplitKind| {
            let split = splits.get(kind);
            let predicted = model.predict(&split.data);
            if log_enabled!(Level::Debug) {
                let confusion =
                    ConfusionMatrix::from_labels(&predicted, &split.labels, splits.n_classes)?;
                debug!("{kind} confusion matrix:\n{confusion}");
                debug!(
                    "{kind} recall {:.3?} precision {:.3?}",
                    confusion.recall(),
                    confusion.precision()
                );
            }
            accuracy(&predicted, &split.labels)
        })
    }
}
