//! Handwritten digit classification with logistic regression and kernel SVMs
//!
//! One-vs-rest and softmax logistic regression are trained with a nonlinear
//! conjugate gradient minimizer; the SVMs are trained with SMO and combined
//! one-vs-one. [`pipeline::run`] reproduces the full comparison on MNIST.

pub mod cache;
pub mod config;
pub mod core;
pub mod data;
pub mod kernel;
pub mod logistic;
pub mod metrics;
pub mod optimizer;
pub mod pipeline;
pub mod report;
pub mod solver;
pub mod svm;
pub mod sweep;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::config::RunConfig;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{ClassifierError, Result};
pub use crate::data::{DatasetFormat, IdxSource, MatFileSource, RawDataset};
pub use crate::kernel::{Gamma, Kernel, KernelType, LinearKernel, RbfKernel};
pub use crate::logistic::{LogisticMode, LogisticRegression, TrainedLogistic};
pub use crate::metrics::{accuracy, AccuracyReport, ConfusionMatrix};
pub use crate::optimizer::{ConjugateGradient, GradientDescent};
pub use crate::report::RunSummary;
pub use crate::svm::{SmoBackend, SvmBackend, SvmConfig};
pub use crate::sweep::{default_configurations, run_sweep, SweepResult};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
