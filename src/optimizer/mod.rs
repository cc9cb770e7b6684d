//! Unconstrained gradient-based minimizers
//!
//! Everything here works on flat parameter vectors and only sees an
//! [`Objective`]; reshaping into weight matrices is the caller's business.

pub mod cg;
pub mod descent;
pub mod line_search;

pub use self::cg::ConjugateGradient;
pub use self::descent::GradientDescent;
pub use self::line_search::{LineSearch, LineSearchResult};

use crate::core::{
    ClassifierError, Minimizer, MinimizeOptions, Objective, OptimizeResult, Result,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which minimizer to train with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationMethod {
    #[default]
    ConjugateGradient,
    GradientDescent,
}

impl fmt::Display for OptimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationMethod::ConjugateGradient => f.write_str("conjugate-gradient"),
            OptimizationMethod::GradientDescent => f.write_str("gradient-descent"),
        }
    }
}

/// A minimizer chosen at run time
#[derive(Debug, Clone)]
pub enum SelectedMinimizer {
    ConjugateGradient(ConjugateGradient),
    GradientDescent(GradientDescent),
}

impl SelectedMinimizer {
    pub fn new(method: OptimizationMethod, options: MinimizeOptions) -> Self {
        match method {
            OptimizationMethod::ConjugateGradient => {
                Self::ConjugateGradient(ConjugateGradient::new(options))
            }
            OptimizationMethod::GradientDescent => {
                Self::GradientDescent(GradientDescent::new(options))
            }
        }
    }
}

impl Minimizer for SelectedMinimizer {
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial: Array1<f64>,
    ) -> Result<OptimizeResult> {
        match self {
            Self::ConjugateGradient(m) => m.minimize(objective, initial),
            Self::GradientDescent(m) => m.minimize(objective, initial),
        }
    }
}

/// Validate the starting point and evaluate the objective there
pub(crate) fn check_start<O: Objective + ?Sized>(
    objective: &O,
    initial: &Array1<f64>,
) -> Result<(f64, Array1<f64>)> {
    if initial.len() != objective.dimension() {
        return Err(ClassifierError::mismatch(
            "initial parameters",
            objective.dimension(),
            initial.len(),
        ));
    }
    let (value, gradient) = objective.evaluate(initial)?;
    if !value.is_finite() || gradient.iter().any(|g| !g.is_finite()) {
        return Err(ClassifierError::OptimizationError(
            "objective is not finite at the initial point".to_string(),
        ));
    }
    Ok((value, gradient))
}

/// Infinity norm
pub(crate) fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}
