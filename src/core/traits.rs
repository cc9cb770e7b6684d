//! Core traits: the seams between the numerical core and its collaborators

use crate::core::{OptimizeResult, Result};
use crate::data::RawDataset;
use ndarray::Array1;

/// Differentiable scalar function of a flat parameter vector
pub trait Objective {
    /// Length of the parameter vector the objective expects
    fn dimension(&self) -> usize;

    /// Evaluate the objective value and its gradient at `params`
    fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)>;
}

/// Unconstrained gradient-based minimizer
pub trait Minimizer {
    /// Minimize `objective` starting from `initial`
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial: Array1<f64>,
    ) -> Result<OptimizeResult>;
}

/// Source of per-class raw digit images
pub trait DataSource {
    /// Read every class's training and test images
    fn load(&self) -> Result<RawDataset>;

    /// Short description used in log messages
    fn describe(&self) -> String;
}
