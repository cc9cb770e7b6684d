//! RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)

use crate::core::{ClassifierError, Result, SparseVector};
use crate::kernel::linear::sparse_dot;
use crate::kernel::Kernel;

/// Gaussian kernel with bandwidth `gamma`
///
/// Small gamma lets every training image influence the decision; large gamma
/// makes the classifier behave like nearest-neighbour lookup.
#[derive(Debug, Clone, Copy)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    pub fn new(gamma: f64) -> Result<Self> {
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "Gamma must be positive, got: {gamma}"
            )));
        }
        Ok(Self { gamma })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Kernel for RbfKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        self.compute_with_norms(x, y, x.norm_squared(), y.norm_squared())
    }

    fn compute_with_norms(
        &self,
        x: &SparseVector,
        y: &SparseVector,
        x_norm_sq: f64,
        y_norm_sq: f64,
    ) -> f64 {
        // ||x - y||² = ||x||² + ||y||² - 2x·y, clamped against rounding
        let squared_distance = (x_norm_sq + y_norm_sq - 2.0 * sparse_dot(x, y)).max(0.0);
        (-self.gamma * squared_distance).exp()
    }
}
