//! Two-class SVM: training through SMO and kernel-expansion prediction

use crate::cache::KernelCache;
use crate::core::{DualSolution, Result, Sample, SolverConfig, SparseVector};
use crate::kernel::Kernel;
use crate::solver::SmoSolver;
use std::sync::Arc;

/// Trains a binary SVM with a fixed kernel and solver configuration
pub struct BinarySvm<K: Kernel> {
    kernel: Arc<K>,
    config: SolverConfig,
}

impl<K: Kernel> BinarySvm<K> {
    pub fn new(kernel: K, config: SolverConfig) -> Self {
        Self::with_shared_kernel(Arc::new(kernel), config)
    }

    /// Share one kernel between several trainers
    pub fn with_shared_kernel(kernel: Arc<K>, config: SolverConfig) -> Self {
        Self { kernel, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Train on ±1-labelled samples
    pub fn train(&self, samples: &[Sample]) -> Result<TrainedBinarySvm<K>> {
        let mut cache = KernelCache::with_memory_limit(self.config.cache_size, samples.len());
        self.train_with_cache(samples, &mut cache)
    }

    /// Train reusing a caller-provided kernel row cache
    pub fn train_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<TrainedBinarySvm<K>> {
        let solver = SmoSolver::new(&*self.kernel, self.config.clone());
        let solution = solver.solve_with_cache(samples, cache)?;
        Ok(TrainedBinarySvm::new(Arc::clone(&self.kernel), samples, solution))
    }
}

/// Support vectors and multipliers of a trained binary SVM
pub struct TrainedBinarySvm<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<Sample>,
    /// `αᵢ yᵢ` per support vector
    coefficients: Vec<f64>,
    bias: f64,
    support_indices: Vec<usize>,
    iterations: usize,
}

impl<K: Kernel> TrainedBinarySvm<K> {
    pub(crate) fn new(kernel: Arc<K>, training: &[Sample], solution: DualSolution) -> Self {
        let support_vectors = solution
            .support_vectors
            .iter()
            .map(|&i| training[i].clone())
            .collect();
        let coefficients = solution
            .support_vectors
            .iter()
            .map(|&i| solution.alpha[i] * training[i].label)
            .collect();

        Self {
            kernel,
            support_vectors,
            coefficients,
            bias: solution.b,
            support_indices: solution.support_vectors,
            iterations: solution.iterations,
        }
    }

    /// `Σ αᵢyᵢK(xᵢ, x) + b`
    pub fn decision_function(&self, x: &SparseVector) -> f64 {
        self.support_vectors
            .iter()
            .zip(self.coefficients.iter())
            .map(|(sv, &coef)| coef * self.kernel.compute(&sv.features, x))
            .sum::<f64>()
            + self.bias
    }

    pub fn support_vectors(&self) -> &[Sample] {
        &self.support_vectors
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Positions of the support vectors in the training slice
    pub fn support_indices(&self) -> &[usize] {
        &self.support_indices
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
