//! Sequential Minimal Optimization (SMO) solver
//!
//! Solves the binary C-SVC dual
//!
//! ```text
//! min  ½ αᵀQα - eᵀα   subject to  yᵀα = 0,  0 ≤ αᵢ ≤ C
//! ```
//!
//! with `Qᵢⱼ = yᵢyⱼK(xᵢ, xⱼ)`, updating two multipliers per iteration.

use crate::cache::{KernelCache, KernelRow};
use crate::core::{ClassifierError, DualSolution, Result, Sample, SolverConfig};
use crate::kernel::Kernel;
use log::{debug, warn};

/// Curvature used when the pair's kernel distance is not positive
const TAU: f64 = 1e-12;

/// SMO solver for the SVM dual problem
pub struct SmoSolver<K: Kernel> {
    kernel: K,
    config: SolverConfig,
}

impl<K: Kernel> SmoSolver<K> {
    pub fn new(kernel: K, config: SolverConfig) -> Self {
        Self { kernel, config }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the dual for `samples`, labels ±1
    pub fn solve(&self, samples: &[Sample]) -> Result<DualSolution> {
        let mut cache = KernelCache::with_memory_limit(self.config.cache_size, samples.len());
        self.solve_with_cache(samples, &mut cache)
    }

    /// Solve using a caller-provided kernel row cache
    ///
    /// The cache must be empty or hold rows for this same `samples` slice.
    pub fn solve_with_cache(
        &self,
        samples: &[Sample],
        cache: &mut KernelCache,
    ) -> Result<DualSolution> {
        self.validate(samples)?;

        let n = samples.len();
        let y: Vec<f64> = samples.iter().map(|s| s.label).collect();

        if y.iter().all(|&label| label == y[0]) {
            // Nothing to separate: a constant decision function fits every sample
            return Ok(DualSolution {
                alpha: vec![0.0; n],
                b: y[0],
                support_vectors: Vec::new(),
                iterations: 0,
                objective_value: 0.0,
            });
        }

        let mut problem = Problem::new(&self.kernel, samples, cache);
        let c = self.config.c;
        let mut alpha = vec![0.0; n];
        // Gradient of the dual objective, Qα - e
        let mut gradient = vec![-1.0; n];
        let mut iterations = 0;

        loop {
            if iterations >= self.config.max_iterations {
                warn!("SMO reached the iteration cap of {iterations}");
                break;
            }
            let selected =
                select_working_set(&mut problem, &y, &alpha, &gradient, c, self.config.epsilon);
            let (i, j) = match selected {
                Some(pair) => pair,
                None => break,
            };

            let k_i = problem.row(i);
            let k_j = problem.row(j);
            let (old_i, old_j) = (alpha[i], alpha[j]);
            update_pair(&mut alpha, &gradient, &y, i, j, &k_i, problem.diag[j], c);

            let (delta_i, delta_j) = (alpha[i] - old_i, alpha[j] - old_j);
            for k in 0..n {
                gradient[k] += y[k] * (y[i] * k_i[k] * delta_i + y[j] * k_j[k] * delta_j);
            }

            iterations += 1;
            if iterations % 1000 == 0 {
                debug!("SMO iteration {iterations}: pair ({i}, {j})");
            }
        }

        let b = -compute_rho(&y, &alpha, &gradient, c);
        let objective_value = 0.5 * alpha
            .iter()
            .zip(gradient.iter())
            .map(|(&a, &g)| a * (1.0 - g))
            .sum::<f64>();
        let support_vectors: Vec<usize> = (0..n).filter(|&i| alpha[i] > 0.0).collect();

        let stats = problem.cache.stats();
        debug!(
            "SMO finished: {iterations} iterations, {} support vectors, cache hits {} misses {}",
            support_vectors.len(),
            stats.hits,
            stats.misses
        );

        Ok(DualSolution {
            alpha,
            b,
            support_vectors,
            iterations,
            objective_value,
        })
    }

    fn validate(&self, samples: &[Sample]) -> Result<()> {
        if samples.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }
        if !(self.config.c.is_finite() && self.config.c > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.config.c
            )));
        }
        if self.config.epsilon.is_nan() || self.config.epsilon <= 0.0 {
            return Err(ClassifierError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                self.config.epsilon
            )));
        }
        if let Some(sample) = samples.iter().find(|s| s.label != 1.0 && s.label != -1.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "SVM labels must be +1 or -1, got {}",
                sample.label
            )));
        }
        Ok(())
    }
}

/// Training samples together with their cached kernel rows
struct Problem<'a, K: Kernel> {
    kernel: &'a K,
    samples: &'a [Sample],
    norms: Vec<f64>,
    /// K(xᵢ, xᵢ)
    diag: Vec<f64>,
    cache: &'a mut KernelCache,
}

impl<'a, K: Kernel> Problem<'a, K> {
    fn new(kernel: &'a K, samples: &'a [Sample], cache: &'a mut KernelCache) -> Self {
        let norms: Vec<f64> = samples.iter().map(|s| s.features.norm_squared()).collect();
        let diag = samples
            .iter()
            .zip(norms.iter())
            .map(|(s, &norm)| kernel.compute_with_norms(&s.features, &s.features, norm, norm))
            .collect();
        Self {
            kernel,
            samples,
            norms,
            diag,
            cache,
        }
    }

    fn row(&mut self, i: usize) -> KernelRow {
        let (kernel, samples, norms) = (self.kernel, self.samples, &self.norms);
        self.cache.get_or_compute(i, || {
            let x = &samples[i].features;
            samples
                .iter()
                .zip(norms.iter())
                .map(|(s, &norm)| kernel.compute_with_norms(x, &s.features, norms[i], norm))
                .collect()
        })
    }
}

fn is_upper_bound(alpha: f64, c: f64) -> bool {
    alpha >= c
}

fn is_lower_bound(alpha: f64) -> bool {
    alpha <= 0.0
}

/// Second-order working set selection
///
/// `i` maximizes `-yᵢ∇ᵢ` over the multipliers that may move up; `j` is the
/// partner giving the largest decrease of the dual objective. Returns `None`
/// once the maximal KKT violation drops below `epsilon`.
fn select_working_set<K: Kernel>(
    problem: &mut Problem<'_, K>,
    y: &[f64],
    alpha: &[f64],
    gradient: &[f64],
    c: f64,
    epsilon: f64,
) -> Option<(usize, usize)> {
    let mut g_max = f64::NEG_INFINITY;
    let mut g_max_idx = None;
    for t in 0..y.len() {
        let movable = if y[t] > 0.0 {
            !is_upper_bound(alpha[t], c)
        } else {
            !is_lower_bound(alpha[t])
        };
        if movable && -y[t] * gradient[t] >= g_max {
            g_max = -y[t] * gradient[t];
            g_max_idx = Some(t);
        }
    }
    let i = g_max_idx?;
    let k_i = problem.row(i);

    let mut g_max2 = f64::NEG_INFINITY;
    let mut obj_diff_min = f64::INFINITY;
    let mut g_min_idx = None;
    for t in 0..y.len() {
        let movable = if y[t] > 0.0 {
            !is_lower_bound(alpha[t])
        } else {
            !is_upper_bound(alpha[t], c)
        };
        if !movable {
            continue;
        }
        let yg = y[t] * gradient[t];
        g_max2 = g_max2.max(yg);
        let grad_diff = g_max + yg;
        if grad_diff > 0.0 {
            let quad_coef = problem.diag[i] + problem.diag[t] - 2.0 * k_i[t];
            let obj_diff = -(grad_diff * grad_diff) / if quad_coef > 0.0 { quad_coef } else { TAU };
            if obj_diff <= obj_diff_min {
                obj_diff_min = obj_diff;
                g_min_idx = Some(t);
            }
        }
    }

    if g_max + g_max2 < epsilon {
        return None;
    }
    g_min_idx.map(|j| (i, j))
}

/// Analytic two-variable update, clipped to the box `[0, C]`
#[allow(clippy::too_many_arguments)]
fn update_pair(
    alpha: &mut [f64],
    gradient: &[f64],
    y: &[f64],
    i: usize,
    j: usize,
    k_i: &[f64],
    k_jj: f64,
    c: f64,
) {
    let mut quad_coef = k_i[i] + k_jj - 2.0 * k_i[j];
    if quad_coef <= 0.0 {
        quad_coef = TAU;
    }

    if y[i] != y[j] {
        let delta = (-gradient[i] - gradient[j]) / quad_coef;
        let diff = alpha[i] - alpha[j];
        alpha[i] += delta;
        alpha[j] += delta;

        if diff > 0.0 {
            if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = diff;
            }
        } else if alpha[i] < 0.0 {
            alpha[i] = 0.0;
            alpha[j] = -diff;
        }
        if diff > 0.0 {
            if alpha[i] > c {
                alpha[i] = c;
                alpha[j] = c - diff;
            }
        } else if alpha[j] > c {
            alpha[j] = c;
            alpha[i] = c + diff;
        }
    } else {
        let delta = (gradient[i] - gradient[j]) / quad_coef;
        let sum = alpha[i] + alpha[j];
        alpha[i] -= delta;
        alpha[j] += delta;

        if sum > c {
            if alpha[i] > c {
                alpha[i] = c;
                alpha[j] = sum - c;
            }
        } else if alpha[j] < 0.0 {
            alpha[j] = 0.0;
            alpha[i] = sum;
        }
        if sum > c {
            if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = sum - c;
            }
        } else if alpha[i] < 0.0 {
            alpha[i] = 0.0;
            alpha[j] = sum;
        }
    }
}

/// Offset `ρ` of the decision function `Σ αᵢyᵢK(xᵢ, x) - ρ`
///
/// Averaged over free multipliers; without any, the midpoint of the feasible range.
fn compute_rho(y: &[f64], alpha: &[f64], gradient: &[f64], c: f64) -> f64 {
    let mut n_free = 0;
    let mut sum_free = 0.0;
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;

    for t in 0..y.len() {
        let yg = y[t] * gradient[t];
        if is_upper_bound(alpha[t], c) {
            if y[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if is_lower_bound(alpha[t]) {
            if y[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            n_free += 1;
            sum_free += yg;
        }
    }

    if n_free > 0 {
        sum_free / n_free as f64
    } else {
        (upper + lower) / 2.0
    }
}
