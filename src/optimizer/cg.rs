//! Non-linear conjugate gradient (Polak-Ribière+)

use crate::core::{Minimizer, MinimizeOptions, Objective, OptimizeResult, Result};
use crate::optimizer::line_search::LineSearch;
use crate::optimizer::{check_start, max_abs};
use log::{debug, warn};
use ndarray::Array1;

/// Polak-Ribière conjugate gradient with a strong Wolfe line search
///
/// The direction is reset to steepest descent whenever `beta` turns negative
/// or the conjugate direction stops being a descent direction.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    options: MinimizeOptions,
    line_search: LineSearch,
}

impl ConjugateGradient {
    pub fn new(options: MinimizeOptions) -> Self {
        let line_search = LineSearch::default().with_max_steps(options.max_line_search_steps);
        Self {
            options,
            line_search,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }

    pub fn with_gradient_tolerance(mut self, tolerance: f64) -> Self {
        self.options.gradient_tolerance = tolerance;
        self
    }

    pub fn options(&self) -> &MinimizeOptions {
        &self.options
    }
}

impl Minimizer for ConjugateGradient {
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial: Array1<f64>,
    ) -> Result<OptimizeResult> {
        let mut x = initial;
        let (mut value, mut gradient) = check_start(objective, &x)?;
        let mut evaluations = 1;

        let mut direction = gradient.mapv(|g| -g);
        // Makes the first trial step 1.01 / |g|
        let mut previous_value = value + gradient.dot(&gradient).sqrt() / 2.0;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.options.max_iterations {
            if max_abs(&gradient) <= self.options.gradient_tolerance {
                converged = true;
                break;
            }

            let slope = gradient.dot(&direction);
            let initial_step = trial_step(value, previous_value, slope);
            let found = self.line_search.search(
                objective,
                &x,
                &direction,
                value,
                &gradient,
                initial_step,
            )?;
            let found = match found {
                Some(found) => found,
                None => {
                    warn!(
                        "Line search failed after {iterations} iterations; stopping at f={value:.6}"
                    );
                    break;
                }
            };
            evaluations += found.evaluations;
            x.scaled_add(found.step, &direction);

            let gradient_norm_sq = gradient.dot(&gradient);
            let new_gradient = found.gradient;
            let beta = if gradient_norm_sq > 0.0 {
                (new_gradient.dot(&(&new_gradient - &gradient)) / gradient_norm_sq).max(0.0)
            } else {
                0.0
            };
            direction = &direction * beta - &new_gradient;
            if direction.dot(&new_gradient) >= 0.0 {
                direction = new_gradient.mapv(|g| -g);
            }

            previous_value = value;
            value = found.value;
            gradient = new_gradient;
            iterations += 1;

            debug!(
                "cg iteration {iterations}: f={value:.8} |g|inf={:.3e} step={:.3e}",
                max_abs(&gradient),
                found.step
            );
        }

        if !converged && max_abs(&gradient) <= self.options.gradient_tolerance {
            converged = true;
        }

        Ok(OptimizeResult {
            params: x,
            value,
            iterations,
            evaluations,
            converged,
        })
    }
}

/// First step to try: the step that would repeat the last decrease, capped at 1
fn trial_step(value: f64, previous_value: f64, slope: f64) -> f64 {
    let step = (1.01 * 2.0 * (value - previous_value) / slope).min(1.0);
    if step.is_finite() && step > 0.0 {
        step
    } else {
        1.0
    }
}
