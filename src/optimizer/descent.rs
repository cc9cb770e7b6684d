//! Steepest descent with a Wolfe line search

use crate::core::{Minimizer, MinimizeOptions, Objective, OptimizeResult, Result};
use crate::optimizer::line_search::LineSearch;
use crate::optimizer::{check_start, max_abs};
use log::{debug, warn};
use ndarray::Array1;

/// Plain gradient descent; slower than [`ConjugateGradient`](super::ConjugateGradient)
/// but useful as a baseline
#[derive(Debug, Clone, Default)]
pub struct GradientDescent {
    options: MinimizeOptions,
    line_search: LineSearch,
}

impl GradientDescent {
    pub fn new(options: MinimizeOptions) -> Self {
        let line_search = LineSearch::default().with_max_steps(options.max_line_search_steps);
        Self {
            options,
            line_search,
        }
    }
}

impl Minimizer for GradientDescent {
    fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        initial: Array1<f64>,
    ) -> Result<OptimizeResult> {
        let mut x = initial;
        let (mut value, mut gradient) = check_start(objective, &x)?;
        let mut evaluations = 1;
        let mut step = 1.0;
        let mut iterations = 0;

        while iterations < self.options.max_iterations
            && max_abs(&gradient) > self.options.gradient_tolerance
        {
            let direction = gradient.mapv(|g| -g);
            let found =
                match self
                    .line_search
                    .search(objective, &x, &direction, value, &gradient, step)?
                {
                    Some(found) => found,
                    None => {
                        warn!("Line search failed after {iterations} iterations");
                        break;
                    }
                };
            evaluations += found.evaluations;
            x.scaled_add(found.step, &direction);
            value = found.value;
            gradient = found.gradient;
            step = found.step;
            iterations += 1;
            debug!("descent iteration {iterations}: f={value:.8}");
        }

        let converged = max_abs(&gradient) <= self.options.gradient_tolerance;
        Ok(OptimizeResult {
            params: x,
            value,
            iterations,
            evaluations,
            converged,
        })
    }
}
