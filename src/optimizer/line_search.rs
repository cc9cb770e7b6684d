//! Line search satisfying the strong Wolfe conditions
//!
//! Bracketing phase followed by a zoom with safeguarded quadratic
//! interpolation (Nocedal & Wright, algorithms 3.5 and 3.6).

use crate::core::{Objective, Result};
use ndarray::Array1;

/// Accepted step along a search direction
#[derive(Debug, Clone)]
pub struct LineSearchResult {
    pub step: f64,
    /// Objective value at the accepted point
    pub value: f64,
    /// Gradient at the accepted point
    pub gradient: Array1<f64>,
    pub evaluations: usize,
}

/// Strong Wolfe line search
#[derive(Debug, Clone)]
pub struct LineSearch {
    /// Sufficient decrease constant
    pub c1: f64,
    /// Curvature constant
    pub c2: f64,
    /// Evaluations allowed in each of the bracketing and zoom phases
    pub max_steps: usize,
    pub max_step: f64,
}

impl Default for LineSearch {
    fn default() -> Self {
        // c2 = 0.4 keeps conjugate directions descent directions
        Self {
            c1: 1e-4,
            c2: 0.4,
            max_steps: 20,
            max_step: 1e8,
        }
    }
}

#[derive(Debug, Clone)]
struct Trial {
    step: f64,
    value: f64,
    slope: f64,
    gradient: Array1<f64>,
}

impl Trial {
    fn into_result(self, evaluations: usize) -> LineSearchResult {
        LineSearchResult {
            step: self.step,
            value: self.value,
            gradient: self.gradient,
            evaluations,
        }
    }
}

/// Start point and descent rate shared by every trial of one search
struct Origin<'a> {
    x: &'a Array1<f64>,
    direction: &'a Array1<f64>,
    value: f64,
    slope: f64,
}

impl LineSearch {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Search along `direction` from `x`
    ///
    /// Returns `None` when `direction` is not a descent direction or no
    /// acceptable step was found within the evaluation budget.
    pub fn search<O: Objective + ?Sized>(
        &self,
        objective: &O,
        x: &Array1<f64>,
        direction: &Array1<f64>,
        value: f64,
        gradient: &Array1<f64>,
        initial_step: f64,
    ) -> Result<Option<LineSearchResult>> {
        let slope = gradient.dot(direction);
        if !(slope < 0.0) {
            return Ok(None);
        }
        let origin = Origin {
            x,
            direction,
            value,
            slope,
        };

        let mut evaluations = 0;
        let mut previous = Trial {
            step: 0.0,
            value,
            slope,
            gradient: gradient.clone(),
        };
        let mut step = initial_step.min(self.max_step);

        for i in 0..self.max_steps {
            let trial = self.evaluate_at(objective, &origin, step)?;
            evaluations += 1;

            if self.violates_decrease(&origin, &trial) || (i > 0 && trial.value >= previous.value)
            {
                return self.zoom(objective, &origin, previous, trial, evaluations);
            }
            if trial.slope.abs() <= -self.c2 * origin.slope {
                return Ok(Some(trial.into_result(evaluations)));
            }
            if trial.slope >= 0.0 {
                return self.zoom(objective, &origin, trial, previous, evaluations);
            }

            previous = trial;
            step = (step * 2.0).min(self.max_step);
        }

        Ok(None)
    }

    fn zoom<O: Objective + ?Sized>(
        &self,
        objective: &O,
        origin: &Origin<'_>,
        mut lo: Trial,
        mut hi: Trial,
        mut evaluations: usize,
    ) -> Result<Option<LineSearchResult>> {
        for _ in 0..self.max_steps {
            let step = interpolate(&lo, &hi);
            let trial = self.evaluate_at(objective, origin, step)?;
            evaluations += 1;

            if self.violates_decrease(origin, &trial) || trial.value >= lo.value {
                hi = trial;
            } else {
                if trial.slope.abs() <= -self.c2 * origin.slope {
                    return Ok(Some(trial.into_result(evaluations)));
                }
                if trial.slope * (hi.step - lo.step) >= 0.0 {
                    hi = std::mem::replace(&mut lo, trial);
                } else {
                    lo = trial;
                }
            }
        }

        // lo always satisfies sufficient decrease; settle for it over no progress.
        if lo.step > 0.0 {
            Ok(Some(lo.into_result(evaluations)))
        } else {
            Ok(None)
        }
    }

    fn violates_decrease(&self, origin: &Origin<'_>, trial: &Trial) -> bool {
        !trial.value.is_finite()
            || trial.value > origin.value + self.c1 * trial.step * origin.slope
    }

    fn evaluate_at<O: Objective + ?Sized>(
        &self,
        objective: &O,
        origin: &Origin<'_>,
        step: f64,
    ) -> Result<Trial> {
        let mut point = origin.x.clone();
        point.scaled_add(step, origin.direction);
        let (value, gradient) = objective.evaluate(&point)?;
        let slope = gradient.dot(origin.direction);
        Ok(Trial {
            step,
            value,
            slope,
            gradient,
        })
    }
}

/// Minimizer of the quadratic through `lo` (value and slope) and `hi` (value),
/// falling back to bisection when it lands too close to either end
fn interpolate(lo: &Trial, hi: &Trial) -> f64 {
    let delta = hi.step - lo.step;
    let curvature = 2.0 * (hi.value - lo.value - lo.slope * delta);
    let candidate = lo.step - lo.slope * delta * delta / curvature;

    let (a, b) = if lo.step < hi.step {
        (lo.step, hi.step)
    } else {
        (hi.step, lo.step)
    };
    let margin = 0.1 * (b - a);
    if candidate.is_finite() && candidate > a + margin && candidate < b - margin {
        candidate
    } else {
        0.5 * (lo.step + hi.step)
    }
}
