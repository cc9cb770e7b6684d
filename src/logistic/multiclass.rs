//! Multinomial (softmax) logistic regression

use crate::core::{
    validate_labels, ClassifierError, FeatureMatrix, LabelVector, Minimizer, Objective, Result,
    WeightMatrix,
};
use crate::data::one_hot;
use crate::logistic::model::FitSummary;
use crate::logistic::{argmax_rows, augment, linear_scores, log_softmax_rows, softmax_rows};
use log::info;
use ndarray::{Array1, Array2};

/// Mean categorical cross-entropy of a softmax classifier
///
/// The flat parameter vector is the `(D+1)×K` weight matrix read row by row,
/// so entry `feature * K + class` holds the weight of `feature` for `class`.
pub struct SoftmaxObjective {
    design: Array2<f64>,
    targets: Array2<f64>,
}

impl SoftmaxObjective {
    /// Objective over `data` with one-hot `targets` (one row per sample)
    pub fn new(data: &FeatureMatrix, targets: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        if data.nrows() != targets.nrows() {
            return Err(ClassifierError::mismatch(
                "one-hot target rows",
                data.nrows(),
                targets.nrows(),
            ));
        }
        if targets.ncols() < 2 {
            return Err(ClassifierError::InvalidParameter(format!(
                "need at least two classes, got {}",
                targets.ncols()
            )));
        }
        let valid = targets.rows().into_iter().all(|row| {
            row.iter().all(|&t| t == 0.0 || t == 1.0) && row.sum() == 1.0
        });
        if !valid {
            return Err(ClassifierError::InvalidParameter(
                "targets must be one-hot rows".to_string(),
            ));
        }
        Ok(Self {
            design: augment(data),
            targets,
        })
    }

    pub fn n_classes(&self) -> usize {
        self.targets.ncols()
    }

    /// View a flat parameter vector as the weight matrix
    pub fn weights_from(&self, params: &Array1<f64>) -> Result<WeightMatrix> {
        let shape = (self.design.ncols(), self.n_classes());
        params.to_owned().into_shape(shape).map_err(|_| {
            ClassifierError::mismatch("softmax weights", shape.0 * shape.1, params.len())
        })
    }
}

impl Objective for SoftmaxObjective {
    fn dimension(&self) -> usize {
        self.design.ncols() * self.n_classes()
    }

    fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        let weights = self.weights_from(params)?;
        let n = self.design.nrows() as f64;
        let logits = self.design.dot(&weights);

        let log_probs = log_softmax_rows(&logits);
        let error = -(&self.targets * &log_probs).sum() / n;

        let residual = log_probs.mapv(f64::exp) - &self.targets;
        let gradient = self.design.t().dot(&residual) / n;
        let gradient = Array1::from_iter(gradient.iter().copied());
        Ok((error, gradient))
    }
}

/// Train all class columns jointly under the softmax error
pub fn train_multinomial<M: Minimizer>(
    minimizer: &M,
    data: &FeatureMatrix,
    labels: &LabelVector,
    n_classes: usize,
) -> Result<(WeightMatrix, FitSummary)> {
    validate_labels(data, labels, n_classes)?;

    let objective = SoftmaxObjective::new(data, one_hot(labels, n_classes)?)?;
    let result = minimizer.minimize(&objective, Array1::zeros(objective.dimension()))?;
    info!(
        "Multinomial: error {:.6} after {} iterations{}",
        result.value,
        result.iterations,
        if result.converged { "" } else { " (not converged)" }
    );

    let summary = FitSummary::from_result(None, &result);
    let weights = objective.weights_from(&result.params)?;
    Ok((weights, summary))
}

/// Label each row with its most probable class
pub fn predict_multinomial(weights: &WeightMatrix, data: &FeatureMatrix) -> Result<LabelVector> {
    let scores = softmax_rows(&linear_scores(weights, data)?);
    Ok(argmax_rows(&scores))
}
