//! Logistic regression on bias-augmented features
//!
//! Two flavours share one weight layout, a `(D+1)×K` matrix whose first row
//! is the bias:
//!
//! * [`binary`]: K independent one-vs-rest classifiers, one column each,
//!   scored with the sigmoid;
//! * [`multiclass`]: a single softmax classifier trained over all columns at once.
//!
//! Both predict the class whose column scores highest, lowest index on ties.

pub mod binary;
pub mod model;
pub mod multiclass;

pub use self::binary::{predict_one_vs_rest, train_one_vs_rest, BinaryObjective};
pub use self::model::{FitSummary, LogisticMode, LogisticRegression, TrainedLogistic};
pub use self::multiclass::{predict_multinomial, train_multinomial, SoftmaxObjective};

use crate::core::{ClassifierError, FeatureMatrix, LabelVector, Result, WeightMatrix};
use ndarray::{s, Array1, Array2, ArrayView2};

/// `[1 | X]`: prepend a column of ones
pub fn augment(data: &FeatureMatrix) -> Array2<f64> {
    augment_view(data.view())
}

pub(crate) fn augment_view(data: ArrayView2<f64>) -> Array2<f64> {
    let mut augmented = Array2::ones((data.nrows(), data.ncols() + 1));
    augmented.slice_mut(s![.., 1..]).assign(&data);
    augmented
}

/// Logistic function, evaluated without overflow for large |z|
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^x)`, equal to `-ln(sigmoid(-x))`
pub fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Row-wise log-softmax, shifted by each row's maximum
pub fn log_softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    let mut out = logits.clone();
    for mut row in out.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let log_sum = row.iter().map(|&v| (v - max).exp()).sum::<f64>().ln() + max;
        row.mapv_inplace(|v| v - log_sum);
    }
    out
}

/// Row-wise softmax probabilities
pub fn softmax_rows(logits: &Array2<f64>) -> Array2<f64> {
    log_softmax_rows(logits).mapv(f64::exp)
}

/// Column index of each row's maximum; the first maximum wins ties
pub fn argmax_rows(scores: &Array2<f64>) -> LabelVector {
    scores
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect::<Array1<usize>>()
}

/// Check that `weights` fits `data` and return `[1 | X] · W`
pub(crate) fn linear_scores(weights: &WeightMatrix, data: &FeatureMatrix) -> Result<Array2<f64>> {
    if weights.nrows() != data.ncols() + 1 {
        return Err(ClassifierError::mismatch(
            "weight rows (features + bias)",
            data.ncols() + 1,
            weights.nrows(),
        ));
    }
    Ok(augment(data).dot(weights))
}
