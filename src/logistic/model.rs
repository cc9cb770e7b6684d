//! Builder-style interface over the two logistic regression flavours

use crate::core::{
    ClassifierError, FeatureMatrix, LabelVector, MinimizeOptions, Minimizer, OptimizeResult,
    Result, Split, WeightMatrix, N_DIGIT_CLASSES,
};
use crate::logistic::{
    linear_scores, predict_multinomial, predict_one_vs_rest, sigmoid, softmax_rows,
    train_multinomial, train_one_vs_rest,
};
use crate::metrics::accuracy;
use crate::optimizer::ConjugateGradient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the weight columns are trained and scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogisticMode {
    /// One sigmoid classifier per class
    OneVsRest,
    /// One softmax classifier over all classes
    Multinomial,
}

impl fmt::Display for LogisticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogisticMode::OneVsRest => f.write_str("one-vs-rest"),
            LogisticMode::Multinomial => f.write_str("multinomial"),
        }
    }
}

/// Outcome of one minimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Class the run trained, `None` for the joint softmax fit
    pub class: Option<usize>,
    pub iterations: usize,
    /// Final training error
    pub value: f64,
    pub converged: bool,
}

impl FitSummary {
    pub fn from_result(class: Option<usize>, result: &OptimizeResult) -> Self {
        Self {
            class,
            iterations: result.iterations,
            value: result.value,
            converged: result.converged,
        }
    }
}

/// Logistic regression with builder pattern
///
/// ```rust,no_run
/// use digitclf::logistic::LogisticRegression;
/// # fn run(split: &digitclf::core::Split) -> digitclf::core::Result<()> {
/// let model = LogisticRegression::multinomial().fit(split)?;
/// println!("{:.2}%", model.evaluate(split)? * 100.0);
/// # Ok(())
/// # }
/// ```
pub struct LogisticRegression<M: Minimizer = ConjugateGradient> {
    mode: LogisticMode,
    minimizer: M,
    n_classes: usize,
}

impl LogisticRegression<ConjugateGradient> {
    pub fn new(mode: LogisticMode) -> Self {
        Self {
            mode,
            minimizer: ConjugateGradient::new(MinimizeOptions::default()),
            n_classes: N_DIGIT_CLASSES,
        }
    }

    pub fn one_vs_rest() -> Self {
        Self::new(LogisticMode::OneVsRest)
    }

    pub fn multinomial() -> Self {
        Self::new(LogisticMode::Multinomial)
    }
}

impl<M: Minimizer> LogisticRegression<M> {
    /// Train with a different minimizer
    pub fn with_minimizer<N: Minimizer>(self, minimizer: N) -> LogisticRegression<N> {
        LogisticRegression {
            mode: self.mode,
            minimizer,
            n_classes: self.n_classes,
        }
    }

    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    pub fn mode(&self) -> LogisticMode {
        self.mode
    }

    /// Train on a labelled split, starting from all-zero weights
    pub fn fit(&self, split: &Split) -> Result<TrainedLogistic> {
        self.fit_arrays(&split.data, &split.labels)
    }

    pub fn fit_arrays(&self, data: &FeatureMatrix, labels: &LabelVector) -> Result<TrainedLogistic> {
        let (weights, fits) = match self.mode {
            LogisticMode::OneVsRest => {
                train_one_vs_rest(&self.minimizer, data, labels, self.n_classes)?
            }
            LogisticMode::Multinomial => {
                let (weights, fit) =
                    train_multinomial(&self.minimizer, data, labels, self.n_classes)?;
                (weights, vec![fit])
            }
        };
        Ok(TrainedLogistic {
            mode: self.mode,
            weights,
            fits,
        })
    }
}

/// Trained weights plus how training went
#[derive(Debug, Clone)]
pub struct TrainedLogistic {
    mode: LogisticMode,
    weights: WeightMatrix,
    fits: Vec<FitSummary>,
}

impl TrainedLogistic {
    /// Wrap an existing `(D+1)×K` weight matrix
    pub fn from_weights(mode: LogisticMode, weights: WeightMatrix) -> Result<Self> {
        if weights.nrows() < 1 || weights.ncols() < 2 {
            return Err(ClassifierError::InvalidParameter(format!(
                "weight matrix must be (features + 1) x classes, got {}x{}",
                weights.nrows(),
                weights.ncols()
            )));
        }
        Ok(Self {
            mode,
            weights,
            fits: Vec::new(),
        })
    }

    pub fn predict(&self, data: &FeatureMatrix) -> Result<LabelVector> {
        match self.mode {
            LogisticMode::OneVsRest => predict_one_vs_rest(&self.weights, data),
            LogisticMode::Multinomial => predict_multinomial(&self.weights, data),
        }
    }

    /// Per-class scores: independent sigmoids for one-vs-rest, softmax rows otherwise
    pub fn probabilities(&self, data: &FeatureMatrix) -> Result<ndarray::Array2<f64>> {
        let scores = linear_scores(&self.weights, data)?;
        Ok(match self.mode {
            LogisticMode::OneVsRest => scores.mapv(sigmoid),
            LogisticMode::Multinomial => softmax_rows(&scores),
        })
    }

    /// Fraction of `split` predicted correctly
    pub fn evaluate(&self, split: &Split) -> Result<f64> {
        let predicted = self.predict(&split.data)?;
        accuracy(&predicted, &split.labels)
    }

    pub fn mode(&self) -> LogisticMode {
        self.mode
    }

    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    pub fn fits(&self) -> &[FitSummary] {
        &self.fits
    }

    pub fn n_classes(&self) -> usize {
        self.weights.ncols()
    }
}
