//! One-vs-rest binary logistic regression

use crate::core::{
    validate_labels, ClassifierError, FeatureMatrix, LabelVector, Minimizer, Objective, Result,
    WeightMatrix,
};
use crate::data::binary_targets;
use crate::logistic::model::FitSummary;
use crate::logistic::{argmax_rows, augment, linear_scores, sigmoid, softplus};
use log::info;
use ndarray::{Array1, Array2, CowArray, Ix2};

/// Mean cross-entropy of a single sigmoid classifier
///
/// Parameters are the `D+1` bias-augmented weights `θ`; with `z = [1 | X]θ`
/// the error is `mean(y·softplus(-z) + (1-y)·softplus(z))`, which is the usual
/// `-mean(y log p + (1-y) log(1-p))` without ever taking `log(0)`.
pub struct BinaryObjective<'a> {
    design: CowArray<'a, f64, Ix2>,
    targets: Array1<f64>,
}

impl<'a> BinaryObjective<'a> {
    /// Objective over `data` with 0/1 `targets`
    pub fn new(data: &FeatureMatrix, targets: Array1<f64>) -> Result<BinaryObjective<'static>> {
        BinaryObjective::build(CowArray::from(augment(data)), targets)
    }

    /// Objective over an already bias-augmented design matrix
    pub fn with_design(design: &'a Array2<f64>, targets: Array1<f64>) -> Result<Self> {
        Self::build(CowArray::from(design.view()), targets)
    }

    fn build(design: CowArray<'a, f64, Ix2>, targets: Array1<f64>) -> Result<Self> {
        if design.nrows() == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        if design.nrows() != targets.len() {
            return Err(ClassifierError::mismatch(
                "binary targets",
                design.nrows(),
                targets.len(),
            ));
        }
        if targets.iter().any(|&t| t != 0.0 && t != 1.0) {
            return Err(ClassifierError::InvalidParameter(
                "binary targets must be 0 or 1".to_string(),
            ));
        }
        Ok(Self { design, targets })
    }
}

impl Objective for BinaryObjective<'_> {
    fn dimension(&self) -> usize {
        self.design.ncols()
    }

    fn evaluate(&self, params: &Array1<f64>) -> Result<(f64, Array1<f64>)> {
        if params.len() != self.dimension() {
            return Err(ClassifierError::mismatch(
                "binary weights",
                self.dimension(),
                params.len(),
            ));
        }
        let n = self.design.nrows() as f64;
        let z = self.design.dot(params);

        let error = z
            .iter()
            .zip(self.targets.iter())
            .map(|(&z, &y)| y * softplus(-z) + (1.0 - y) * softplus(z))
            .sum::<f64>()
            / n;

        let residual = z.mapv(sigmoid) - &self.targets;
        let gradient = self.design.t().dot(&residual) / n;
        Ok((error, gradient))
    }
}

/// Train one sigmoid classifier per class, each against all the others
///
/// Column `k` of the returned matrix separates class `k` from the rest.
pub fn train_one_vs_rest<M: Minimizer>(
    minimizer: &M,
    data: &FeatureMatrix,
    labels: &LabelVector,
    n_classes: usize,
) -> Result<(WeightMatrix, Vec<FitSummary>)> {
    validate_labels(data, labels, n_classes)?;

    let design = augment(data);
    let mut weights = Array2::zeros((design.ncols(), n_classes));
    let mut fits = Vec::with_capacity(n_classes);

    for class in 0..n_classes {
        let objective = BinaryObjective::with_design(&design, binary_targets(labels, class))?;
        let result = minimizer.minimize(&objective, Array1::zeros(design.ncols()))?;
        info!(
            "Class {class}: error {:.6} after {} iterations{}",
            result.value,
            result.iterations,
            if result.converged { "" } else { " (not converged)" }
        );

        weights.column_mut(class).assign(&result.params);
        fits.push(FitSummary::from_result(Some(class), &result));
    }

    Ok((weights, fits))
}

/// Label each row with the class whose logit is largest
///
/// Ranks logits rather than sigmoid scores, which saturate to 1.0 and tie.
pub fn predict_one_vs_rest(weights: &WeightMatrix, data: &FeatureMatrix) -> Result<LabelVector> {
    Ok(argmax_rows(&linear_scores(weights, data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MinimizeOptions, OptimizeResult};
    use crate::optimizer::ConjugateGradient;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Returns its starting point untouched
    struct Identity;

    impl Minimizer for Identity {
        fn minimize<O: Objective + ?Sized>(
            &self,
            objective: &O,
            initial: Array1<f64>,
        ) -> Result<OptimizeResult> {
            let (value, _) = objective.evaluate(&initial)?;
            Ok(OptimizeResult {
                params: initial,
                value,
                iterations: 0,
                evaluations: 1,
                converged: false,
            })
        }
    }

    fn random_problem(rng: &mut StdRng, n: usize, d: usize) -> (FeatureMatrix, Array1<f64>) {
        let data = Array2::from_shape_fn((n, d), |_| rng.gen_range(0.0..1.0));
        let targets = Array1::from_shape_fn(n, |_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
        (data, targets)
    }

    #[test]
    fn test_error_at_zero_weights_is_ln2() {
        let objective =
            BinaryObjective::new(&array![[0.5, 0.1], [0.2, 0.9]], array![1.0, 0.0]).unwrap();
        let (error, gradient) = objective.evaluate(&Array1::zeros(3)).unwrap();

        assert_relative_eq!(error, std::f64::consts::LN_2, epsilon = 1e-12);
        // bias gradient = mean(0.5 - y) = 0
        assert_relative_eq!(gradient[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(gradient[1], 0.5 * (0.5 * -0.5 + 0.2 * 0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_error_non_negative_and_finite() {
        let mut rng = StdRng::seed_from_u64(7);
        let (data, targets) = random_problem(&mut rng, 20, 4);
        let objective = BinaryObjective::new(&data, targets).unwrap();

        for scale in [0.0, 1.0, 50.0, 1e4] {
            let params = Array1::from_shape_fn(5, |_| scale * rng.gen_range(-1.0..1.0));
            let (error, gradient) = objective.evaluate(&params).unwrap();
            assert!(error >= 0.0);
            assert!(error.is_finite());
            assert!(gradient.iter().all(|g| g.is_finite()));
        }
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(42);
        let (data, targets) = random_problem(&mut rng, 12, 3);
        let objective = BinaryObjective::new(&data, targets).unwrap();
        let params = Array1::from_shape_fn(4, |_| rng.gen_range(-2.0..2.0));

        let (_, gradient) = objective.evaluate(&params).unwrap();
        let h = 1e-6;
        for i in 0..params.len() {
            let mut plus = params.clone();
            let mut minus = params.clone();
            plus[i] += h;
            minus[i] -= h;
            let numeric = (objective.evaluate(&plus).unwrap().0
                - objective.evaluate(&minus).unwrap().0)
                / (2.0 * h);
            assert_relative_eq!(gradient[i], numeric, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rejects_non_binary_targets() {
        let result = BinaryObjective::new(&array![[0.5], [0.2]], array![1.0, 2.0]);
        assert!(matches!(result, Err(ClassifierError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_wrong_parameter_length() {
        let objective = BinaryObjective::new(&array![[0.5], [0.2]], array![1.0, 0.0]).unwrap();
        assert!(objective.evaluate(&Array1::zeros(3)).is_err());
    }

    #[test]
    fn test_identity_minimizer_yields_zero_weights() {
        let data = array![[0.1, 0.2], [0.9, 0.8], [0.5, 0.5]];
        let labels = array![0usize, 1, 2];
        let (weights, fits) = train_one_vs_rest(&Identity, &data, &labels, 3).unwrap();

        assert_eq!(weights.shape(), &[3, 3]);
        assert!(weights.iter().all(|&w| w == 0.0));
        assert_eq!(fits.len(), 3);
        // all logits tie at 0, so every row goes to class 0
        assert_eq!(predict_one_vs_rest(&weights, &data).unwrap().to_vec(), vec![0, 0, 0]);
    }

    #[test]
    fn test_separable_two_class_problem() {
        let data = array![[0.1, 0.2], [0.2, 0.1], [0.8, 0.9], [0.9, 0.8]];
        let labels = array![0usize, 0, 1, 1];
        let minimizer = ConjugateGradient::new(MinimizeOptions::default());

        let (weights, _) = train_one_vs_rest(&minimizer, &data, &labels, 2).unwrap();
        let predicted = predict_one_vs_rest(&weights, &data).unwrap();
        assert_eq!(predicted, labels);
    }

    #[test]
    fn test_large_logits_do_not_tie() {
        // bias-only weights: logits 40 and 50 both map to sigmoid 1.0
        let weights = array![[40.0, 50.0], [0.0, 0.0]];
        let predicted = predict_one_vs_rest(&weights, &array![[1.0], [0.0]]).unwrap();
        assert_eq!(predicted.to_vec(), vec![1, 1]);
    }

    #[test]
    fn test_train_rejects_out_of_range_label() {
        let result = train_one_vs_rest(&Identity, &array![[0.0], [1.0]], &array![0usize, 5], 2);
        assert!(matches!(
            result,
            Err(ClassifierError::InvalidLabel { label: 5, n_classes: 2 })
        ));
    }
}
