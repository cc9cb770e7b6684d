//! The fixed list of SVM settings compared against logistic regression

use crate::core::{DataSplits, Result};
use crate::metrics::AccuracyReport;
use crate::svm::{SvmBackend, SvmConfig};
use log::info;
use serde::{Deserialize, Serialize};

/// The fourteen settings evaluated by a full run, in order
///
/// Linear kernel; RBF with gamma 1; RBF with the default gamma; then the
/// default gamma with C = 1 and C = 10, 20, ..., 100.
pub fn default_configurations() -> Vec<SvmConfig> {
    let mut configs = vec![
        SvmConfig::linear(),
        SvmConfig::rbf().with_gamma(1.0),
        SvmConfig::rbf(),
        SvmConfig::rbf().with_c(1.0),
    ];
    configs.extend((1..=10).map(|k| SvmConfig::rbf().with_c(10.0 * k as f64)));
    configs
}

/// Accuracy of one sweep entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub config: SvmConfig,
    pub report: AccuracyReport,
}

/// Evaluate every configuration in order
///
/// `on_result` sees each result as soon as it is available; the first
/// failing configuration aborts the sweep.
pub fn run_sweep<B, F>(
    backend: &B,
    splits: &DataSplits,
    configs: &[SvmConfig],
    mut on_result: F,
) -> Result<Vec<SweepResult>>
where
    B: SvmBackend + ?Sized,
    F: FnMut(&SweepResult),
{
    let mut results = Vec::with_capacity(configs.len());
    for (position, config) in configs.iter().enumerate() {
        info!("SVM configuration {}/{}: {config}", position + 1, configs.len());
        let report = backend.fit_and_score(splits, config)?;
        let result = SweepResult {
            config: *config,
            report,
        };
        on_result(&result);
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassifierError, Split};
    use crate::kernel::{Gamma, KernelType};
    use ndarray::array;
    use std::cell::RefCell;

    /// Reports C / 100 for every split and records what it was asked
    struct StubBackend {
        seen: RefCell<Vec<SvmConfig>>,
        fail_on: Option<f64>,
    }

    impl SvmBackend for StubBackend {
        fn fit_and_score(&self, _splits: &DataSplits, config: &SvmConfig) -> Result<AccuracyReport> {
            self.seen.borrow_mut().push(*config);
            if Some(config.c_value()) == self.fail_on {
                return Err(ClassifierError::OptimizationError("stub".to_string()));
            }
            let score = config.c_value() / 100.0;
            Ok(AccuracyReport::new(score, score, score))
        }
    }

    fn splits() -> DataSplits {
        let split = Split::new(array![[0.0], [1.0]], array![0usize, 1]).unwrap();
        DataSplits {
            train: split.clone(),
            validation: split.clone(),
            test: split,
            n_classes: 2,
        }
    }

    #[test]
    fn test_default_configurations() {
        let configs = default_configurations();
        assert_eq!(configs.len(), 14);
        assert_eq!(configs[0].kernel, KernelType::Linear);
        assert_eq!(configs[1].gamma, Gamma::Value(1.0));
        assert_eq!(configs[2], SvmConfig::rbf());
        assert_eq!(configs[3].c, Some(1.0));

        let cs: Vec<f64> = configs[4..].iter().map(|c| c.c_value()).collect();
        assert_eq!(cs, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]);
        assert!(configs[1..].iter().all(|c| c.kernel == KernelType::Rbf));
    }

    #[test]
    fn test_sweep_runs_in_order() {
        let backend = StubBackend {
            seen: RefCell::new(Vec::new()),
            fail_on: None,
        };
        let configs = default_configurations();
        let mut streamed = 0;

        let results = run_sweep(&backend, &splits(), &configs, |_| streamed += 1).unwrap();

        assert_eq!(results.len(), 14);
        assert_eq!(streamed, 14);
        assert_eq!(*backend.seen.borrow(), configs);
        assert_eq!(results[13].report.testing, 1.0);
    }

    #[test]
    fn test_sweep_stops_at_first_failure() {
        let backend = StubBackend {
            seen: RefCell::new(Vec::new()),
            fail_on: Some(20.0),
        };
        let result = run_sweep(&backend, &splits(), &default_configurations(), |_| {});

        assert!(result.is_err());
        // linear, gamma=1, default, C=1, C=10, C=20
        assert_eq!(backend.seen.borrow().len(), 6);
    }
}
