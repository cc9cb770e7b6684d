//! Run configuration
//!
//! A [`RunConfig`] is read from a JSON file (every field optional) and then
//! overridden by command line flags.

use crate::core::{ClassifierError, MinimizeOptions, Result, SolverConfig};
use crate::data::{DatasetFormat, PreprocessConfig};
use crate::optimizer::OptimizationMethod;
use crate::svm::SvmConfig;
use crate::sweep::default_configurations;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Settings of the logistic regression stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticSettings {
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    pub method: OptimizationMethod,
}

impl Default for LogisticSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            gradient_tolerance: 1e-5,
            method: OptimizationMethod::default(),
        }
    }
}

/// Settings of the SVM sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmSettings {
    /// Stopping tolerance on the maximal KKT violation
    pub tolerance: f64,
    pub max_iterations: usize,
    pub cache_size_mb: usize,
    pub configurations: Vec<SvmConfig>,
}

impl Default for SvmSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 10_000_000,
            cache_size_mb: 200,
            configurations: default_configurations(),
        }
    }
}

/// Everything a full run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dataset: PathBuf,
    pub format: DatasetFormat,
    /// Images per class held out for validation
    pub n_validation: usize,
    pub variance_threshold: f64,
    pub logistic: LogisticSettings,
    pub svm: SvmSettings,
    pub run_binary: bool,
    pub run_svm: bool,
    pub run_multiclass: bool,
    /// Where to write the JSON run summary, if anywhere
    pub report: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("mnist_all.mat"),
            format: DatasetFormat::default(),
            n_validation: 1000,
            variance_threshold: 0.001,
            logistic: LogisticSettings::default(),
            svm: SvmSettings::default(),
            run_binary: true,
            run_svm: true,
            run_multiclass: true,
            report: None,
        }
    }
}

impl RunConfig {
    /// Read a JSON configuration; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ClassifierError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.logistic.max_iterations == 0 {
            return Err(ClassifierError::InvalidParameter(
                "logistic.max_iterations must be positive".to_string(),
            ));
        }
        if !(self.logistic.gradient_tolerance.is_finite() && self.logistic.gradient_tolerance > 0.0)
        {
            return Err(ClassifierError::InvalidParameter(format!(
                "logistic.gradient_tolerance must be positive, got {}",
                self.logistic.gradient_tolerance
            )));
        }
        if self.variance_threshold.is_nan() || self.variance_threshold < 0.0 {
            return Err(ClassifierError::InvalidParameter(format!(
                "variance_threshold must be non-negative, got {}",
                self.variance_threshold
            )));
        }
        if !(self.svm.tolerance.is_finite() && self.svm.tolerance > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "svm.tolerance must be positive, got {}",
                self.svm.tolerance
            )));
        }
        if self.svm.max_iterations == 0 {
            return Err(ClassifierError::InvalidParameter(
                "svm.max_iterations must be positive".to_string(),
            ));
        }
        for config in &self.svm.configurations {
            let c = config.c_value();
            if !(c.is_finite() && c > 0.0) {
                return Err(ClassifierError::InvalidParameter(format!(
                    "C must be positive in configuration '{config}'"
                )));
            }
        }
        Ok(())
    }

    pub fn minimize_options(&self) -> MinimizeOptions {
        MinimizeOptions {
            max_iterations: self.logistic.max_iterations,
            gradient_tolerance: self.logistic.gradient_tolerance,
            ..MinimizeOptions::default()
        }
    }

    /// Solver settings shared by every sweep entry; `c` is set per entry
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            epsilon: self.svm.tolerance,
            max_iterations: self.svm.max_iterations,
            cache_size: self.svm.cache_size_mb * 1024 * 1024,
            ..SolverConfig::default()
        }
    }

    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            n_validation: self.n_validation,
            variance_threshold: self.variance_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.dataset, PathBuf::from("mnist_all.mat"));
        assert_eq!(config.n_validation, 1000);
        assert_eq!(config.svm.configurations.len(), 14);
        assert!(config.run_binary && config.run_svm && config.run_multiclass);
        assert!(config.validate().is_ok());

        assert_eq!(config.minimize_options().max_iterations, 100);
        assert_eq!(config.solver_config().cache_size, 200 * 1024 * 1024);
        assert_eq!(config.preprocess_config().variance_threshold, 0.001);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "format": "idx",
                "logistic": {{"max_iterations": 50, "method": "gradient-descent"}},
                "svm": {{"configurations": [{{"kernel": "linear"}}]}},
                "run_multiclass": false
            }}"#
        )
        .unwrap();

        let config = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(config.format, DatasetFormat::Idx);
        assert_eq!(config.logistic.max_iterations, 50);
        assert_eq!(config.logistic.method, OptimizationMethod::GradientDescent);
        assert_eq!(config.logistic.gradient_tolerance, 1e-5);
        assert_eq!(config.svm.configurations.len(), 1);
        assert_eq!(config.svm.configurations[0].kernel, KernelType::Linear);
        assert_eq!(config.svm.tolerance, 1e-3);
        assert!(!config.run_multiclass);
        assert!(config.run_svm);
    }

    #[test]
    fn test_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            RunConfig::from_file(file.path()),
            Err(ClassifierError::ParseError(_))
        ));
        assert!(matches!(
            RunConfig::from_file("/nonexistent/digitclf.json"),
            Err(ClassifierError::IoError(_))
        ));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = RunConfig::default();
        config.logistic.max_iterations = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.svm.configurations = vec![SvmConfig::rbf().with_c(-1.0)];
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.variance_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }
}
