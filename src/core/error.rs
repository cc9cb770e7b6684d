//! Error types for the classifiers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Optimization failed: {0}")]
    OptimizationError(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label {label}: expected a class index below {n_classes}")]
    InvalidLabel { label: usize, n_classes: usize },

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Dataset array '{0}' not found")]
    MissingArray(String),

    #[error("Unsupported dataset format: {0}")]
    DatasetFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ClassifierError {
    /// Shorthand for a [`ClassifierError::DimensionMismatch`]
    pub fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = ClassifierError::mismatch("label count", 4, 3);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch in label count: expected 4, got 3"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ClassifierError = io.into();
        assert!(matches!(err, ClassifierError::IoError(_)));
    }
}
