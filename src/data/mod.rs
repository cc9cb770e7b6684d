//! Dataset loading and preparation
//!
//! Raw digits arrive grouped by class (`train0..train9`, `test0..test9`), with
//! pixel intensities in 0–255. [`preprocess`] turns them into the three
//! [`Split`](crate::core::Split)s every classifier consumes.

pub mod idx;
pub mod mat;
pub mod preprocess;

pub use self::idx::IdxSource;
pub use self::mat::MatFileSource;
pub use self::preprocess::{
    binary_targets, build_splits, one_hot, prepare, scale_intensities, FeatureFilter, PreparedData,
    PreprocessConfig, PIXEL_MAX,
};

use crate::core::{ClassifierError, DataSource, FeatureMatrix, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-class image matrices as stored in the dataset file
#[derive(Debug, Clone)]
pub struct RawDataset {
    /// `train[c]` holds the training images of class `c`, one per row
    pub train: Vec<FeatureMatrix>,
    /// `test[c]` holds the test images of class `c`, one per row
    pub test: Vec<FeatureMatrix>,
}

impl RawDataset {
    /// Create a dataset, checking that every class has both arrays and all share a width
    pub fn new(train: Vec<FeatureMatrix>, test: Vec<FeatureMatrix>) -> Result<Self> {
        if train.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }
        if train.len() != test.len() {
            return Err(ClassifierError::mismatch(
                "test class count",
                train.len(),
                test.len(),
            ));
        }

        let n_features = train[0].ncols();
        for matrix in train.iter().chain(test.iter()) {
            if matrix.ncols() != n_features {
                return Err(ClassifierError::mismatch(
                    "image feature count",
                    n_features,
                    matrix.ncols(),
                ));
            }
        }

        Ok(Self { train, test })
    }

    pub fn n_classes(&self) -> usize {
        self.train.len()
    }

    pub fn n_features(&self) -> usize {
        self.train[0].ncols()
    }

    pub fn n_train_images(&self) -> usize {
        self.train.iter().map(|m| m.nrows()).sum()
    }

    pub fn n_test_images(&self) -> usize {
        self.test.iter().map(|m| m.nrows()).sum()
    }
}

/// On-disk layout of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// MATLAB v5 file with `train<c>`/`test<c>` arrays
    #[default]
    Mat,
    /// Directory holding the four IDX files of the MNIST distribution
    Idx,
}

/// Open the data source for `path` in the given format
pub fn open_source<P: AsRef<Path>>(path: P, format: DatasetFormat) -> Box<dyn DataSource> {
    match format {
        DatasetFormat::Mat => Box::new(MatFileSource::new(path)),
        DatasetFormat::Idx => Box::new(IdxSource::from_dir(path)),
    }
}
