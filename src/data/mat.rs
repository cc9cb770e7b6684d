//! MATLAB v5 dataset reader
//!
//! The classic digit file stores one `n×784` array per class and split:
//! `train0` … `train9` and `test0` … `test9`. MATLAB arrays are column-major,
//! so each one is transposed into row-major sample order on the way in.

use crate::core::{ClassifierError, DataSource, FeatureMatrix, Result};
use crate::data::RawDataset;
use log::{debug, info};
use matfile::{MatFile, NumericData};
use ndarray::{Array2, ShapeBuilder};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Dataset stored as a `.mat` file
#[derive(Debug, Clone)]
pub struct MatFileSource {
    path: PathBuf,
}

impl MatFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for MatFileSource {
    fn load(&self) -> Result<RawDataset> {
        info!("Reading MATLAB dataset {:?}", self.path);
        let file = File::open(&self.path)?;
        let mat = MatFile::parse(BufReader::new(file))
            .map_err(|e| ClassifierError::DatasetFormat(e.to_string()))?;

        let mut train = Vec::new();
        let mut test = Vec::new();

        // Classes are numbered contiguously from zero; stop at the first gap.
        for class in 0.. {
            let train_name = format!("train{class}");
            let array = match mat.find_by_name(&train_name) {
                Some(array) => array,
                None => break,
            };
            let test_name = format!("test{class}");
            let test_array = mat
                .find_by_name(&test_name)
                .ok_or(ClassifierError::MissingArray(test_name))?;

            train.push(to_matrix(&train_name, array.size(), array.data())?);
            test.push(to_matrix(
                &format!("test{class}"),
                test_array.size(),
                test_array.data(),
            )?);
            debug!(
                "class {class}: {} training and {} test images",
                train[class].nrows(),
                test[class].nrows()
            );
        }

        if train.is_empty() {
            return Err(ClassifierError::MissingArray("train0".to_string()));
        }

        RawDataset::new(train, test)
    }

    fn describe(&self) -> String {
        format!("MATLAB file {}", self.path.display())
    }
}

/// Convert a column-major MATLAB array into a row-major sample matrix
pub(crate) fn to_matrix(name: &str, size: &[usize], data: &NumericData) -> Result<FeatureMatrix> {
    if size.len() != 2 {
        return Err(ClassifierError::DatasetFormat(format!(
            "array '{name}' has {} dimensions, expected 2",
            size.len()
        )));
    }
    let (rows, cols) = (size[0], size[1]);
    let values = numeric_to_f64(name, data)?;

    let matrix = Array2::from_shape_vec((rows, cols).f(), values)
        .map_err(|e| ClassifierError::DatasetFormat(format!("array '{name}': {e}")))?;
    Ok(matrix.as_standard_layout().into_owned())
}

fn numeric_to_f64(name: &str, data: &NumericData) -> Result<Vec<f64>> {
    let values = match data {
        NumericData::UInt8 { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::Int8 { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::UInt16 { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::Int16 { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::UInt32 { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::Int32 { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::UInt64 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::Int64 { real, .. } => real.iter().map(|&v| v as f64).collect(),
        NumericData::Single { real, .. } => real.iter().map(|&v| f64::from(v)).collect(),
        NumericData::Double { real, .. } => real.clone(),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(ClassifierError::DatasetFormat(format!(
                "array '{name}' has an unsupported element type"
            )))
        }
    };
    Ok(values)
}
