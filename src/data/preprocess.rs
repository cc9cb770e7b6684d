//! Split construction, feature filtering and scaling

use crate::core::{ClassifierError, DataSplits, FeatureMatrix, LabelVector, Result, Split};
use crate::data::RawDataset;
use log::{debug, info};
use ndarray::{concatenate, s, Array1, Array2, ArrayView2, Axis};

/// Largest raw pixel intensity
pub const PIXEL_MAX: f64 = 255.0;

/// Parameters of [`prepare`]
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Images per class moved from the training arrays into validation
    pub n_validation: usize,
    /// Columns whose training standard deviation does not exceed this are dropped
    pub variance_threshold: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            n_validation: 1000,
            variance_threshold: 0.001,
        }
    }
}

/// Splits ready for training plus the column filter that produced them
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub splits: DataSplits,
    pub filter: FeatureFilter,
}

/// Build the three splits, drop constant columns and scale to `[0, 1]`
pub fn prepare(raw: &RawDataset, config: &PreprocessConfig) -> Result<PreparedData> {
    let (mut train, mut validation, mut test) = build_splits(raw, config.n_validation)?;

    let filter = FeatureFilter::fit(&train.data, config.variance_threshold)?;
    info!(
        "Retaining {} of {} features (std > {})",
        filter.n_retained(),
        filter.n_input(),
        config.variance_threshold
    );

    for split in [&mut train, &mut validation, &mut test] {
        split.data = filter.apply(&split.data)?;
        scale_intensities(&mut split.data);
    }

    Ok(PreparedData {
        splits: DataSplits {
            train,
            validation,
            test,
            n_classes: raw.n_classes(),
        },
        filter,
    })
}

/// Partition per-class arrays into (train, validation, test)
///
/// The first `n_validation` rows of each class's training array become
/// validation data, the rest stay training data. Test data is every class's
/// test array. Rows are stacked class by class and labelled with the class index.
pub fn build_splits(raw: &RawDataset, n_validation: usize) -> Result<(Split, Split, Split)> {
    for (class, images) in raw.train.iter().enumerate() {
        if images.nrows() < n_validation {
            return Err(ClassifierError::InvalidDataset(format!(
                "class {class} has {} training images, fewer than the {n_validation} validation images requested",
                images.nrows()
            )));
        }
    }

    let validation_parts: Vec<ArrayView2<f64>> = raw
        .train
        .iter()
        .map(|m| m.slice(s![..n_validation, ..]))
        .collect();
    let train_parts: Vec<ArrayView2<f64>> = raw
        .train
        .iter()
        .map(|m| m.slice(s![n_validation.., ..]))
        .collect();
    let test_parts: Vec<ArrayView2<f64>> = raw.test.iter().map(|m| m.view()).collect();

    let train = stack_with_labels(&train_parts)?;
    let validation = stack_with_labels(&validation_parts)?;
    let test = stack_with_labels(&test_parts)?;

    debug!(
        "Split sizes: train={} validation={} test={}",
        train.n_samples(),
        validation.n_samples(),
        test.n_samples()
    );
    Ok((train, validation, test))
}

fn stack_with_labels(parts: &[ArrayView2<f64>]) -> Result<Split> {
    let data = concatenate(Axis(0), parts)
        .map_err(|e| ClassifierError::InvalidDataset(e.to_string()))?;
    let labels: LabelVector = parts
        .iter()
        .enumerate()
        .flat_map(|(class, part)| std::iter::repeat(class).take(part.nrows()))
        .collect();
    Split::new(data, labels)
}

/// Column selection learned from the training split
#[derive(Debug, Clone)]
pub struct FeatureFilter {
    retained: Vec<usize>,
    n_input: usize,
}

impl FeatureFilter {
    /// Keep the columns of `train` whose population standard deviation exceeds `threshold`
    pub fn fit(train: &FeatureMatrix, threshold: f64) -> Result<Self> {
        if train.nrows() == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        let sigma = train.std_axis(Axis(0), 0.0);
        let retained = sigma
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > threshold)
            .map(|(i, _)| i)
            .collect();

        Ok(Self {
            retained,
            n_input: train.ncols(),
        })
    }

    /// Select the retained columns of `data`
    pub fn apply(&self, data: &FeatureMatrix) -> Result<FeatureMatrix> {
        if data.ncols() != self.n_input {
            return Err(ClassifierError::mismatch(
                "filtered feature count",
                self.n_input,
                data.ncols(),
            ));
        }
        Ok(data.select(Axis(1), &self.retained))
    }

    /// Indices of the kept columns, ascending
    pub fn retained(&self) -> &[usize] {
        &self.retained
    }

    pub fn n_retained(&self) -> usize {
        self.retained.len()
    }

    pub fn n_input(&self) -> usize {
        self.n_input
    }
}

/// Map raw 0–255 intensities onto `[0, 1]`
pub fn scale_intensities(data: &mut FeatureMatrix) {
    data.mapv_inplace(|v| v / PIXEL_MAX);
}

/// `N×n_classes` one-hot encoding of `labels`
pub fn one_hot(labels: &LabelVector, n_classes: usize) -> Result<Array2<f64>> {
    let mut encoded = Array2::zeros((labels.len(), n_classes));
    for (row, &label) in labels.iter().enumerate() {
        if label >= n_classes {
            return Err(ClassifierError::InvalidLabel { label, n_classes });
        }
        encoded[[row, label]] = 1.0;
    }
    Ok(encoded)
}

/// Indicator vector of `labels == class`, the target of one binary classifier
pub fn binary_targets(labels: &LabelVector, class: usize) -> Array1<f64> {
    labels.mapv(|l| if l == class { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn raw_fixture() -> RawDataset {
        // Column 0 is constant everywhere, column 2 varies.
        RawDataset::new(
            vec![
                array![[7.0, 0.0, 0.0], [7.0, 255.0, 51.0], [7.0, 0.0, 102.0]],
                array![[7.0, 255.0, 153.0], [7.0, 0.0, 204.0], [7.0, 255.0, 255.0]],
            ],
            vec![array![[7.0, 0.0, 0.0]], array![[7.0, 255.0, 255.0]]],
        )
        .unwrap()
    }

    #[test]
    fn test_build_splits_layout() {
        let (train, validation, test) = build_splits(&raw_fixture(), 1).unwrap();

        assert_eq!(validation.labels.to_vec(), vec![0, 1]);
        assert_eq!(validation.data.row(1).to_vec(), vec![7.0, 255.0, 153.0]);
        assert_eq!(train.labels.to_vec(), vec![0, 0, 1, 1]);
        assert_eq!(train.data.row(0).to_vec(), vec![7.0, 255.0, 51.0]);
        assert_eq!(test.labels.to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_build_splits_too_few_images() {
        assert!(matches!(
            build_splits(&raw_fixture(), 4),
            Err(ClassifierError::InvalidDataset(_))
        ));
    }

    #[test]
    fn test_constant_column_removed_from_every_split() {
        let prepared = prepare(
            &raw_fixture(),
            &PreprocessConfig {
                n_validation: 1,
                variance_threshold: 0.001,
            },
        )
        .unwrap();

        assert_eq!(prepared.filter.retained(), &[1, 2]);
        for split in [
            &prepared.splits.train,
            &prepared.splits.validation,
            &prepared.splits.test,
        ] {
            assert_eq!(split.n_features(), 2);
        }
        assert_eq!(prepared.splits.test.data.row(1).to_vec(), vec![1.0, 1.0]);
        assert_eq!(prepared.splits.validation.data.row(1).to_vec(), vec![1.0, 0.6]);
    }

    #[test]
    fn test_scaled_values_in_unit_interval() {
        let prepared = prepare(
            &raw_fixture(),
            &PreprocessConfig {
                n_validation: 1,
                variance_threshold: 0.001,
            },
        )
        .unwrap();
        assert!(prepared
            .splits
            .train
            .data
            .iter()
            .all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_filter_rejects_wrong_width() {
        let filter = FeatureFilter::fit(&array![[0.0, 1.0], [1.0, 1.0]], 0.001).unwrap();
        assert_eq!(filter.retained(), &[0]);
        assert!(filter.apply(&array![[0.0, 1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_one_hot_rows_sum_to_one() {
        let encoded = one_hot(&array![2usize, 0, 1, 2], 3).unwrap();
        for row in encoded.rows() {
            assert_eq!(row.sum(), 1.0);
        }
        assert_eq!(encoded.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_one_hot_rejects_out_of_range_label() {
        assert!(matches!(
            one_hot(&array![0usize, 3], 3),
            Err(ClassifierError::InvalidLabel { label: 3, n_classes: 3 })
        ));
    }

    #[test]
    fn test_binary_targets() {
        assert_eq!(
            binary_targets(&array![0usize, 1, 1, 2], 1).to_vec(),
            vec![0.0, 1.0, 1.0, 0.0]
        );
    }
}
