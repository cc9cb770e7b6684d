//! Dataset reader tests against IDX and MAT files written on the fly

mod common;

use digitclf::core::{ClassifierError, DataSource};
use digitclf::data::{
    open_source, prepare, DatasetFormat, IdxSource, MatFileSource, PreprocessConfig,
};
use tempfile::TempDir;

fn dataset_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    common::write_idx_dataset(dir.path()).expect("Failed to write dataset");
    dir
}

#[test]
fn test_idx_grouped_by_class() {
    let dir = dataset_dir();
    let raw = IdxSource::from_dir(dir.path()).load().expect("Load should succeed");

    assert_eq!(raw.n_classes(), common::N_CLASSES);
    assert_eq!(raw.n_features(), 4);
    assert_eq!(raw.n_train_images(), common::N_CLASSES * common::TRAIN_PER_CLASS);
    assert_eq!(raw.n_test_images(), common::N_CLASSES * common::TEST_PER_CLASS);

    for class in 0..common::N_CLASSES {
        assert_eq!(raw.train[class].nrows(), common::TRAIN_PER_CLASS);
        for variant in 0..common::TRAIN_PER_CLASS {
            let expected: Vec<f64> = common::image(class, variant)
                .iter()
                .map(|&p| f64::from(p))
                .collect();
            assert_eq!(raw.train[class].row(variant).to_vec(), expected);
        }
    }
}

#[test]
fn test_open_source_by_format() {
    let dir = dataset_dir();
    let source = open_source(dir.path(), DatasetFormat::Idx);
    assert!(source.describe().contains("IDX"));

    let raw = source.load().expect("Load should succeed");
    let prepared = prepare(
        &raw,
        &PreprocessConfig {
            n_validation: common::N_VALIDATION,
            variance_threshold: 0.001,
        },
    )
    .expect("Prepare should succeed");

    assert_eq!(prepared.filter.retained(), &[0, 1, 2]);
    assert_eq!(prepared.splits.validation.labels.to_vec(), vec![0, 0, 1, 1, 2, 2]);
    assert_eq!(
        prepared.splits.train.class_counts(common::N_CLASSES),
        vec![common::TRAIN_PER_CLASS - common::N_VALIDATION; common::N_CLASSES]
    );
}

#[test]
fn test_too_many_validation_images() {
    let dir = dataset_dir();
    let raw = IdxSource::from_dir(dir.path()).load().unwrap();
    let result = prepare(
        &raw,
        &PreprocessConfig {
            n_validation: common::TRAIN_PER_CLASS + 1,
            variance_threshold: 0.001,
        },
    );
    assert!(matches!(result, Err(ClassifierError::InvalidDataset(_))));
}

#[test]
fn test_bad_magic_number() {
    let dir = dataset_dir();
    // A label file where an image file is expected
    std::fs::copy(
        dir.path().join("train-labels-idx1-ubyte"),
        dir.path().join("train-images-idx3-ubyte"),
    )
    .unwrap();

    let result = IdxSource::from_dir(dir.path()).load();
    assert!(matches!(result, Err(ClassifierError::DatasetFormat(_))));
}

#[test]
fn test_truncated_images() {
    let dir = dataset_dir();
    common::write_images(&dir.path().join("t10k-images-idx3-ubyte"), &[0u8; 4], 2, 2).unwrap();
    // Header says one image, label file says nine
    let result = IdxSource::from_dir(dir.path()).load();
    assert!(matches!(result, Err(ClassifierError::DimensionMismatch { .. })));
}

#[test]
fn test_missing_files() {
    let dir = TempDir::new().unwrap();
    let result = IdxSource::from_dir(dir.path()).load();
    assert!(matches!(result, Err(ClassifierError::IoError(_))));

    let result = open_source(dir.path().join("mnist_all.mat"), DatasetFormat::Mat).load();
    assert!(matches!(result, Err(ClassifierError::IoError(_))));
}

#[test]
fn test_mat_arrays_read_row_major() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("digits.mat");
    common::write_mat_dataset(&path).expect("Failed to write MAT file");

    let raw = MatFileSource::new(&path).load().expect("Load should succeed");

    assert_eq!(raw.n_classes(), common::N_CLASSES);
    assert_eq!(raw.n_features(), 4);
    for class in 0..common::N_CLASSES {
        assert_eq!(raw.train[class].shape(), &[common::TRAIN_PER_CLASS, 4]);
        assert_eq!(raw.test[class].shape(), &[common::TEST_PER_CLASS, 4]);
    }
    // image(1, 3) = [1, 200 + 27, 15, 0]
    assert_eq!(raw.train[1].row(3).to_vec(), vec![1.0, 227.0, 15.0, 0.0]);
    assert_eq!(raw.test[2].row(0).to_vec(), vec![0.0, 0.0, 200.0, 0.0]);
}

#[test]
fn test_mat_and_idx_agree() {
    let dir = dataset_dir();
    let path = dir.path().join("digits.mat");
    common::write_mat_dataset(&path).unwrap();

    let from_mat = open_source(&path, DatasetFormat::Mat).load().unwrap();
    let from_idx = open_source(dir.path(), DatasetFormat::Idx).load().unwrap();
    assert_eq!(from_mat.train, from_idx.train);
    assert_eq!(from_mat.test, from_idx.test);
}

#[test]
fn test_mat_classes_stop_at_first_gap() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("digits.mat");
    common::write_mat(
        &path,
        &[
            ("train0", common::class_images(0, 2)),
            ("test0", common::class_images(0, 1)),
            ("train1", common::class_images(1, 2)),
            ("test1", common::class_images(1, 1)),
            ("train3", common::class_images(2, 2)),
            ("test3", common::class_images(2, 1)),
        ],
    )
    .unwrap();

    let raw = MatFileSource::new(&path).load().unwrap();
    assert_eq!(raw.n_classes(), 2);
}

#[test]
fn test_mat_missing_test_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("digits.mat");
    common::write_mat(
        &path,
        &[
            ("train0", common::class_images(0, 2)),
            ("train1", common::class_images(1, 2)),
            ("test0", common::class_images(0, 1)),
        ],
    )
    .unwrap();

    match MatFileSource::new(&path).load() {
        Err(ClassifierError::MissingArray(name)) => assert_eq!(name, "test1"),
        other => panic!("expected MissingArray, got {other:?}"),
    }
}

#[test]
fn test_mat_without_train_arrays() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("digits.mat");
    common::write_mat(&path, &[("test0", common::class_images(0, 1))]).unwrap();

    match MatFileSource::new(&path).load() {
        Err(ClassifierError::MissingArray(name)) => assert_eq!(name, "train0"),
        other => panic!("expected MissingArray, got {other:?}"),
    }
}

#[test]
fn test_idx_file_is_not_a_mat_file() {
    let dir = dataset_dir();
    let result = MatFileSource::new(dir.path().join("train-images-idx3-ubyte")).load();
    assert!(matches!(result, Err(ClassifierError::DatasetFormat(_))));
}
