//! IDX dataset reader
//!
//! Reads the four big-endian IDX files of the standard MNIST distribution and
//! regroups the images by class, so they line up with the MATLAB layout.

use crate::core::{ClassifierError, DataSource, FeatureMatrix, Result};
use crate::data::RawDataset;
use byteorder::{BigEndian, ReadBytesExt};
use log::info;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

const LABEL_MAGIC: u32 = 2049;
const IMAGE_MAGIC: u32 = 2051;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Dataset stored as IDX image/label files
#[derive(Debug, Clone)]
pub struct IdxSource {
    train_images: PathBuf,
    train_labels: PathBuf,
    test_images: PathBuf,
    test_labels: PathBuf,
}

impl IdxSource {
    pub fn new(
        train_images: PathBuf,
        train_labels: PathBuf,
        test_images: PathBuf,
        test_labels: PathBuf,
    ) -> Self {
        Self {
            train_images,
            train_labels,
            test_images,
            test_labels,
        }
    }

    /// Use the distribution's file names inside `dir`
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(TRAIN_IMAGES),
            dir.join(TRAIN_LABELS),
            dir.join(TEST_IMAGES),
            dir.join(TEST_LABELS),
        )
    }
}

impl DataSource for IdxSource {
    fn load(&self) -> Result<RawDataset> {
        info!("Reading IDX dataset {:?}", self.train_images.parent());
        let (train_pixels, n_pixels) = read_images(&self.train_images)?;
        let train_labels = read_labels(&self.train_labels)?;
        let (test_pixels, test_n_pixels) = read_images(&self.test_images)?;
        let test_labels = read_labels(&self.test_labels)?;

        if n_pixels != test_n_pixels {
            return Err(ClassifierError::mismatch(
                "test image size",
                n_pixels,
                test_n_pixels,
            ));
        }

        let n_classes = train_labels
            .iter()
            .chain(test_labels.iter())
            .map(|&l| l as usize + 1)
            .max()
            .ok_or(ClassifierError::EmptyDataset)?;

        let train = group_by_class(&train_pixels, n_pixels, &train_labels, n_classes)?;
        let test = group_by_class(&test_pixels, n_pixels, &test_labels, n_classes)?;
        RawDataset::new(train, test)
    }

    fn describe(&self) -> String {
        match self.train_images.parent() {
            Some(dir) => format!("IDX files in {}", dir.display()),
            None => "IDX files".to_string(),
        }
    }
}

fn read_labels(path: &Path) -> Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);
    let magic = reader.read_u32::<BigEndian>()?;
    if magic != LABEL_MAGIC {
        return Err(ClassifierError::DatasetFormat(format!(
            "{}: magic number {magic}, expected {LABEL_MAGIC}",
            path.display()
        )));
    }
    let count = reader.read_u32::<BigEndian>()? as usize;

    let mut labels = Vec::with_capacity(count);
    reader.read_to_end(&mut labels)?;
    if labels.len() != count {
        return Err(ClassifierError::mismatch("label count", count, labels.len()));
    }
    Ok(labels)
}

/// Returns the flat pixel buffer and the number of pixels per image
fn read_images(path: &Path) -> Result<(Vec<u8>, usize)> {
    let mut reader = BufReader::new(File::open(path)?);
    let magic = reader.read_u32::<BigEndian>()?;
    if magic != IMAGE_MAGIC {
        return Err(ClassifierError::DatasetFormat(format!(
            "{}: magic number {magic}, expected {IMAGE_MAGIC}",
            path.display()
        )));
    }
    let count = reader.read_u32::<BigEndian>()? as usize;
    let rows = reader.read_u32::<BigEndian>()? as usize;
    let cols = reader.read_u32::<BigEndian>()? as usize;

    let mut pixels = Vec::with_capacity(count * rows * cols);
    reader.read_to_end(&mut pixels)?;
    if pixels.len() != count * rows * cols {
        return Err(ClassifierError::mismatch(
            "image pixel count",
            count * rows * cols,
            pixels.len(),
        ));
    }
    Ok((pixels, rows * cols))
}

/// Split a flat image buffer into one matrix per class, keeping file order within a class
fn group_by_class(
    pixels: &[u8],
    n_pixels: usize,
    labels: &[u8],
    n_classes: usize,
) -> Result<Vec<FeatureMatrix>> {
    let n_images = if n_pixels == 0 { 0 } else { pixels.len() / n_pixels };
    if n_images != labels.len() {
        return Err(ClassifierError::mismatch("image labels", n_images, labels.len()));
    }

    let mut per_class: Vec<Vec<f64>> = vec![Vec::new(); n_classes];
    for (image, &label) in pixels.chunks_exact(n_pixels.max(1)).zip(labels) {
        per_class[label as usize].extend(image.iter().map(|&p| f64::from(p)));
    }

    per_class
        .into_iter()
        .map(|values| {
            let rows = values.len() / n_pixels.max(1);
            Array2::from_shape_vec((rows, n_pixels), values)
                .map_err(|e| ClassifierError::DatasetFormat(e.to_string()))
        })
        .collect()
}
