//! Tiny IDX and MAT datasets shared by the integration tests

#![allow(dead_code)]

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const N_CLASSES: usize = 3;
pub const TRAIN_PER_CLASS: usize = 6;
pub const TEST_PER_CLASS: usize = 3;
pub const N_VALIDATION: usize = 2;

/// 2×2 image of class `class`: pixel `class` is bright, the last pixel is always off
pub fn image(class: usize, variant: usize) -> [u8; 4] {
    let mut pixels = [(variant * 7 % 20) as u8, (variant * 11 % 20) as u8, (variant * 5 % 20) as u8, 0];
    pixels[class] = 200 + (variant * 9 % 50) as u8;
    pixels
}

/// Images interleaved across classes, the way the MNIST files store them
fn images_and_labels(per_class: usize) -> (Vec<u8>, Vec<u8>) {
    let mut pixels = Vec::new();
    let mut labels = Vec::new();
    for variant in 0..per_class {
        for class in 0..N_CLASSES {
            pixels.extend_from_slice(&image(class, variant));
            labels.push(class as u8);
        }
    }
    (pixels, labels)
}

pub fn write_images(path: &Path, pixels: &[u8], rows: u32, cols: u32) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let count = pixels.len() as u32 / (rows * cols);
    writer.write_u32::<BigEndian>(2051)?;
    writer.write_u32::<BigEndian>(count)?;
    writer.write_u32::<BigEndian>(rows)?;
    writer.write_u32::<BigEndian>(cols)?;
    writer.write_all(pixels)?;
    writer.flush()
}

pub fn write_labels(path: &Path, labels: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_u32::<BigEndian>(2049)?;
    writer.write_u32::<BigEndian>(labels.len() as u32)?;
    writer.write_all(labels)?;
    writer.flush()
}

/// Write the four MNIST-named IDX files into `dir`
pub fn write_idx_dataset(dir: &Path) -> io::Result<()> {
    let (train_pixels, train_labels) = images_and_labels(TRAIN_PER_CLASS);
    let (test_pixels, test_labels) = images_and_labels(TEST_PER_CLASS);
    write_images(&dir.join("train-images-idx3-ubyte"), &train_pixels, 2, 2)?;
    write_labels(&dir.join("train-labels-idx1-ubyte"), &train_labels)?;
    write_images(&dir.join("t10k-images-idx3-ubyte"), &test_pixels, 2, 2)?;
    write_labels(&dir.join("t10k-labels-idx1-ubyte"), &test_labels)
}

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_MATRIX: u32 = 14;
const MX_UINT8_CLASS: u32 = 9;

/// Long-format data element, padded to an 8-byte boundary
fn mat_element(buf: &mut Vec<u8>, data_type: u32, data: &[u8]) -> io::Result<()> {
    buf.write_u32::<LittleEndian>(data_type)?;
    buf.write_u32::<LittleEndian>(data.len() as u32)?;
    buf.extend_from_slice(data);
    buf.resize(buf.len() + (8 - data.len() % 8) % 8, 0);
    Ok(())
}

/// Uncompressed `uint8` matrix element holding `images` as rows
fn mat_matrix(buf: &mut Vec<u8>, name: &str, images: &[[u8; 4]]) -> io::Result<()> {
    let mut body = Vec::new();

    let mut flags = Vec::new();
    flags.write_u32::<LittleEndian>(MX_UINT8_CLASS)?;
    flags.write_u32::<LittleEndian>(0)?;
    mat_element(&mut body, MI_UINT32, &flags)?;

    let mut dims = Vec::new();
    dims.write_i32::<LittleEndian>(images.len() as i32)?;
    dims.write_i32::<LittleEndian>(4)?;
    mat_element(&mut body, MI_INT32, &dims)?;

    mat_element(&mut body, MI_INT8, name.as_bytes())?;

    // MATLAB stores column by column
    let column_major: Vec<u8> = (0..4)
        .flat_map(|col| images.iter().map(move |image| image[col]))
        .collect();
    mat_element(&mut body, MI_UINT8, &column_major)?;

    buf.write_u32::<LittleEndian>(MI_MATRIX)?;
    buf.write_u32::<LittleEndian>(body.len() as u32)?;
    buf.extend_from_slice(&body);
    Ok(())
}

/// Write a little-endian MAT v5 file with one `n×4` matrix per entry
pub fn write_mat<S: AsRef<str>>(path: &Path, arrays: &[(S, Vec<[u8; 4]>)]) -> io::Result<()> {
    let mut buf = Vec::new();
    let mut text = b"MATLAB 5.0 MAT-file, written by the digitclf tests".to_vec();
    text.resize(116, b' ');
    buf.extend_from_slice(&text);
    buf.extend_from_slice(&[0u8; 8]);
    buf.write_u16::<LittleEndian>(0x0100)?;
    buf.extend_from_slice(b"IM");

    for (name, images) in arrays {
        mat_matrix(&mut buf, name.as_ref(), images)?;
    }
    std::fs::write(path, buf)
}

/// `per_class` images of `class`
pub fn class_images(class: usize, per_class: usize) -> Vec<[u8; 4]> {
    (0..per_class).map(|variant| image(class, variant)).collect()
}

/// The IDX dataset's images as `train0`…`test2` arrays in a MAT file
pub fn write_mat_dataset(path: &Path) -> io::Result<()> {
    let mut arrays = Vec::new();
    for class in 0..N_CLASSES {
        arrays.push((format!("train{class}"), class_images(class, TRAIN_PER_CLASS)));
        arrays.push((format!("test{class}"), class_images(class, TEST_PER_CLASS)));
    }
    write_mat(path, &arrays)
}

/// JSON run configuration pointing at an IDX dataset in `dir`
pub fn config_json(dir: &Path, report: Option<&Path>) -> String {
    let report = match report {
        Some(path) => format!("{:?}", path.display().to_string()),
        None => "null".to_string(),
    };
    format!(
        r#"{{
    "dataset": {:?},
    "format": "idx",
    "n_validation": {N_VALIDATION},
    "svm": {{"configurations": [{{"kernel": "linear"}}, {{"kernel": "rbf", "c": 10.0}}]}},
    "report": {report}
}}"#,
        dir.display().to_string()
    )
}
