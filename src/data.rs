//! Various data sources.

use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::{Path, PathBuf};

use crate::config::MNIST_SIDE;
use crate::error::{Result, SynthError};
use crate::image::Image;

/// MNIST in the common CSV layout: a header line, then `label,p0,...,p783` per row.
#[derive(Debug)]
pub struct MnistCsv {
    /// Train file.
    trainfile_csv: PathBuf,
    /// Test file.
    testfile_csv: PathBuf,
}

impl MnistCsv {
    pub fn new(trainfile_csv: impl Into<PathBuf>, testfile_csv: impl Into<PathBuf>) -> Self {
        Self {
            trainfile_csv: trainfile_csv.into(),
            testfile_csv: testfile_csv.into(),
        }
    }

    /// Get `total` training images starting at row `start`.
    pub fn train_images(&self, start: usize, total: usize) -> Result<Vec<Image>> {
        read_images(&self.trainfile_csv, start, total)
    }

    /// Get `total` test images starting at row `start`.
    pub fn test_images(&self, start: usize, total: usize) -> Result<Vec<Image>> {
        read_images(&self.testfile_csv, start, total)
    }
}

/// Read labelled 28x28 images from a CSV file.
pub fn read_images(csvfile: &Path, start: usize, n: usize) -> Result<Vec<Image>> {
    let file = File::open(csvfile)?;
    let reader = BufReader::new(file);
    let mut results = vec![];
    // Additionally skip the header.
    for (idx, line) in reader.lines().enumerate().skip(1 + start).take(n) {
        let line = line?;
        let lineno = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let bad = |reason: String| SynthError::Data {
            path: csvfile.to_path_buf(),
            line: lineno,
            reason,
        };
        let fs = line
            .split(',')
            .map(|x| x.trim().parse::<u16>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| bad(e.to_string()))?;
        if fs.len() != 1 + MNIST_SIDE * MNIST_SIDE {
            return Err(bad(format!(
                "expected {} fields, got {}",
                1 + MNIST_SIDE * MNIST_SIDE,
                fs.len()
            )));
        }
        if let Some(p) = fs[1..].iter().find(|&&p| p > 255) {
            return Err(bad(format!("pixel value {p} is out of range")));
        }
        let pixels = fs[1..].iter().map(|&x| x as f32).collect();
        results.push(Image::new(pixels, MNIST_SIDE, Some(fs[0] as usize))?);
    }
    tracing::info!("Read {} images from {}", results.len(), csvfile.display());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(path: &Path, rows: &[(usize, u16)]) {
        let mut f = File::create(path).unwrap();
        writeln!(f, "label,pixels").unwrap();
        for (label, value) in rows {
            let px = vec![value.to_string(); MNIST_SIDE * MNIST_SIDE].join(",");
            writeln!(f, "{label},{px}").unwrap();
        }
    }

    #[test]
    fn test_mnist_load() {
        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");
        write_csv(&train, &[(1, 10), (2, 20), (3, 30)]);
        write_csv(&test, &[(9, 90)]);

        let mnist = MnistCsv::new(&train, &test);
        let imgs = mnist.train_images(1, 10).unwrap();
        assert_eq!(imgs.len(), 2);
        assert_eq!(imgs[0].label(), Some(2));
        assert_eq!(imgs[0].get(27, 27), 20.0);
        assert_eq!(mnist.test_images(0, 10).unwrap()[0].label(), Some(9));
    }

    #[test]
    fn test_mnist_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "label,pixels\n1,2,3\n").unwrap();
        match read_images(&path, 0, 1) {
            Err(SynthError::Data { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected data error, got {other:?}"),
        }

        write_csv(&path, &[(1, 300)]);
        assert!(matches!(read_images(&path, 0, 1), Err(SynthError::Data { .. })));
    }
}
