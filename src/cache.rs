//! On-disk cache of noisy datasets, one file per compression factor.

use std::path::{Path, PathBuf};

use crate::config::CompressionFactor;
use crate::db::ArrayFile;
use crate::dataset::NoisyDataset;
use crate::error::{Result, SynthError};
use crate::matrix::Matrix;

pub const NOISY_TRAIN: &str = "noisy_train";
pub const NOISY_TEST: &str = "noisy_test";

/// Whether a cache file for a factor exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Absent,
    Present(PathBuf),
}

/// Row counts the cached arrays must have to pair with the current clean data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedRows {
    pub train: usize,
    pub test: usize,
}

#[derive(Debug, Clone)]
pub struct DatasetCache {
    dir: PathBuf,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for a factor, e.g. `noisy_7x7.sqlite`.
    pub fn path_for(&self, factor: &CompressionFactor) -> PathBuf {
        self.dir.join(format!("noisy_{factor}.sqlite"))
    }

    pub fn state(&self, factor: &CompressionFactor) -> CacheState {
        let path = self.path_for(factor);
        if path.exists() {
            CacheState::Present(path)
        } else {
            CacheState::Absent
        }
    }

    /// Return the cached dataset for `factor`, or run `generator` and cache its output.
    ///
    /// A present but unusable cache file is an error; it is never regenerated behind the
    /// caller's back. When `expected` is given, cached row counts must match it.
    pub fn get_or_create<F>(
        &self,
        factor: &CompressionFactor,
        expected: Option<ExpectedRows>,
        generator: F,
    ) -> Result<NoisyDataset>
    where
        F: FnOnce() -> Result<NoisyDataset>,
    {
        match self.state(factor) {
            CacheState::Present(path) => {
                tracing::info!("Loading cached dataset from {}", path.display());
                self.load(&path, factor, expected)
            }
            CacheState::Absent => {
                tracing::info!("No cache for {factor}, generating dataset");
                let dataset = generator()?;
                self.store(factor, &dataset)?;
                Ok(dataset)
            }
        }
    }

    /// Delete the cache file for `factor`. Returns false when there was none.
    pub fn remove(&self, factor: &CompressionFactor) -> Result<bool> {
        match self.state(factor) {
            CacheState::Present(path) => {
                std::fs::remove_file(&path)?;
                tracing::info!("Removed {}", path.display());
                Ok(true)
            }
            CacheState::Absent => Ok(false),
        }
    }

    fn load(
        &self,
        path: &Path,
        factor: &CompressionFactor,
        expected: Option<ExpectedRows>,
    ) -> Result<NoisyDataset> {
        let file = ArrayFile::open(path)?;
        let noisy_train = file.read_array(NOISY_TRAIN)?;
        let noisy_test = file.read_array(NOISY_TEST)?;
        check_shape(path, NOISY_TRAIN, &noisy_train, expected.map(|e| e.train), factor)?;
        check_shape(path, NOISY_TEST, &noisy_test, expected.map(|e| e.test), factor)?;
        Ok(NoisyDataset {
            noisy_train,
            noisy_test,
        })
    }

    /// Write through a temporary sibling so a failed write never leaves a cache file behind.
    fn store(&self, factor: &CompressionFactor, dataset: &NoisyDataset) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(factor);
        let tmp = path.with_extension("sqlite.partial");
        let res = Self::write_and_rename(&tmp, &path, dataset);
        if res.is_err() {
            let _ = std::fs::remove_file(&tmp);
        } else {
            tracing::info!("Cached dataset at {}", path.display());
        }
        res
    }

    fn write_and_rename(tmp: &Path, path: &Path, dataset: &NoisyDataset) -> Result<()> {
        let mut file = ArrayFile::create(tmp)?;
        file.write_arrays(&[
            (NOISY_TRAIN, &dataset.noisy_train),
            (NOISY_TEST, &dataset.noisy_test),
        ])?;
        drop(file);
        std::fs::rename(tmp, path)?;
        Ok(())
    }
}

fn check_shape(
    path: &Path,
    name: &str,
    m: &Matrix,
    rows: Option<usize>,
    factor: &CompressionFactor,
) -> Result<()> {
    let expected_rows = rows.unwrap_or(m.rows());
    if m.shape() != (expected_rows, factor.output_len()) {
        return Err(SynthError::cache_read(
            path,
            format!(
                "array {name} has shape {:?}, expected {:?}",
                m.shape(),
                (expected_rows, factor.output_len())
            ),
        ));
    }
    Ok(())
}
