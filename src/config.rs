//! Synthesizer configuration.

use std::path::PathBuf;

use crate::error::{Result, SynthError};

/// Side length of the MNIST digits.
pub const MNIST_SIDE: usize = 28;

/// Output side lengths the compressor accepts.
pub const ALLOWED_CMP_DIMS: [usize; 4] = [4, 7, 14, 28];

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "PAIN_CACHE_DIR";

/// Validated compression factor: the side length of the compressed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionFactor {
    cmp_dim: usize,
    side: usize,
}

impl CompressionFactor {
    /// Validate `cmp_dim` against the allowed set and the source side length.
    pub fn new(cmp_dim: usize, side: usize) -> Result<Self> {
        if !ALLOWED_CMP_DIMS.contains(&cmp_dim) {
            return Err(SynthError::Configuration(format!(
                "compression factor {cmp_dim} is not one of {ALLOWED_CMP_DIMS:?}"
            )));
        }
        if side == 0 || side % cmp_dim != 0 {
            return Err(SynthError::Configuration(format!(
                "compression factor {cmp_dim} does not divide image side {side}"
            )));
        }
        Ok(Self { cmp_dim, side })
    }

    #[inline(always)]
    pub fn cmp_dim(&self) -> usize {
        self.cmp_dim
    }

    #[inline(always)]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline(always)]
    pub fn window_size(&self) -> usize {
        self.side / self.cmp_dim
    }

    /// Length of a flattened compressed image.
    #[inline(always)]
    pub fn output_len(&self) -> usize {
        self.cmp_dim * self.cmp_dim
    }

    /// True when no compression takes place.
    pub fn is_identity(&self) -> bool {
        self.cmp_dim == self.side
    }
}

impl std::fmt::Display for CompressionFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cmp_dim, self.cmp_dim)
    }
}

/// Everything one synthesis run depends on.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub cmp_dim: CompressionFactor,
    pub seed: u64,
    pub cache_dir: PathBuf,
}

impl SynthConfig {
    pub fn new(cmp_dim: usize, side: usize, seed: u64, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            cmp_dim: CompressionFactor::new(cmp_dim, side)?,
            seed,
            cache_dir: cache_dir.into(),
        })
    }

    /// MNIST-sized config using [default_cache_dir].
    pub fn mnist(cmp_dim: usize, seed: u64) -> Result<Self> {
        Self::new(cmp_dim, MNIST_SIDE, seed, default_cache_dir())
    }
}

/// Cache directory: `PAIN_CACHE_DIR` if set, else the platform data directory, else `./data`.
pub fn default_cache_dir() -> PathBuf {
    if let Ok(path) = std::env::var(CACHE_DIR_ENV) {
        path.into()
    } else if let Some(proj_dir) = directories::ProjectDirs::from("org", "pain", "pain-dataset") {
        proj_dir.data_dir().to_path_buf()
    } else {
        PathBuf::from("data")
    }
}
