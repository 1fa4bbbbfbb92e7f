mod error;
mod helper;
mod image;
mod matrix;

#[cfg(feature = "db")]
mod cache;
#[cfg(feature = "db")]
mod db;

pub mod compress;
pub mod config;
pub mod data;
pub mod dataset;
pub mod noise;
pub mod numeric;

pub use crate::compress::{compress, compress_batch};
pub use crate::config::{CompressionFactor, SynthConfig};
pub use crate::dataset::{NoisyDataset, Synthesizer};
pub use crate::error::{Result, SynthError};
pub use crate::helper::*;
pub use crate::image::Image;
pub use crate::matrix::Matrix;
pub use crate::noise::{add_noise, normalize, seeded_rng};

#[cfg(feature = "db")]
pub use crate::cache::{CacheState, DatasetCache, ExpectedRows};
