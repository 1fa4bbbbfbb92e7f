//! Noisy low-resolution dataset synthesis.

use tracing::info;

#[cfg(feature = "db")]
use crate::cache::{DatasetCache, ExpectedRows};
use crate::compress::compress_batch_with;
use crate::config::SynthConfig;
use crate::error::{Result, SynthError};
use crate::image::Image;
use crate::matrix::Matrix;
use crate::noise::{noisy_batch, seeded_rng};

/// Noisy network inputs for the training and test splits.
#[derive(Debug, Clone, PartialEq)]
pub struct NoisyDataset {
    /// `train_size x cmp_dim^2`, values in [0, 1].
    pub noisy_train: Matrix,
    /// `test_size x cmp_dim^2`, values in [0, 1].
    pub noisy_test: Matrix,
}

#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Compress, noise and normalize both splits. One rng seeded from the config drives the
    /// training split first, then the test split.
    pub fn generate(&self, train: &[Image], test: &[Image]) -> Result<NoisyDataset> {
        let factor = &self.config.cmp_dim;
        info!(
            "Synthesizing {factor} dataset from {} train and {} test images (seed={})",
            train.len(),
            test.len(),
            self.config.seed
        );
        let mut rng = seeded_rng(self.config.seed);
        let mut split = |images: &[Image]| -> Result<Matrix> {
            let compressed = compress_batch_with(images, factor)?;
            let noisy = noisy_batch(&compressed, &mut rng)?;
            Matrix::from_rows(noisy, factor.output_len())
        };
        let noisy_train = split(train)?;
        let noisy_test = split(test)?;
        Ok(NoisyDataset {
            noisy_train,
            noisy_test,
        })
    }

    /// Like [Synthesizer::generate] but backed by the on-disk cache for the configured factor.
    #[cfg(feature = "db")]
    pub fn load_or_generate(&self, train: &[Image], test: &[Image]) -> Result<NoisyDataset> {
        let cache = DatasetCache::new(&self.config.cache_dir);
        let expected = ExpectedRows {
            train: train.len(),
            test: test.len(),
        };
        cache.get_or_create(&self.config.cmp_dim, Some(expected), || {
            self.generate(train, test)
        })
    }

    /// Full-resolution regression targets: pixels scaled to [0, 1], row-major.
    pub fn clean_targets(&self, images: &[Image]) -> Result<Matrix> {
        clean_targets(images, self.config.cmp_dim.side())
    }
}

/// Stack normalized clean images of side `side` into a matrix.
pub fn clean_targets(images: &[Image], side: usize) -> Result<Matrix> {
    let rows = images
        .iter()
        .map(|img| {
            if img.side() != side {
                return Err(SynthError::Configuration(format!(
                    "image side {} does not match configured side {side}",
                    img.side()
                )));
            }
            Ok(img.normalized())
        })
        .collect::<Result<Vec<_>>>()?;
    Matrix::from_rows(rows, side * side)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Vec<Image> {
        (0..n)
            .map(|k| {
                let pixels = (0..28 * 28).map(|i| ((i * (k + 1)) % 256) as f32).collect();
                Image::new(pixels, 28, Some(k % 10)).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_generate_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Synthesizer::new(SynthConfig::new(7, 28, 1, dir.path()).unwrap());
        let d = synth.generate(&images(6), &images(3)).unwrap();
        assert_eq!(d.noisy_train.shape(), (6, 49));
        assert_eq!(d.noisy_test.shape(), (3, 49));
        assert!(d
            .noisy_train
            .as_slice()
            .iter()
            .all(|&x| (0.0..=1.0).contains(&x)));

        let clean = synth.clean_targets(&images(6)).unwrap();
        assert_eq!(clean.shape(), (6, 784));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let a = Synthesizer::new(SynthConfig::new(14, 28, 9, dir.path()).unwrap());
        let b = Synthesizer::new(SynthConfig::new(14, 28, 9, dir.path()).unwrap());
        assert_eq!(
            a.generate(&images(4), &images(2)).unwrap(),
            b.generate(&images(4), &images(2)).unwrap()
        );
    }

    #[cfg(feature = "db")]
    #[test]
    fn test_load_or_generate() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Synthesizer::new(SynthConfig::new(4, 28, 5, dir.path()).unwrap());
        let first = synth.load_or_generate(&images(4), &images(2)).unwrap();
        assert!(dir.path().join("noisy_4x4.sqlite").exists());
        let second = synth.load_or_generate(&images(4), &images(2)).unwrap();
        assert_eq!(first, second);

        // a different split size no longer pairs with the cached arrays.
        assert!(synth.load_or_generate(&images(5), &images(2)).is_err());
    }

    #[test]
    fn test_clean_targets_rejects_wrong_side() {
        let img = Image::new(vec![0.0; 16], 4, None).unwrap();
        assert!(clean_targets(&[img], 28).is_err());
    }
}
