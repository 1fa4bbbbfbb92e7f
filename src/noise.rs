//! Poisson noise and normalization.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::{Result, SynthError};
use crate::numeric::{clamp, unit_scale};

/// Largest representable pixel intensity.
pub const MAX_INTENSITY: f64 = 255.0;

/// Deterministic RNG for a given seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Replace every cell by a Poisson draw whose rate is the cell value, clamped into [0, 255].
pub fn add_noise<R: Rng + ?Sized>(compressed: &[f32], rng: &mut R) -> Result<Vec<u8>> {
    // Validate first so a bad rate never leaves a half-consumed rng behind.
    if let Some((index, &value)) = compressed
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_finite() && **v >= 0.0))
    {
        return Err(SynthError::Domain { index, value });
    }

    compressed
        .iter()
        .enumerate()
        .map(|(index, &lambda)| {
            if lambda == 0.0 {
                return Ok(0);
            }
            let poisson = Poisson::new(lambda as f64)
                .map_err(|_| SynthError::Domain { index, value: lambda })?;
            let k: f64 = poisson.sample(rng);
            Ok(clamp(k, 0.0, MAX_INTENSITY) as u8)
        })
        .collect()
}

/// Scale noisy counts into [0, 1]. Row-major order is kept.
pub fn normalize(noisy: &[u8]) -> Vec<f32> {
    noisy.iter().map(|&x| unit_scale(x as f32)).collect()
}

/// Noise and normalize a batch of compressed images with a single rng.
pub fn noisy_batch<R: Rng + ?Sized>(compressed: &[Vec<f32>], rng: &mut R) -> Result<Vec<Vec<f32>>> {
    let mut saturated = 0usize;
    let mut total = 0usize;
    let mut result = Vec::with_capacity(compressed.len());
    for img in compressed {
        let noisy = add_noise(img, rng)?;
        saturated += noisy.iter().filter(|&&x| x == u8::MAX).count();
        total += noisy.len();
        result.push(normalize(&noisy));
    }
    if saturated > 0 {
        tracing::warn!(
            "{saturated} of {total} cells ({:.2}%) clipped at the 255 ceiling",
            crate::numeric::perc(saturated, total)
        );
    }
    tracing::debug!("Noised {} images", compressed.len());
    Ok(result)
}
