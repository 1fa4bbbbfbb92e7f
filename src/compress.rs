//! Windowed median compression.

use crate::config::{CompressionFactor, MNIST_SIDE};
use crate::error::{Result, SynthError};
use crate::image::Image;
use crate::numeric::median;

/// Downsample `image` to `cmp_dim x cmp_dim` by taking the median of each disjoint
/// `window x window` block. Returns row-major values.
pub fn compress(image: &Image, cmp_dim: usize) -> Result<Vec<f32>> {
    let factor = CompressionFactor::new(cmp_dim, image.side())?;
    compress_with(image, &factor)
}

/// Same as [compress] with an already validated factor.
pub fn compress_with(image: &Image, factor: &CompressionFactor) -> Result<Vec<f32>> {
    if image.side() != factor.side() {
        return Err(SynthError::Configuration(format!(
            "image side {} does not match configured side {}",
            image.side(),
            factor.side()
        )));
    }
    if factor.is_identity() {
        return Ok(image.pixels().to_vec());
    }

    let d = factor.cmp_dim();
    let w = factor.window_size();
    let mut window = Vec::with_capacity(w * w);
    let mut result = Vec::with_capacity(d * d);
    for bi in 0..d {
        for bj in 0..d {
            window.clear();
            for r in bi * w..(bi + 1) * w {
                for c in bj * w..(bj + 1) * w {
                    window.push(image.get(r, c));
                }
            }
            let m = median(&window).ok_or_else(|| {
                SynthError::Configuration(format!("NaN pixel in window ({bi}, {bj})"))
            })?;
            result.push(m);
        }
    }
    Ok(result)
}

/// Compress every image of a batch. Output order matches input order.
pub fn compress_batch(images: &[Image], cmp_dim: usize) -> Result<Vec<Vec<f32>>> {
    // An empty batch is still checked against the MNIST side.
    let side = images.first().map_or(MNIST_SIDE, Image::side);
    let factor = CompressionFactor::new(cmp_dim, side)?;
    compress_batch_with(images, &factor)
}

/// Same as [compress_batch] with an already validated factor.
pub fn compress_batch_with(images: &[Image], factor: &CompressionFactor) -> Result<Vec<Vec<f32>>> {
    tracing::debug!("Compressing {} images to {factor}", images.len());
    images.iter().map(|img| compress_with(img, factor)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_from_fn(side: usize, f: impl Fn(usize, usize) -> f32) -> Image {
        let pixels = (0..side * side).map(|i| f(i / side, i % side)).collect();
        Image::new(pixels, side, None).unwrap()
    }

    #[test]
    fn test_output_shape() {
        let img = image_from_fn(28, |r, c| ((r * 28 + c) % 256) as f32);
        for d in crate::config::ALLOWED_CMP_DIMS {
            assert_eq!(compress(&img, d).unwrap().len(), d * d);
        }
    }

    #[test]
    fn test_identity() {
        let img = image_from_fn(28, |r, c| (r * 3 + c * 5) as f32);
        assert_eq!(compress(&img, 28).unwrap(), img.pixels());
    }

    #[test]
    fn test_constant_window() {
        let img = image_from_fn(28, |_, _| 42.0);
        assert!(compress(&img, 4).unwrap().iter().all(|&x| x == 42.0));
    }

    #[test]
    fn test_even_window_median() {
        // 28 / 14 = 2, so the top-left window is [[1, 2], [3, 4]].
        let img = image_from_fn(28, |r, c| match (r, c) {
            (0, 0) => 1.0,
            (0, 1) => 2.0,
            (1, 0) => 3.0,
            (1, 1) => 4.0,
            _ => 0.0,
        });
        let out = compress(&img, 14).unwrap();
        assert_eq!(out[0], 2.5);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_checkerboard() {
        // Pixel checkerboard: every 4x4 window has eight 0s and eight 255s.
        let img = image_from_fn(28, |r, c| ((r + c) % 2) as f32 * 255.0);
        assert_eq!(compress(&img, 7).unwrap(), vec![127.5; 49]);

        // Block checkerboard aligned to the 4x4 windows.
        let img = image_from_fn(28, |r, c| ((r / 4 + c / 4) % 2) as f32 * 255.0);
        let out = compress(&img, 7).unwrap();
        for i in 0..7 {
            for j in 0..7 {
                assert_eq!(out[i * 7 + j], ((i + j) % 2) as f32 * 255.0);
            }
        }
    }

    #[test]
    fn test_bad_factor_fails_fast() {
        let img = image_from_fn(28, |_, _| 0.0);
        assert!(matches!(compress(&img, 5), Err(SynthError::Configuration(_))));
        assert!(matches!(
            compress_batch(&[img.clone(), img], 6),
            Err(SynthError::Configuration(_))
        ));
        let err = compress_batch(&[], 5).unwrap_err();
        assert!(matches!(err, SynthError::Configuration(_)));
        assert!(err.to_string().contains('5'), "{err}");
    }

    #[test]
    fn test_batch_preserves_order() {
        let images: Vec<Image> = (0..5).map(|k| image_from_fn(28, move |_, _| k as f32)).collect();
        let out = compress_batch(&images, 7).unwrap();
        assert_eq!(out.len(), images.len());
        for (k, v) in out.iter().enumerate() {
            assert_eq!(v, &compress(&images[k], 7).unwrap());
        }
        assert!(compress_batch(&[], 7).unwrap().is_empty());
    }

    #[test]
    fn test_batch_rejects_mixed_sides() {
        let images = vec![image_from_fn(28, |_, _| 0.0), image_from_fn(14, |_, _| 0.0)];
        assert!(compress_batch(&images, 7).is_err());
    }
}
