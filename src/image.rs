//! Square grayscale images.

use crate::error::{Result, SynthError};

/// A square grayscale image with row-major pixels in [0, 255].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// row-major pixel intensities.
    pixels: Vec<f32>,

    /// side length.
    side: usize,

    /// digit label, if the source provides one.
    label: Option<usize>,
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "label={:?}", self.label)?;
        write!(f, "{}", crate::helper::repr_gray_image(&self.pixels, self.side))
    }
}

impl Image {
    /// Create a new [Image]. `pixels` must hold exactly `side * side` values.
    pub fn new(pixels: Vec<f32>, side: usize, label: Option<usize>) -> Result<Self> {
        if side == 0 || pixels.len() != side * side {
            return Err(SynthError::Configuration(format!(
                "image of side {side} needs {} pixels, got {}",
                side * side,
                pixels.len()
            )));
        }
        Ok(Image {
            pixels,
            side,
            label,
        })
    }

    /// Build an image from a square row-major slice, inferring the side length.
    pub fn from_square(pixels: &[f32]) -> Result<Self> {
        let side = (pixels.len() as f64).sqrt().round() as usize;
        Self::new(pixels.to_vec(), side, None)
    }

    #[inline(always)]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline(always)]
    pub fn label(&self) -> Option<usize> {
        self.label
    }

    /// Row-major pixels.
    #[inline(always)]
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.pixels[row * self.side + col]
    }

    /// Pixels scaled into [0, 1], row-major.
    pub fn normalized(&self) -> Vec<f32> {
        self.pixels
            .iter()
            .map(|&x| crate::numeric::unit_scale(x))
            .collect()
    }
}
