//! Numerical helpers.

use num_traits::Float;

/// Median of a slice. With an even number of values this is the mean of the two central order
/// statistics. Returns `None` for an empty slice or when a value is NaN.
pub fn median<T: Float>(v: &[T]) -> Option<T> {
    if v.is_empty() || v.iter().any(|x| x.is_nan()) {
        return None;
    }
    let mut v1 = v.to_vec();
    v1.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v1.len() / 2;
    if v1.len() % 2 == 0 {
        Some((v1[mid - 1] + v1[mid]) / T::from(2.0)?)
    } else {
        Some(v1[mid])
    }
}

/// Clamp a value into `[lo, hi]`.
#[inline(always)]
pub fn clamp<T: PartialOrd>(x: T, lo: T, hi: T) -> T {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Scale a pixel intensity in [0, 255] into [0, 1].
#[inline(always)]
pub fn unit_scale<T: Float>(x: T) -> T {
    // 255 is always representable.
    let max = T::from(255.0).unwrap_or_else(T::one);
    clamp(x, T::zero(), max) / max
}

#[inline(always)]
pub fn perc(a: usize, b: usize) -> f32 {
    if b == 0 {
        return 0.0;
    }
    (100f32 * a as f32) / (b as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[7.0f32; 16]), Some(7.0));
        assert_eq!(median::<f32>(&[]), None);
        assert_eq!(median(&[1.0, f32::NAN]), None);
    }

    #[test]
    fn test_unit_scale() {
        assert_eq!(unit_scale(255.0f32), 1.0);
        assert_eq!(unit_scale(0.0f32), 0.0);
        assert_eq!(unit_scale(300.0f32), 1.0);
        assert_eq!(unit_scale(-4.0f32), 0.0);
    }

    #[test]
    fn test_perc() {
        assert_eq!(perc(1, 4), 25.0);
        assert_eq!(perc(1, 0), 0.0);
    }
}
