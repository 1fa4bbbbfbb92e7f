//! Some helper functions.

use num_traits::Float;

/// Intensity ramp from dark to bright.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Render a square row-major image as ASCII art, assuming values in [0, 255].
pub fn print_matrix<T: Float>(vec: &[T]) -> String {
    let n = (vec.len() as f32).sqrt() as usize;
    repr_gray_image(vec, n)
}

/// Render a row-major image with `num_cols` columns as ASCII art.
pub fn repr_gray_image<T: Float>(vec: &[T], num_cols: usize) -> String {
    if num_cols == 0 {
        return String::new();
    }
    let line = repr_gray(vec);
    let mut result = vec![];
    for i in 0..(line.len() / num_cols) {
        result.push(line[i * num_cols..(i + 1) * num_cols].to_string());
    }
    result.join("\n")
}

/// One ramp character per value.
pub fn repr_gray<T: Float>(vec: &[T]) -> String {
    let top = (RAMP.len() - 1) as f32;
    vec.iter()
        .map(|x| {
            let v = x.to_f32().unwrap_or(0.0).clamp(0.0, 255.0);
            RAMP[((v / 255.0) * top).round() as usize] as char
        })
        .collect::<String>()
}

/// Place two multi-line renderings next to each other.
pub fn side_by_side(left: &str, right: &str, gap: usize) -> String {
    let l: Vec<&str> = left.lines().collect();
    let r: Vec<&str> = right.lines().collect();
    let width = l.iter().map(|s| s.len()).max().unwrap_or(0);
    (0..l.len().max(r.len()))
        .map(|i| {
            format!(
                "{:width$}{:gap$}{}",
                l.get(i).unwrap_or(&""),
                "",
                r.get(i).unwrap_or(&""),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_gray_image() {
        let s = repr_gray_image(&[0.0, 255.0, 255.0, 0.0], 2);
        assert_eq!(s, " @\n@ ");
        assert_eq!(print_matrix(&[0.0f32, 255.0, 255.0, 0.0]), s);
    }

    #[test]
    fn test_side_by_side() {
        assert_eq!(side_by_side("ab\ncd", "x", 1), "ab x\ncd ");
    }
}
