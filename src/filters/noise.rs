//! Noise removal: Median.
//!
//! The median filter is a rank filter: every interior pixel is replaced by the
//! middle value of its sorted `kernel_size x kernel_size` neighborhood, per
//! channel. No padding is applied. Pixels closer than `kernel_size / 2` to any
//! border keep the output's zero fill, so callers that need border coverage
//! must pad beforehand or post-process.
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) or a plain (height, width) view
//! - **Multi-channel**: (height, width, channels), each channel independently

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use super::core::{validate_buffer, validate_kernel_size, with_channel_axis, Sample};
use crate::error::Result;

// ============================================================================
// Median Filter
// ============================================================================

/// Apply a median filter.
///
/// # Arguments
/// * `input` - Image of shape (height, width, channels), u8 or f32
/// * `kernel_size` - Odd window side length
///
/// # Returns
/// Median-filtered image with the same shape; border pixels are zero
pub fn median_filter<T: Sample>(input: ArrayView3<T>, kernel_size: usize) -> Result<Array3<T>> {
    validate_kernel_size(kernel_size)?;
    validate_buffer(&input)?;

    let (height, width, channels) = input.dim();
    let mut output = Array3::<T>::default((height, width, channels));

    let edge = kernel_size / 2;
    if height < kernel_size || width < kernel_size {
        log::debug!("median window {kernel_size} exceeds {height}x{width} image, no interior pixels");
        return Ok(output);
    }

    let middle = kernel_size * kernel_size / 2;
    let mut values: Vec<T> = Vec::with_capacity(kernel_size * kernel_size);

    for y in edge..height - edge {
        for x in edge..width - edge {
            for c in 0..channels {
                values.clear();
                values.extend(
                    input
                        .slice(ndarray::s![y - edge..=y + edge, x - edge..=x + edge, c])
                        .iter()
                        .copied(),
                );

                values.sort_unstable_by(|a, b| a.to_f64().total_cmp(&b.to_f64()));
                output[[y, x, c]] = values[middle];
            }
        }
    }

    Ok(output)
}

/// Apply a median filter to a single-channel (height, width) image.
pub fn median_filter_gray<T: Sample>(input: ArrayView2<T>, kernel_size: usize) -> Result<Array2<T>> {
    Ok(median_filter(with_channel_axis(input), kernel_size)?.remove_axis(Axis(2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_5x5() -> Array3<u8> {
        Array3::from_shape_fn((5, 5, 1), |(y, x, _)| (y * 5 + x) as u8)
    }

    #[test]
    fn test_median_exact_interior_values() {
        let result = median_filter(ramp_5x5().view(), 3).unwrap();

        // Neighborhood of (2, 2) is {6,7,8,11,12,13,16,17,18}.
        assert_eq!(result[[2, 2, 0]], 12);
        // A ramp's 3x3 median is the center value.
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(result[[y, x, 0]], (y * 5 + x) as u8);
            }
        }
    }

    #[test]
    fn test_median_leaves_border_at_zero() {
        let img = Array3::<u8>::from_elem((6, 7, 2), 90);
        let result = median_filter(img.view(), 3).unwrap();

        for y in 0..6 {
            for x in 0..7 {
                let border = y == 0 || x == 0 || y == 5 || x == 6;
                for c in 0..2 {
                    let expected = if border { 0 } else { 90 };
                    assert_eq!(result[[y, x, c]], expected, "pixel ({y}, {x}, {c})");
                }
            }
        }
    }

    #[test]
    fn test_median_wide_window_border() {
        let img = Array3::<f32>::from_elem((7, 7, 1), 0.5);
        let result = median_filter(img.view(), 5).unwrap();
        assert_eq!(result[[1, 3, 0]], 0.0);
        assert_eq!(result[[2, 2, 0]], 0.5);
        assert_eq!(result[[4, 4, 0]], 0.5);
        assert_eq!(result[[5, 4, 0]], 0.0);
    }

    #[test]
    fn test_median_removes_salt_pepper() {
        let mut img = Array3::<u8>::from_elem((5, 5, 1), 128);
        img[[2, 2, 0]] = 255;
        img[[1, 3, 0]] = 0;

        let result = median_filter(img.view(), 3).unwrap();

        assert_eq!(result[[2, 2, 0]], 128);
        assert_eq!(result[[1, 3, 0]], 128);
    }

    #[test]
    fn test_median_f32_preserves_edge() {
        let img = Array3::<f32>::from_shape_fn((5, 6, 1), |(_, x, _)| if x < 3 { 0.0 } else { 1.0 });
        let result = median_filter(img.view(), 3).unwrap();

        assert_eq!(result[[2, 2, 0]], 0.0);
        assert_eq!(result[[2, 3, 0]], 1.0);
    }

    #[test]
    fn test_median_window_larger_than_image() {
        let img = Array3::<u8>::from_elem((2, 8, 1), 7);
        let result = median_filter(img.view(), 3).unwrap();
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_median_kernel_size_validation() {
        let img = ramp_5x5();
        assert!(median_filter(img.view(), 3).is_ok());
        assert!(median_filter(img.view(), 1).is_ok());
        assert!(median_filter(img.view(), 2).unwrap_err().is_invalid_parameter());
        assert!(median_filter(img.view(), 0).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_median_second_pass_changes_non_flat_input() {
        let img = Array3::<u8>::from_shape_fn((6, 6, 1), |(y, x, _)| ((x * 37 + y * 91) % 251) as u8);
        let once = median_filter(img.view(), 3).unwrap();
        let twice = median_filter(once.view(), 3).unwrap();
        assert_ne!(once, twice);
    }

    #[test]
    fn test_median_gray() {
        let gray = ramp_5x5().remove_axis(Axis(2));
        let result = median_filter_gray(gray.view(), 3).unwrap();
        assert_eq!(result.dim(), (5, 5));
        assert_eq!(result[[2, 2]], 12);
        assert_eq!(result[[0, 2]], 0);
    }
}
