//! Gaussian blur.
//!
//! Direct 2D convolution with a normalized Gaussian kernel over a
//! zero-padded copy of the input. Pixels within `kernel_size / 2` of the
//! border see the zero padding and come out darker than a clamped or
//! reflected border would produce.
//!
//! Results are always written to a fresh buffer, so no pixel ever reads an
//! already-filtered neighbor.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

use super::core::{build_kernel, pad_constant, validate_buffer, with_channel_axis, Sample};
use crate::error::Result;

/// Apply a Gaussian filter.
///
/// # Arguments
/// * `input` - Image of shape (height, width, channels), u8 or f32
/// * `sigma` - Standard deviation of the Gaussian, must be > 0
/// * `kernel_size` - Odd kernel side length
///
/// # Returns
/// Filtered image with the same shape and sample type
pub fn gaussian_filter<T: Sample>(
    input: ArrayView3<T>,
    sigma: f64,
    kernel_size: usize,
) -> Result<Array3<T>> {
    let kernel = build_kernel(sigma, kernel_size)?;
    validate_buffer(&input)?;

    let size = kernel.size();
    let weights = kernel.weights();
    let padded = pad_constant(input, kernel.radius());

    let mut output = Array3::<T>::default(input.dim());
    Zip::indexed(&mut output).for_each(|(y, x, c), out| {
        let mut sum = 0.0f64;
        for ky in 0..size {
            for kx in 0..size {
                sum += padded[[y + ky, x + kx, c]] * weights[[ky, kx]];
            }
        }
        *out = T::from_f64(sum);
    });

    Ok(output)
}

/// Apply a Gaussian filter to a single-channel (height, width) image.
pub fn gaussian_filter_gray<T: Sample>(
    input: ArrayView2<T>,
    sigma: f64,
    kernel_size: usize,
) -> Result<Array2<T>> {
    Ok(gaussian_filter(with_channel_axis(input), sigma, kernel_size)?.remove_axis(Axis(2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_constant_interior_is_preserved() {
        let img = Array3::<u8>::from_elem((7, 7, 1), 100);
        let result = gaussian_filter(img.view(), 1.0, 3).unwrap();

        assert_eq!(result.dim(), img.dim());
        for y in 1..6 {
            for x in 1..6 {
                assert_eq!(result[[y, x, 0]], 100);
            }
        }
    }

    #[test]
    fn test_gaussian_zero_padding_darkens_border() {
        let img = Array3::<f32>::from_elem((6, 6, 1), 1.0);
        let result = gaussian_filter(img.view(), 1.0, 5).unwrap();

        // Corners see the most padding, edges less, the center none.
        assert!(result[[0, 0, 0]] < result[[0, 3, 0]]);
        assert!(result[[0, 3, 0]] < 1.0);
        assert!(result[[5, 5, 0]] < 1.0);
        assert_relative_eq!(result[[2, 2, 0]], 1.0, epsilon = 1e-6);

        let kernel = build_kernel(1.0, 5).unwrap();
        let w = kernel.weights();
        let corner: f64 = w.slice(ndarray::s![2..5, 2..5]).sum();
        assert_relative_eq!(result[[0, 0, 0]] as f64, corner, epsilon = 1e-6);
    }

    #[test]
    fn test_gaussian_impulse_response_is_symmetric() {
        // An in-place sweep would feed filtered values forward and break symmetry.
        let mut img = Array3::<f32>::zeros((7, 7, 1));
        img[[3, 3, 0]] = 1.0;
        let result = gaussian_filter(img.view(), 1.2, 5).unwrap();

        for dy in 0..3 {
            for dx in 0..3 {
                let v = result[[3 + dy, 3 + dx, 0]];
                assert_relative_eq!(v, result[[3 - dy, 3 - dx, 0]], epsilon = 1e-7);
                assert_relative_eq!(v, result[[3 + dx, 3 + dy, 0]], epsilon = 1e-7);
            }
        }
        assert_eq!(img[[3, 3, 0]], 1.0);
        assert_eq!(img[[3, 4, 0]], 0.0);
    }

    #[test]
    fn test_gaussian_channels_are_independent() {
        let mut img = Array3::<u8>::zeros((5, 5, 3));
        for y in 0..5 {
            for x in 0..5 {
                img[[y, x, 0]] = 200;
                img[[y, x, 2]] = 50;
            }
        }
        let result = gaussian_filter(img.view(), 0.8, 3).unwrap();
        assert_eq!(result[[2, 2, 0]], 200);
        assert_eq!(result[[2, 2, 1]], 0);
        assert_eq!(result[[2, 2, 2]], 50);
    }

    #[test]
    fn test_gaussian_second_pass_smooths_further() {
        let img = Array3::<f32>::from_shape_fn((8, 8, 1), |(y, x, _)| ((x + y) % 2) as f32);
        let once = gaussian_filter(img.view(), 1.0, 3).unwrap();
        let twice = gaussian_filter(once.view(), 1.0, 3).unwrap();
        assert_ne!(once, twice);
    }

    #[test]
    fn test_gaussian_kernel_size_validation() {
        let img = Array3::<u8>::zeros((4, 4, 1));
        assert!(gaussian_filter(img.view(), 1.0, 3).is_ok());
        assert!(gaussian_filter(img.view(), 1.0, 4).unwrap_err().is_invalid_parameter());
        assert!(gaussian_filter(img.view(), 1.0, 0).unwrap_err().is_invalid_parameter());
        assert!(gaussian_filter(img.view(), 0.0, 3).unwrap_err().is_invalid_parameter());

        let empty = Array3::<u8>::zeros((0, 4, 1));
        assert!(gaussian_filter(empty.view(), 1.0, 3).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_gaussian_gray_matches_single_channel() {
        let gray = Array2::<u8>::from_shape_fn((5, 6), |(y, x)| (y * 40 + x * 7) as u8);
        let result = gaussian_filter_gray(gray.view(), 1.0, 3).unwrap();
        let expected = gaussian_filter(gray.view().insert_axis(Axis(2)), 1.0, 3).unwrap();
        assert_eq!(result.dim(), (5, 6));
        assert_eq!(result, expected.remove_axis(Axis(2)));
    }
}
