//! Core utilities shared by the filters.
//!
//! This module provides:
//! - The [`Sample`] abstraction over u8 (0-255) and f32 (0.0-1.0) buffers
//! - Parameter and buffer validation
//! - Gaussian kernel generation
//! - Constant (zero) padding

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::error::{FilterError, Result};

/// A pixel sample type a filter can read and write.
///
/// Filters compute in f64 and convert back on output, so u8 results are
/// rounded and clamped while f32 results are passed through.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// Value representing full intensity (255 for u8, 1.0 for f32).
    const DISPLAY_MAX: f64;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;
}

impl Sample for u8 {
    const DISPLAY_MAX: f64 = 255.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value.round().clamp(0.0, 255.0) as u8
    }
}

impl Sample for f32 {
    const DISPLAY_MAX: f64 = 1.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check that a window size is odd and positive.
pub fn validate_kernel_size(kernel_size: usize) -> Result<()> {
    if kernel_size == 0 {
        return Err(FilterError::invalid("kernel_size", "must be positive, got 0"));
    }
    if kernel_size % 2 == 0 {
        return Err(FilterError::invalid(
            "kernel_size",
            format!("must be odd, got {kernel_size}"),
        ));
    }
    Ok(())
}

/// Check that a standard deviation is finite and strictly positive.
pub fn validate_sigma(name: &'static str, sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FilterError::invalid(
            name,
            format!("must be a finite value > 0, got {sigma}"),
        ));
    }
    Ok(())
}

/// Reject buffers with a zero-sized axis.
pub fn validate_buffer<T>(input: &ArrayView3<T>) -> Result<()> {
    let (height, width, channels) = input.dim();
    if height == 0 || width == 0 || channels == 0 {
        return Err(FilterError::invalid(
            "image",
            format!("buffer must not be empty, got shape ({height}, {width}, {channels})"),
        ));
    }
    Ok(())
}

/// View a single-channel (height, width) buffer as (height, width, 1).
pub fn with_channel_axis<T>(input: ArrayView2<'_, T>) -> ArrayView3<'_, T> {
    input.insert_axis(Axis(2))
}

// ============================================================================
// Gaussian kernel
// ============================================================================

/// Normalized square convolution kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f64>,
}

impl Kernel {
    /// Side length of the kernel (always odd).
    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    /// Distance from the center cell to the border.
    pub fn radius(&self) -> usize {
        self.size() / 2
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn sum(&self) -> f64 {
        self.weights.sum()
    }
}

/// 2D Gaussian density at offset (dx, dy).
fn gaussian_density(dx: f64, dy: f64, sigma: f64) -> f64 {
    let two_sigma_sq = 2.0 * sigma * sigma;
    (-(dx * dx + dy * dy) / two_sigma_sq).exp() / (std::f64::consts::PI * two_sigma_sq)
}

/// Build a normalized 2D Gaussian kernel.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian, must be > 0
/// * `kernel_size` - Odd side length of the kernel
///
/// # Returns
/// Kernel whose weights sum to 1
pub fn build_kernel(sigma: f64, kernel_size: usize) -> Result<Kernel> {
    validate_sigma("sigma", sigma)?;
    validate_kernel_size(kernel_size)?;

    let half = (kernel_size / 2) as f64;
    let mut weights = Array2::from_shape_fn((kernel_size, kernel_size), |(row, col)| {
        gaussian_density(col as f64 - half, row as f64 - half, sigma)
    });

    let total = weights.sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(FilterError::invalid(
            "sigma",
            format!("kernel of size {kernel_size} underflows for sigma {sigma}"),
        ));
    }
    weights.mapv_inplace(|w| w / total);

    log::debug!("built {kernel_size}x{kernel_size} gaussian kernel, sigma={sigma}");
    Ok(Kernel { weights })
}

// ============================================================================
// Padding
// ============================================================================

/// Pad the spatial axes with zeros, converting samples to f64.
///
/// # Arguments
/// * `image` - Image of shape (height, width, channels)
/// * `pad` - Pixels to add on each side
///
/// # Returns
/// Array of shape (height + 2 * pad, width + 2 * pad, channels)
pub fn pad_constant<T: Sample>(image: ArrayView3<T>, pad: usize) -> Array3<f64> {
    let (h, w, c) = image.dim();
    let mut result = Array3::<f64>::zeros((h + pad * 2, w + pad * 2, c));

    result
        .slice_mut(s![pad..pad + h, pad..pad + w, ..])
        .zip_mut_with(&image, |dst, &src| *dst = src.to_f64());

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    #[test]
    fn test_kernel_sums_to_one() {
        for &sigma in &[0.3, 1.0, 2.5, 10.0] {
            for &size in &[1usize, 3, 5, 7, 15, 31] {
                let kernel = build_kernel(sigma, size).unwrap();
                assert_eq!(kernel.size(), size);
                assert_relative_eq!(kernel.sum(), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_kernel_is_symmetric_and_peaks_at_center() {
        let kernel = build_kernel(1.5, 5).unwrap();
        let w = kernel.weights();
        assert_eq!(kernel.radius(), 2);
        for row in 0..5 {
            for col in 0..5 {
                assert_relative_eq!(w[[row, col]], w[[col, row]], epsilon = 1e-15);
                assert_relative_eq!(w[[row, col]], w[[4 - row, 4 - col]], epsilon = 1e-15);
                assert!(w[[row, col]] <= w[[2, 2]]);
            }
        }
    }

    #[test]
    fn test_kernel_size_one_is_identity() {
        let kernel = build_kernel(2.0, 1).unwrap();
        assert_relative_eq!(kernel.weights()[[0, 0]], 1.0);
    }

    #[test]
    fn test_kernel_rejects_invalid_parameters() {
        assert!(build_kernel(0.0, 3).unwrap_err().is_invalid_parameter());
        assert!(build_kernel(-1.0, 3).unwrap_err().is_invalid_parameter());
        assert!(build_kernel(f64::NAN, 3).unwrap_err().is_invalid_parameter());
        assert!(build_kernel(1.0, 0).unwrap_err().is_invalid_parameter());
        assert!(build_kernel(1.0, 4).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_validate_buffer_rejects_empty() {
        let empty = Array3::<u8>::zeros((0, 4, 1));
        assert!(validate_buffer(&empty.view()).is_err());
        let ok = Array3::<u8>::zeros((2, 4, 1));
        assert!(validate_buffer(&ok.view()).is_ok());
    }

    #[test]
    fn test_pad_constant_zero_fills_border() {
        let img = Array3::<u8>::from_elem((2, 3, 1), 9);
        let padded = pad_constant(img.view(), 1);
        assert_eq!(padded.dim(), (4, 5, 1));
        assert_eq!(padded[[0, 0, 0]], 0.0);
        assert_eq!(padded[[3, 4, 0]], 0.0);
        assert_eq!(padded[[1, 1, 0]], 9.0);
        assert_eq!(padded[[2, 3, 0]], 9.0);
    }

    #[test]
    fn test_sample_conversion() {
        assert_eq!(u8::from_f64(127.6), 128);
        assert_eq!(u8::from_f64(-3.0), 0);
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(f32::from_f64(0.25), 0.25f32);
    }
}
