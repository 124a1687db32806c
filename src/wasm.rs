//! WebAssembly exports for the Artify filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Buffer Layout
//!
//! Images are passed as flat row-major arrays of length
//! `width * height * channels`. Every filter has two versions:
//! - **u8**: 8-bit per channel (0-255), standard for web/display
//! - **f32**: Float per channel (0.0-1.0), for HDR/linear workflows
//!
//! Errors are returned to JavaScript as string exceptions.

use ndarray::ArrayView3;
use wasm_bindgen::prelude::*;

use crate::error::FilterError;
use crate::filters::bilateral::{bilateral_filter, BilateralParams, Weighting};
use crate::filters::blur::gaussian_filter;
use crate::filters::noise::median_filter;

fn view<T>(data: &[T], width: usize, height: usize, channels: usize) -> Result<ArrayView3<'_, T>, JsValue> {
    ArrayView3::from_shape((height, width, channels), data)
        .map_err(|e| JsValue::from_str(&format!("Invalid dimensions: {e}")))
}

fn to_js(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn bilateral_params(
    sigma_space: f64,
    sigma_intensity: f64,
    radius_window_width: usize,
    worker_count: usize,
    quantized: bool,
) -> BilateralParams {
    let weighting = if quantized {
        Weighting::quantized()
    } else {
        Weighting::Exact
    };
    BilateralParams::new(sigma_space, sigma_intensity, radius_window_width)
        .with_worker_count(worker_count)
        .with_weighting(weighting)
}

// ============================================================================
// Gaussian Filter
// ============================================================================

/// Gaussian filter with zero padding.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - Samples per pixel
/// * `sigma` - Standard deviation of the Gaussian
/// * `kernel_size` - Odd kernel side length
///
/// # Returns
/// Flat array of filtered bytes
#[wasm_bindgen]
pub fn gaussian_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    sigma: f64,
    kernel_size: usize,
) -> Result<Vec<u8>, JsValue> {
    let input = view(data, width, height, channels)?;
    let result = gaussian_filter(input, sigma, kernel_size).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

/// Gaussian filter with zero padding (f32, 0.0-1.0).
#[wasm_bindgen]
pub fn gaussian_filter_f32_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    sigma: f64,
    kernel_size: usize,
) -> Result<Vec<f32>, JsValue> {
    let input = view(data, width, height, channels)?;
    let result = gaussian_filter(input, sigma, kernel_size).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Median Filter
// ============================================================================

/// Median filter; border pixels are left at zero.
#[wasm_bindgen]
pub fn median_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel_size: usize,
) -> Result<Vec<u8>, JsValue> {
    let input = view(data, width, height, channels)?;
    let result = median_filter(input, kernel_size).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

/// Median filter (f32, 0.0-1.0).
#[wasm_bindgen]
pub fn median_filter_f32_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    kernel_size: usize,
) -> Result<Vec<f32>, JsValue> {
    let input = view(data, width, height, channels)?;
    let result = median_filter(input, kernel_size).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Bilateral Filter
// ============================================================================

/// Bilateral filter.
///
/// Needs a threaded wasm runtime; without one the worker pool cannot be
/// built and the call fails.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn bilateral_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    sigma_space: f64,
    sigma_intensity: f64,
    radius_window_width: usize,
    worker_count: usize,
    quantized: bool,
) -> Result<Vec<u8>, JsValue> {
    let input = view(data, width, height, channels)?;
    let params = bilateral_params(sigma_space, sigma_intensity, radius_window_width, worker_count, quantized);
    let result = bilateral_filter(input, &params).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}

/// Bilateral filter (f32, 0.0-1.0).
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn bilateral_filter_f32_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    sigma_space: f64,
    sigma_intensity: f64,
    radius_window_width: usize,
    worker_count: usize,
    quantized: bool,
) -> Result<Vec<f32>, JsValue> {
    let input = view(data, width, height, channels)?;
    let params = bilateral_params(sigma_space, sigma_intensity, radius_window_width, worker_count, quantized);
    let result = bilateral_filter(input, &params).map_err(to_js)?;
    Ok(result.into_raw_vec_and_offset().0)
}
