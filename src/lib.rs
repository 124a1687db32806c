//! Artify Rust Extensions
//!
//! Image filtering engine for the artistic picture pipeline: Gaussian blur,
//! median filter and a parallel edge-preserving bilateral filter, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Filters take ndarray views of shape (height, width, channels):
//! - **Grayscale**: (height, width, 1) - or a plain (height, width) view via the `_gray` variants
//! - **Multi-channel**: (height, width, channels) - every channel filtered on its own
//!
//! Both bit depths are supported:
//! - `u8`: 8-bit per channel (0-255)
//! - `f32`: Float per channel (0.0-1.0)
//!
//! Every filter returns a new buffer of the input's shape and sample type and
//! reports bad parameters as [`FilterError::InvalidParameter`] before doing
//! any work.

pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{FilterError, Result};
pub use filters::bilateral::{bilateral_filter, bilateral_filter_gray, BilateralParams, Boundary, Weighting};
pub use filters::blur::{gaussian_filter, gaussian_filter_gray};
pub use filters::core::{build_kernel, Kernel, Sample};
pub use filters::noise::{median_filter, median_filter_gray};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::error::FilterError;
    use crate::filters::bilateral::{self, BilateralParams, Weighting};
    use crate::filters::blur;
    use crate::filters::noise;

    impl From<FilterError> for PyErr {
        fn from(err: FilterError) -> PyErr {
            if err.is_invalid_parameter() {
                PyValueError::new_err(err.to_string())
            } else {
                PyRuntimeError::new_err(err.to_string())
            }
        }
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

    // ========================================================================
    // Kernel
    // ========================================================================

    /// Normalized 2D Gaussian kernel of shape (kernel_size, kernel_size).
    #[pyfunction]
    pub fn build_kernel<'py>(
        py: Python<'py>,
        sigma: f64,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let kernel = crate::filters::core::build_kernel(sigma, kernel_size)?;
        Ok(kernel.weights().clone().into_pyarray(py))
    }

    // ========================================================================
    // Gaussian Filter
    // ========================================================================

    /// Gaussian filter with zero padding (u8, 0-255).
    #[pyfunction]
    pub fn gaussian_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma: f64,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = blur::gaussian_filter(image.as_array(), sigma, kernel_size)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    pub fn gaussian_filter_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        sigma: f64,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let result = blur::gaussian_filter(image.as_array(), sigma, kernel_size)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Median Filter
    // ========================================================================

    /// Median filter; pixels within kernel_size // 2 of the border are zero.
    #[pyfunction]
    pub fn median_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = noise::median_filter(image.as_array(), kernel_size)?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    pub fn median_filter_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let result = noise::median_filter(image.as_array(), kernel_size)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Bilateral Filter
    // ========================================================================

    /// Bilateral filter (u8). Runs without holding the GIL.
    ///
    /// # Arguments
    /// * `image` - Image with shape (height, width, channels)
    /// * `sigma_space` - Spatial standard deviation in pixels
    /// * `sigma_intensity` - Intensity standard deviation on the 0.0-1.0 scale
    /// * `radius_window_width` - Window radius parameter
    /// * `worker_count` - Number of parallel workers
    /// * `quantized` - Use the three-level weight approximation
    #[pyfunction]
    #[pyo3(signature = (image, sigma_space=10.0, sigma_intensity=0.1, radius_window_width=1, worker_count=6, quantized=false))]
    pub fn bilateral_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma_space: f64,
        sigma_intensity: f64,
        radius_window_width: usize,
        worker_count: usize,
        quantized: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = bilateral_params(sigma_space, sigma_intensity, radius_window_width, worker_count, quantized);
        let input = image.as_array();
        let result = py.allow_threads(|| bilateral::bilateral_filter(input, &params))?;
        Ok(result.into_pyarray(py))
    }

    #[pyfunction]
    #[pyo3(signature = (image, sigma_space=10.0, sigma_intensity=0.1, radius_window_width=1, worker_count=6, quantized=false))]
    pub fn bilateral_filter_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        sigma_space: f64,
        sigma_intensity: f64,
        radius_window_width: usize,
        worker_count: usize,
        quantized: bool,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let params = bilateral_params(sigma_space, sigma_intensity, radius_window_width, worker_count, quantized);
        let input = image.as_array();
        let result = py.allow_threads(|| bilateral::bilateral_filter(input, &params))?;
        Ok(result.into_pyarray(py))
    }

    /// Artify Rust extension module
    #[pymodule]
    pub fn artify_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(build_kernel, m)?)?;

        m.add_function(wrap_pyfunction!(gaussian_filter, m)?)?;
        m.add_function(wrap_pyfunction!(gaussian_filter_f32, m)?)?;

        m.add_function(wrap_pyfunction!(median_filter, m)?)?;
        m.add_function(wrap_pyfunction!(median_filter_f32, m)?)?;

        m.add_function(wrap_pyfunction!(bilateral_filter, m)?)?;
        m.add_function(wrap_pyfunction!(bilateral_filter_f32, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::artify_rust;
