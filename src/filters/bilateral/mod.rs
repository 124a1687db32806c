//! Bilateral filter: edge-preserving smoothing.
//!
//! Every pixel becomes the weighted average of its neighbors, where the
//! weight is the product of a spatial falloff `exp(-0.5 * (dr² + dc²) / σs²)`
//! and an intensity falloff `exp(-0.5 * Δi² / σi²)`. Intensities are
//! normalized to [0, 1] first, so `sigma_intensity` is independent of the
//! sample type.
//!
//! ## Work partitioning
//!
//! With `window_width = 2 * radius_window_width + 1`, offsets span
//! `-window_width..=window_width` on both axes. The row offsets are split into
//! `worker_count` contiguous ranges ([`worker::partition_offsets`]); each
//! worker runs on a dedicated rayon pool, walks its rows across the whole
//! column span and fills its own [`PartialAccumulation`]. The caller blocks
//! until every worker returned, then [`aggregate::aggregate`] sums the
//! partials and divides.
//!
//! Out-of-bounds offsets wrap around by default ([`Boundary::Wrap`]), which
//! shows as wrap artifacts along the borders. [`Boundary::Clamp`] is available
//! for callers that do not want them.

pub mod aggregate;
pub mod weights;
pub mod worker;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

pub use weights::Weighting;
pub use worker::{Boundary, PartialAccumulation, WorkItem};

use self::aggregate::WorkerOutcome;
use self::worker::WorkerContext;
use super::core::{validate_buffer, validate_sigma, with_channel_axis, Sample};
use crate::error::{FilterError, Result};

/// Worker count used when none is configured.
pub const DEFAULT_WORKER_COUNT: usize = 6;

/// Floor added to the normalization accumulators.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Parameters of one bilateral filter call.
#[derive(Debug, Clone, PartialEq)]
pub struct BilateralParams {
    /// Spatial standard deviation, in pixels.
    pub sigma_space: f64,
    /// Intensity standard deviation, on the [0, 1] scale.
    pub sigma_intensity: f64,
    /// Window half-width is `2 * radius_window_width + 1`.
    pub radius_window_width: usize,
    pub worker_count: usize,
    pub weighting: Weighting,
    pub boundary: Boundary,
    /// Total normalization floor, split evenly across workers.
    pub epsilon: f64,
    /// Fail with [`FilterError::Timeout`] when the workers take longer.
    pub deadline: Option<Duration>,
}

impl Default for BilateralParams {
    fn default() -> Self {
        BilateralParams {
            sigma_space: 10.0,
            sigma_intensity: 0.1,
            radius_window_width: 1,
            worker_count: DEFAULT_WORKER_COUNT,
            weighting: Weighting::Exact,
            boundary: Boundary::Wrap,
            epsilon: DEFAULT_EPSILON,
            deadline: None,
        }
    }
}

impl BilateralParams {
    pub fn new(sigma_space: f64, sigma_intensity: f64, radius_window_width: usize) -> Self {
        BilateralParams {
            sigma_space,
            sigma_intensity,
            radius_window_width,
            ..Default::default()
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Largest offset visited on either axis.
    pub fn window_width(&self) -> usize {
        2 * self.radius_window_width + 1
    }

    /// Check every parameter before any work is dispatched.
    pub fn validate(&self) -> Result<()> {
        validate_sigma("sigma_space", self.sigma_space)?;
        validate_sigma("sigma_intensity", self.sigma_intensity)?;
        if self.worker_count == 0 {
            return Err(FilterError::invalid("worker_count", "must be at least 1, got 0"));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(FilterError::invalid(
                "epsilon",
                format!("must be a finite value > 0, got {}", self.epsilon),
            ));
        }
        if let Weighting::Quantized { levels: 0 } = self.weighting {
            return Err(FilterError::invalid("weighting", "quantization needs at least 1 level"));
        }
        Ok(())
    }
}

/// Apply a bilateral filter.
///
/// # Arguments
/// * `input` - Image of shape (height, width, channels), u8 or f32
/// * `params` - Sigmas, window radius, worker count and policies
///
/// # Returns
/// Filtered image with the same shape, in the display range of `T`
pub fn bilateral_filter<T: Sample>(input: ArrayView3<T>, params: &BilateralParams) -> Result<Array3<T>> {
    params.validate()?;
    validate_buffer(&input)?;

    let normalized = input.mapv(|v| v.to_f64() / T::DISPLAY_MAX);
    let items = worker::partition_offsets(params.window_width(), params.worker_count);
    log::debug!(
        "bilateral filter on {:?}: window width {}, {} workers, {:?} weighting, {:?} boundary",
        input.dim(),
        params.window_width(),
        params.worker_count,
        params.weighting,
        params.boundary
    );

    let ctx = WorkerContext::new(&normalized, params);
    let partials = scatter_gather(&items, params.worker_count, &ctx.abort, |item| {
        worker::run_worker(item, &ctx)
    })?;

    aggregate::aggregate(partials)
}

/// Apply a bilateral filter to a single-channel (height, width) image.
pub fn bilateral_filter_gray<T: Sample>(input: ArrayView2<T>, params: &BilateralParams) -> Result<Array2<T>> {
    Ok(bilateral_filter(with_channel_axis(input), params)?.remove_axis(Axis(2)))
}

/// Run every work item on a pool of `worker_count` threads and wait for all.
///
/// A worker that errors or panics raises `abort`, so the remaining workers
/// can stop early, and the whole call fails.
pub(crate) fn scatter_gather<F>(
    items: &[WorkItem],
    worker_count: usize,
    abort: &AtomicBool,
    work: F,
) -> Result<Vec<PartialAccumulation>>
where
    F: Fn(&WorkItem) -> WorkerOutcome + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("bilateral-worker-{i}"))
        .build()
        .map_err(|e| FilterError::WorkerPool(e.to_string()))?;

    let outcomes: Vec<(usize, WorkerOutcome)> = pool.install(|| {
        items
            .par_iter()
            .with_max_len(1)
            .map(|item| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(item))).unwrap_or_else(
                    |payload| {
                        Err(FilterError::AggregationFailure {
                            worker: item.worker,
                            reason: panic_message(payload.as_ref()),
                        })
                    },
                );
                if let Err(err) = &outcome {
                    log::warn!("bilateral worker {} failed: {err}", item.worker);
                    abort.store(true, Ordering::Relaxed);
                }
                (item.worker, outcome)
            })
            .collect()
    });

    aggregate::collect_partials(outcomes)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
