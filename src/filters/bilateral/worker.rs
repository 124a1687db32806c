//! Offset partitioning and the per-worker accumulation loop.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ndarray::{Array3, Zip};

use super::weights::Falloff;
use super::BilateralParams;
use crate::error::{FilterError, Result};

/// How offsets that leave the image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Toroidal addressing: leaving one edge re-enters at the opposite one.
    /// Produces visible wrap artifacts near the borders.
    #[default]
    Wrap,
    /// Offsets stick to the nearest edge pixel.
    Clamp,
}

impl Boundary {
    /// Source index feeding output index `i` when the image is shifted by `offset`.
    ///
    /// Shifting follows roll semantics: `shifted[i] = source[i - offset]`.
    #[inline]
    pub fn resolve(self, i: usize, offset: isize, len: usize) -> usize {
        let shifted = i as isize - offset;
        match self {
            Boundary::Wrap => shifted.rem_euclid(len as isize) as usize,
            Boundary::Clamp => shifted.clamp(0, len as isize - 1) as usize,
        }
    }
}

/// Contiguous range of row offsets owned by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub worker: usize,
    /// Half-open range of row offsets.
    pub row_offsets: Range<isize>,
}

/// Split the row offsets `-window_width..=window_width` into `worker_count`
/// contiguous ranges.
///
/// Every range holds `(2 * window_width + 1) / worker_count` offsets and the
/// last one absorbs the remainder. When there are more workers than offsets
/// all ranges but the last are empty.
pub fn partition_offsets(window_width: usize, worker_count: usize) -> Vec<WorkItem> {
    if worker_count == 0 {
        return Vec::new();
    }

    let half = window_width as isize;
    let per_worker = ((2 * window_width + 1) / worker_count) as isize;

    let mut start = -half;
    (0..worker_count)
        .map(|worker| {
            let end = if worker + 1 == worker_count {
                half + 1
            } else {
                start + per_worker
            };
            let item = WorkItem {
                worker,
                row_offsets: start..end,
            };
            start = end;
            item
        })
        .collect()
}

/// Weighted-sum and normalization accumulators produced by one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAccumulation {
    pub worker: usize,
    pub weighted_sum: Array3<f64>,
    pub normalization: Array3<f64>,
}

impl PartialAccumulation {
    /// Accumulators seeded with `floor`: `normalization = floor` and
    /// `weighted_sum = input * floor`, so the final ratio of a flat image is
    /// unaffected by the floor.
    pub fn with_floor(worker: usize, input: &Array3<f64>, floor: f64) -> Self {
        PartialAccumulation {
            worker,
            weighted_sum: input.mapv(|v| v * floor),
            normalization: Array3::from_elem(input.dim(), floor),
        }
    }
}

/// Read-only state shared by every worker of one filter call.
pub struct WorkerContext<'a> {
    input: &'a Array3<f64>,
    window_width: isize,
    space: Falloff,
    intensity: Falloff,
    boundary: Boundary,
    floor: f64,
    started: Instant,
    deadline: Option<Duration>,
    pub(crate) abort: AtomicBool,
}

impl<'a> WorkerContext<'a> {
    /// `input` must already be normalized to [0, 1].
    pub fn new(input: &'a Array3<f64>, params: &BilateralParams) -> Self {
        WorkerContext {
            input,
            window_width: params.window_width() as isize,
            space: Falloff::new(params.sigma_space, params.weighting),
            intensity: Falloff::new(params.sigma_intensity, params.weighting),
            boundary: params.boundary,
            // Split so the combined floor is `epsilon` for any worker count.
            floor: params.epsilon / params.worker_count as f64,
            started: Instant::now(),
            deadline: params.deadline,
            abort: AtomicBool::new(false),
        }
    }

    fn check_deadline(&self) -> Result<()> {
        match self.deadline {
            Some(budget) if self.started.elapsed() >= budget => Err(FilterError::Timeout(budget)),
            _ => Ok(()),
        }
    }
}

/// Accumulate every (row offset in `item`, column offset in the window) pair.
///
/// Returns `Ok(None)` when the worker stopped early because another worker
/// already failed.
pub fn run_worker(item: &WorkItem, ctx: &WorkerContext) -> Result<Option<PartialAccumulation>> {
    let input = ctx.input;
    let (height, width, _) = input.dim();
    let half = ctx.window_width;

    let mut acc = PartialAccumulation::with_floor(item.worker, input, ctx.floor);
    let mut rows = vec![0usize; height];
    let mut cols = vec![0usize; width];

    for dr in item.row_offsets.clone() {
        if ctx.abort.load(Ordering::Relaxed) {
            return Ok(None);
        }
        ctx.check_deadline()?;

        for (y, row) in rows.iter_mut().enumerate() {
            *row = ctx.boundary.resolve(y, dr, height);
        }

        for dc in -half..=half {
            let spatial = ctx.space.at((dr * dr + dc * dc) as f64);
            if spatial == 0.0 {
                continue;
            }
            for (x, col) in cols.iter_mut().enumerate() {
                *col = ctx.boundary.resolve(x, dc, width);
            }

            Zip::indexed(&mut acc.weighted_sum)
                .and(&mut acc.normalization)
                .and(input)
                .for_each(|(y, x, c), sum, norm, &center| {
                    let shifted = input[[rows[y], cols[x], c]];
                    let diff = shifted - center;
                    let weight = spatial * ctx.intensity.at(diff * diff);
                    *sum += weight * shifted;
                    *norm += weight;
                });
        }
    }

    log::trace!(
        "bilateral worker {} finished row offsets {:?}",
        item.worker,
        item.row_offsets
    );
    Ok(Some(acc))
}
