//! Fan-in: combine per-worker partial accumulations into the filtered image.
//!
//! Partials are summed elementwise, so the result does not depend on how
//! many workers ran or in which order they finished. A call either combines
//! the partials of every worker or fails; a subset is never averaged.

use ndarray::{Array3, Zip};

use super::worker::PartialAccumulation;
use crate::error::{FilterError, Result};
use crate::filters::core::Sample;

/// Outcome of one worker: `Ok(None)` means it stopped early on request.
pub type WorkerOutcome = Result<Option<PartialAccumulation>>;

/// Turn per-worker outcomes into the full set of partials.
///
/// The first worker error (in worker order) is returned as-is. Workers that
/// stopped early without an error of their own also fail the call.
pub fn collect_partials(outcomes: Vec<(usize, WorkerOutcome)>) -> Result<Vec<PartialAccumulation>> {
    let mut partials = Vec::with_capacity(outcomes.len());
    let mut stopped = None;

    for (worker, outcome) in outcomes {
        match outcome? {
            Some(partial) => partials.push(partial),
            None => {
                stopped.get_or_insert(worker);
            }
        }
    }

    match stopped {
        Some(worker) => Err(FilterError::AggregationFailure {
            worker,
            reason: "stopped before covering its offsets".into(),
        }),
        None => Ok(partials),
    }
}

/// Sum all partials and return `weighted_sum / normalization` rescaled to
/// the display range of `T`.
pub fn aggregate<T: Sample>(partials: Vec<PartialAccumulation>) -> Result<Array3<T>> {
    let mut partials = partials.into_iter();
    let PartialAccumulation {
        mut weighted_sum,
        mut normalization,
        ..
    } = partials.next().ok_or_else(|| FilterError::AggregationFailure {
        worker: 0,
        reason: "no partial accumulations to combine".into(),
    })?;

    for partial in partials {
        if partial.weighted_sum.dim() != weighted_sum.dim()
            || partial.normalization.dim() != normalization.dim()
        {
            return Err(FilterError::AggregationFailure {
                worker: partial.worker,
                reason: format!(
                    "partial shape {:?} does not match {:?}",
                    partial.weighted_sum.dim(),
                    weighted_sum.dim()
                ),
            });
        }
        weighted_sum += &partial.weighted_sum;
        normalization += &partial.normalization;
    }

    Zip::from(&mut weighted_sum)
        .and(&normalization)
        .for_each(|sum, &norm| *sum /= norm);

    log::debug!("aggregated bilateral partials for shape {:?}", weighted_sum.dim());
    Ok(weighted_sum.mapv(|v| T::from_f64(v * T::DISPLAY_MAX)))
}
