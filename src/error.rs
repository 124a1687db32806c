//! Error type shared by all filters.

use std::time::Duration;

/// Errors that can occur while running a filter.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A parameter or the input buffer was rejected before any work started.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human readable explanation.
        reason: String,
    },

    /// A bilateral worker did not produce its partial accumulation.
    #[error("bilateral worker {worker} failed: {reason}")]
    AggregationFailure {
        /// Index of the first worker that failed.
        worker: usize,
        /// What went wrong inside the worker.
        reason: String,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    /// The caller supplied deadline elapsed before every worker finished.
    #[error("filter did not complete within {0:?}")]
    Timeout(Duration),
}

impl FilterError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True when the caller passed bad input, false when the computation itself failed.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, FilterError::InvalidParameter { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FilterError>;
