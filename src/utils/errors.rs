use thiserror::Error;

use crate::api::metrics::ApiError;

/// Failure modes of one refresh cycle.
///
/// Every variant is caught at the pipeline boundary, logged, and dropped.
/// Nothing here stops the scheduler; the chart keeps its previous contents
/// until a later cycle succeeds.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The backend fetch failed before any chart was touched
    #[error("metrics fetch failed: {0}")]
    Fetch(#[from] ApiError),

    /// The backend answered with an empty history for this symbol
    #[error("no history returned for {0}")]
    EmptyHistory(String),

    /// The chart's render target is gone (output directory removed, or
    /// the handle was disposed by a concurrent reconciliation)
    #[error("render target unavailable: {0}")]
    MissingTarget(String),

    /// Drawing the chart image failed
    #[error("chart rendering failed: {0}")]
    Render(String),
}
