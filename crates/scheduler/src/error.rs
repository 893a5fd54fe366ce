use thiserror::Error;

/// Errors the cooperative loop driver itself can raise. Per-turn
/// application errors (perception/action/upstream failures) are handled
/// by the turn body and never surface here; this enum only covers the
/// driver's own bookkeeping.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("a run is already active")]
    AlreadyActive,
    #[error("no active run")]
    NotActive,
}
