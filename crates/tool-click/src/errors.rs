//! Click failure modes. Both are charged against the
//! failed-target ledger by the caller and never propagate as fatal to the
//! loop.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum ClickError {
    #[error("mark {0} is not present on the page")]
    MissingElement(u32),
    #[error("mark {0} has no bounding rectangle")]
    MissingBoundingRect(u32),
    #[error("driver call failed: {0}")]
    Driver(String),
}
