//! Type failure modes. All are charged against the
//! failed-target ledger by the caller and never propagate as fatal to the
//! loop.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum TypeError {
    #[error("mark {0} is not present on the page")]
    MissingElement(u32),
    #[error("mark {0} has no bounding rectangle")]
    MissingBoundingRect(u32),
    #[error("target was not fillable and no visible fillable field was found")]
    NoFillableFallback,
    #[error("driver call failed: {0}")]
    Driver(String),
}
