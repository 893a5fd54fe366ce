//! Error types for action primitive geometry/timing failures.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PrimitiveError {
    #[error("element has no bounding rectangle")]
    MissingBoundingRect,

    #[error("element could not be located on the page")]
    MissingElement,
}
