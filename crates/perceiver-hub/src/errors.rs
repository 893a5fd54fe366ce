//! Error types for the perception hub.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("perception timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("in-page traversal failed: {0}")]
    Traversal(String),
}

pub type Result<T> = std::result::Result<T, HubError>;
