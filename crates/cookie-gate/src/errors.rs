//! Cookie-gate errors. Per/7, these are logged and
//! absorbed by the loop — nothing here is ever allowed to propagate as a
//! fatal error.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum CookieGateError {
    #[error("detection script failed: {0}")]
    DetectionFailed(String),

    #[error("dismissal attempt failed: {0}")]
    DismissalFailed(String),
}
