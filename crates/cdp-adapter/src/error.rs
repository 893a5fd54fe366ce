//! Error taxonomy for the browser driver.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum AdapterError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("page closed or crashed")]
    PageGone,

    #[error("no surviving page")]
    NoSurvivingPage,

    #[error("script evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("cdp i/o failure: {0}")]
    CdpIo(String),

    #[error("{0}")]
    Other(String),
}

impl AdapterError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
