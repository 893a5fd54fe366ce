//! Errors the Run Controller itself raises, distinct from the per-turn
//! failures the loop body absorbs into thoughts/error records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("a run is already active")]
    AlreadyActive,

    #[error("no active run")]
    NotActive,

    #[error("target url is required")]
    MissingUrl,

    #[error("browser launch failed: {0}")]
    BrowserLaunch(#[from] cdp_adapter::AdapterError),

    #[error("artifact directory setup failed: {0}")]
    Artifacts(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}
