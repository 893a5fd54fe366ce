use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlError {
    #[error("invalid argument: {0}")]
    InvalidArg(String),
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("pdf generation failed: {0}")]
    Pdf(String),
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type TlResult<T> = Result<T, TlError>;
