use thiserror::Error;

/// Errors raised while assembling a prompt or talking to the configured
/// decision provider. None of these propagate out of [`crate::engine::DecisionEngine::decide`]
/// — they are always absorbed into a
/// `wait` [`wayfarer_core_types::Decision`] with an explanatory thought.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The provider reported a rate limit (HTTP 429 upstream).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The provider reported a transient failure (HTTP 503 upstream, or a
    /// connection error worth a retry).
    #[error("temporary provider failure: {0}")]
    Temporary(String),

    /// Any other provider failure, not worth retrying.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider's response could not be coerced into a decision at all
    /// (no balanced `{...}` substring present).
    #[error("could not parse a decision from the response: {0}")]
    InvalidResponse(String),
}
