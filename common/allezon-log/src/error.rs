use thiserror::Error;

/// Errors surfaced by the partitioned-log seam (spec §6.2). Callers
/// apply their own retry budget on `Backend`; `Serialization` is never
/// retried since the payload will not change shape on redelivery.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to serialize user tag: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("partitioned log backend error: {0}")]
    Backend(String),
    #[error("failed to administer topic: {0}")]
    TopicAdmin(String),
}
