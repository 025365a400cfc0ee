use thiserror::Error;

#[derive(Debug, Error)]
pub enum InternerError {
    #[error("request to id-interner failed: {0}")]
    Request(String),
    #[error("id-interner returned HTTP {0}")]
    Status(u16),
    #[error("failed to decode id-interner response: {0}")]
    Decode(String),
    #[error("id {0} for element does not fit the target width")]
    OutOfRange(i32),
}
