use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::wire::ErrorBody;

/// The store-layer error taxonomy from spec §4.5/§7: not-found and
/// generation mismatch are distinguished sentinels callers translate
/// into success paths; `Backend` is a transient failure subject to the
/// caller's own retry budget. `Request`/`Decode` are specific to a
/// networked `RecordStore` implementation talking to `store-service`
/// over HTTP.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found")]
    KeyNotFound,
    #[error("generation mismatch")]
    GenerationMismatch,
    #[error("element already exists")]
    ElementExists,
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("request to store-service failed: {0}")]
    Request(String),
    #[error("failed to decode store-service response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound)
    }

    fn wire_kind(&self) -> &'static str {
        match self {
            StoreError::KeyNotFound => "key_not_found",
            StoreError::GenerationMismatch => "generation_mismatch",
            StoreError::ElementExists => "element_exists",
            StoreError::Backend(_) | StoreError::Request(_) | StoreError::Decode(_) => "backend",
        }
    }

    /// Reconstructs the error a `store-service` response's `kind`
    /// field named, for the HTTP client side of the wire protocol.
    pub fn from_wire(kind: &str, message: String) -> Self {
        match kind {
            "key_not_found" => StoreError::KeyNotFound,
            "generation_mismatch" => StoreError::GenerationMismatch,
            "element_exists" => StoreError::ElementExists,
            _ => StoreError::Backend(message),
        }
    }
}

/// Lets `store-service`'s handlers return `Result<Json<_>, StoreError>`
/// directly, the same way `allezon-errors::ApiError` does for
/// `api-service` and `id-interner-service`.
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::KeyNotFound => StatusCode::NOT_FOUND,
            StoreError::GenerationMismatch | StoreError::ElementExists => StatusCode::CONFLICT,
            StoreError::Backend(_) | StoreError::Request(_) | StoreError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody { kind: self.wire_kind().to_string(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}
