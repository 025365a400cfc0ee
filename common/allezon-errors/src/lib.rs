use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The error taxonomy from spec §7. Validation errors are always 400
/// and never retried; backend failures are 500 after the caller has
/// already exhausted its retry budget. Not-found and generation
/// mismatch are not represented here — they are translated to success
/// (empty profile, zero-row aggregate) or retried locally before ever
/// reaching the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or semantically invalid request input (spec §7 item 1).
    Validation { code: &'static str, message: String },
    /// A transient backend failure that exhausted its retry budget
    /// (spec §7 item 4).
    Backend { message: String },
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend { message: err.to_string() }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation { code, message } => (StatusCode::BAD_REQUEST, *code, message.as_str()),
            ApiError::Backend { message } => {
                tracing::error!(error = %message, "backend failure exhausted retry budget");
                (StatusCode::INTERNAL_SERVER_ERROR, "backend_error", message.as_str())
            }
        };
        // 5xx bodies are empty per spec §7 "user-visible behavior";
        // 4xx carries a machine-readable body.
        let mut response = if status.is_server_error() {
            status.into_response()
        } else {
            (status, axum::Json(ErrorBody { code, message })).into_response()
        };
        if let Ok(value) = HeaderValue::from_str(code) {
            response.headers_mut().insert("X-Error-Code", value);
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
