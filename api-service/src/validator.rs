use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;
use tracing::warn;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Spec §6.1's "expectation-validator middleware": `/user_profiles/:cookie`
/// and `/aggregates` receive the *expected* response as their request body
/// (a testing convention). This buffers and reconstructs both bodies (the
/// pattern `payment-service`'s webhook-signature middleware uses for its
/// own buffer-then-rebuild need) so the rest of the router still sees an
/// intact request, parses each side as JSON, and logs a structured diff
/// when they disagree. It never changes the response that reaches the
/// client.
pub async fn validate_expectations(req: Request<Body>, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let expected_bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "expectation-validator: could not buffer request body");
            return next.run(Request::from_parts(parts, Body::empty())).await;
        }
    };
    let expected: Option<Value> = serde_json::from_slice(&expected_bytes).ok();

    let req = Request::from_parts(parts, Body::from(expected_bytes));
    let response = next.run(req).await;

    let (resp_parts, resp_body) = response.into_parts();
    let actual_bytes = match to_bytes(resp_body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "expectation-validator: could not buffer response body");
            return Response::from_parts(resp_parts, Body::empty());
        }
    };

    if let Some(expected) = expected {
        let actual: Option<Value> = serde_json::from_slice(&actual_bytes).ok();
        match actual {
            Some(actual) if actual != expected => {
                warn!(?expected, ?actual, "expectation-validator: response diverged from expected body");
            }
            None => {
                warn!("expectation-validator: response body was not valid JSON");
            }
            _ => {}
        }
    }

    Response::from_parts(resp_parts, Body::from(actual_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    async fn echo(body: axum::body::Bytes) -> axum::response::Response {
        (axum::http::StatusCode::OK, body).into_response()
    }

    use axum::response::IntoResponse;

    fn app() -> Router {
        Router::new().route("/echo", post(echo)).layer(axum::middleware::from_fn(validate_expectations))
    }

    #[tokio::test]
    async fn passes_matching_body_through_unchanged() {
        let body = serde_json::json!({"a": 1}).to_string();
        let response = app()
            .oneshot(Request::builder().method("POST").uri("/echo").body(Body::from(body.clone())).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES).await.unwrap();
        assert_eq!(bytes, body.as_bytes());
    }
}
