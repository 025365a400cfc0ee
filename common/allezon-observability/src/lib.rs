use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use once_cell::sync::OnceCell;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Initializes the process-wide tracing subscriber from the `log_level`
/// config option (spec §6.5), honoring `RUST_LOG` if set. Safe to call
/// more than once (e.g. from tests); only the first call takes effect.
pub fn init_tracing(log_level: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// The `http_errors_total{service,code,status}` counter every service
/// exposes, matching `order-service::http_error_metrics`. Each binary
/// registers this on its own `Registry` alongside its own
/// service-specific metrics (see `order-service`/`auth-service`'s
/// `metrics.rs` for the pattern this generalizes).
#[derive(Clone)]
pub struct HttpErrorMetrics {
    counter: IntCounterVec,
}

impl HttpErrorMetrics {
    pub fn register(registry: &Registry) -> Result<Self> {
        let counter = IntCounterVec::new(
            Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
            &["service", "code", "status"],
        )?;
        registry.register(Box::new(counter.clone()))?;
        Ok(Self { counter })
    }

    pub fn record(&self, service: &str, code: &str, status: &str) {
        self.counter.with_label_values(&[service, code, status]).inc();
    }
}

/// Renders a Prometheus `Registry` as a `text/plain` metrics response
/// for a `/metrics` route.
pub fn render_metrics(registry: &Registry) -> Result<Response> {
    let encoder = TextEncoder::new();
    let families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"))
        .body(Body::from(buffer))?;
    Ok(response)
}

/// `axum::middleware::from_fn` layer recording every >=400 response
/// into `metrics`, reading the error code from the `X-Error-Code`
/// header the way `allezon-errors::ApiError` sets it.
pub async fn http_error_metrics_layer(
    service: &'static str,
    metrics: HttpErrorMetrics,
    req: axum::http::Request<Body>,
    next: axum::middleware::Next,
) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if status.as_u16() >= 400 {
        let code = response
            .headers()
            .get("X-Error-Code")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        metrics.record(service, code, status.as_str());
    }
    response
}
