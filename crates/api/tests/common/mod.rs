#![allow(dead_code)]

use std::io::Write;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use ocr_gateway_core::runner::{ProcessRunner, RunnerConfig};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use ocr_gateway_api::config::ServerConfig;
use ocr_gateway_api::router::build_app_router;
use ocr_gateway_api::state::AppState;

/// Build a test `ServerConfig` that runs scripts with `sh`.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 35,
        command_timeout_secs: 30,
        python_bin: "sh".to_string(),
    }
}

/// Write `body` to a temporary script standing in for the recognizer.
pub fn write_script(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".sh")
        .tempfile()
        .expect("create temp file");
    write!(f, "{body}").expect("write script");
    f.flush().expect("flush script");
    f
}

/// Build the full application router around `script`.
///
/// Goes through [`build_app_router`] so tests exercise the production
/// middleware stack.
pub fn build_test_app(script: &tempfile::NamedTempFile) -> Router {
    build_test_app_with_cap(script, Duration::from_secs(30))
}

/// Like [`build_test_app`] with a custom per-run cap.
pub fn build_test_app_with_cap(script: &tempfile::NamedTempFile, cap: Duration) -> Router {
    let config = test_config();
    let runner = ProcessRunner::new(RunnerConfig::new("sh", script.path())).with_timeout_cap(cap);
    let state = AppState {
        config: std::sync::Arc::new(config.clone()),
        runner,
        shutdown: CancellationToken::new(),
    };
    build_app_router(state, &config)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
