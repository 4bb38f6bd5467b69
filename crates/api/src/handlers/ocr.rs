//! Handler for the recognition endpoint.
//!
//! Accepts the input from the `url` query parameter on either verb, or from
//! a `{"url": ...}` JSON body on POST when the query value is empty. When
//! `url` is repeated, the first value wins.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::Method;
use axum::Json;
use ocr_gateway_core::input::OcrInput;
use ocr_gateway_core::runner::ParentScope;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// JSON body accepted on POST.
#[derive(Debug, Default, Deserialize)]
pub struct OcrRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Successful recognition. Captured stdout is deliberately not echoed back.
#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub result: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /ocr?url=... and POST /ocr
///
/// Runs the recognition script once and returns its result line.
pub async fn recognize(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> AppResult<Json<OcrResponse>> {
    let raw = raw_input(&method, first_url(params), &body)?;
    let input = OcrInput::parse(&raw)?;

    // The request's own budget is the parent deadline; the runner narrows
    // it further to its cap.
    let parent = ParentScope::new(
        state.shutdown.child_token(),
        Some(Instant::now() + state.config.request_timeout()),
    );

    tracing::info!(input_len = input.as_str().len(), %method, "Running recognition");
    let recognition = state.runner.run(&input, &parent).await?;

    Ok(Json(OcrResponse {
        result: recognition.result,
    }))
}

/// First `url` value in the query string, if any.
///
/// Taking the pairs as a list means a repeated or odd parameter never turns
/// into an extractor rejection.
fn first_url(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .find_map(|(key, value)| (key == "url").then_some(value))
}

/// Pick the untrimmed input: the query value first, then the POST body.
fn raw_input(method: &Method, query_url: Option<String>, body: &[u8]) -> AppResult<String> {
    let from_query = query_url.unwrap_or_default();
    if !from_query.trim().is_empty() || method != Method::POST {
        return Ok(from_query);
    }

    let request: OcrRequest =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidJson(e.to_string()))?;
    Ok(request.url.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn query(url: Option<&str>) -> Option<String> {
        url.map(str::to_string)
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn first_url_wins_when_repeated() {
        let params = pairs(&[("lang", "en"), ("url", "a"), ("url", "b")]);
        assert_eq!(first_url(params), Some("a".to_string()));
    }

    #[test]
    fn first_url_absent() {
        assert_eq!(first_url(pairs(&[("uri", "a")])), None);
    }

    #[test]
    fn get_uses_query_value() {
        let raw = raw_input(&Method::GET, query(Some("https://a/b.png")), b"").unwrap();
        assert_eq!(raw, "https://a/b.png");
    }

    #[test]
    fn get_ignores_body() {
        let raw = raw_input(&Method::GET, query(None), br#"{"url":"x"}"#).unwrap();
        assert_eq!(raw, "");
    }

    #[test]
    fn post_prefers_query_value() {
        let raw = raw_input(&Method::POST, query(Some("from-query")), b"not json").unwrap();
        assert_eq!(raw, "from-query");
    }

    #[test]
    fn post_falls_back_to_body() {
        let body = br#"{"url":" from-body "}"#;
        let raw = raw_input(&Method::POST, query(Some("  ")), body).unwrap();
        assert_eq!(raw, " from-body ");
    }

    #[test]
    fn post_without_url_field_is_empty() {
        let raw = raw_input(&Method::POST, query(None), b"{}").unwrap();
        assert_eq!(raw, "");
    }

    #[test]
    fn post_with_malformed_body_is_invalid_json() {
        let err = raw_input(&Method::POST, query(None), b"{\"url\":").unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
    }

    #[test]
    fn post_with_empty_body_is_invalid_json() {
        let err = raw_input(&Method::POST, query(None), b"").unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
    }
}
