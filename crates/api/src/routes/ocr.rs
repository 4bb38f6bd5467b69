//! Route definitions for the recognition endpoint.

use axum::routing::get;
use axum::Router;

use crate::handlers::ocr;
use crate::state::AppState;

/// ```text
/// GET  /ocr?url=<input>      -> recognize
/// POST /ocr {"url": "..."}   -> recognize
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/ocr", get(ocr::recognize).post(ocr::recognize))
}
