use std::sync::Arc;

use ocr_gateway_core::runner::ProcessRunner;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; nothing in it is mutable.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Runner for the recognition script, resolved at startup.
    pub runner: ProcessRunner,
    /// Cancelled when the server shuts down. Every request scope is a child
    /// of this token.
    pub shutdown: CancellationToken,
}
