// =============================================================================
// HTTP API surface
// =============================================================================

pub mod rest;

use std::path::PathBuf;

use crate::binance::client::BinanceClient;

/// Shared state handed to every request handler.
pub struct AppState {
    /// Exchange client built once at startup (credentials from environment).
    pub client: BinanceClient,
    /// Database file used when a sync request does not name one.
    pub default_db: PathBuf,
}
