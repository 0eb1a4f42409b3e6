// =============================================================================
// Binance market-data access
// =============================================================================

pub mod client;

use std::future::Future;

use crate::error::IngestError;
use crate::time_range::TimeRange;
use crate::types::RawKline;

/// The single trading pair this service ingests.
pub const SYMBOL: &str = "ETHUSDT";

/// Environment variables consulted when credentials are not passed explicitly.
pub const API_KEY_ENV: &str = "BINANCE_API_KEY";
pub const API_SECRET_ENV: &str = "BINANCE_API_SECRET";

/// A source of raw kline rows. Production uses [`client::BinanceClient`];
/// tests substitute a stub so the pipeline runs without network access.
pub trait KlineSource {
    /// Fetch raw kline rows for `symbol` over `[range.start, range.end)` at
    /// `interval` granularity, in ascending open-time order.
    fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
    ) -> impl Future<Output = Result<Vec<RawKline>, IngestError>> + Send;
}

/// Exchange API credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Resolve credentials from explicit values and environment values, in
    /// that order of precedence. Returns `None` when no key is available, in
    /// which case the client runs unauthenticated (fine for public market
    /// data, but without the higher request-rate limits).
    pub fn resolve(
        explicit_key: Option<String>,
        explicit_secret: Option<String>,
        env_key: Option<String>,
        env_secret: Option<String>,
    ) -> Option<Self> {
        let api_key = explicit_key.or(env_key).unwrap_or_default();
        let api_secret = explicit_secret.or(env_secret).unwrap_or_default();
        if api_key.is_empty() {
            None
        } else {
            Some(Self {
                api_key,
                api_secret,
            })
        }
    }

    /// [`resolve`](Self::resolve) with the environment side read from
    /// `BINANCE_API_KEY` / `BINANCE_API_SECRET`.
    pub fn resolve_with_env(
        explicit_key: Option<String>,
        explicit_secret: Option<String>,
    ) -> Option<Self> {
        Self::resolve(
            explicit_key,
            explicit_secret,
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_SECRET_ENV).ok(),
        )
    }
}
