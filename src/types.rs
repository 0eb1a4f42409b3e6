// =============================================================================
// Shared types for the kline ingestion pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// One raw kline row exactly as the exchange returned it: a 12-element JSON
/// array mixing strings (prices, volumes) and numbers (timestamps, trade
/// count). The trailing 12th field is documented as ignorable.
pub type RawKline = Vec<serde_json::Value>;

/// One typed OHLCV candle, keyed by `open_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, milliseconds since epoch. Primary key in storage.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Base-asset volume (ETH).
    pub volume: f64,
    /// Bucket close time, milliseconds since epoch. Always > `open_time`.
    pub close_time: i64,
    /// Quote-asset volume (USDT).
    pub quote_asset_volume: f64,
    pub number_of_trades: i64,
    pub taker_buy_base_volume: f64,
    pub taker_buy_quote_volume: f64,
}
