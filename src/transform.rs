// =============================================================================
// Raw kline rows → typed candles
// =============================================================================
//
// Pure, side-effect-free mapping. Binance documents a fixed 12-field row:
//
//   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
//   [6] closeTime, [7] quoteAssetVolume, [8] numberOfTrades,
//   [9] takerBuyBaseVolume, [10] takerBuyQuoteVolume, [11] ignore
//
// Timestamps and the trade count arrive as JSON numbers, prices and volumes
// as JSON strings. Any field that fails to parse is a contract violation
// against the documented response shape and is surfaced as MalformedRecord,
// never coerced to a default.
// =============================================================================

use serde_json::Value;

use crate::error::IngestError;
use crate::types::{Candle, RawKline};

/// Fields per raw kline row, including the ignorable trailing one.
const RAW_FIELD_COUNT: usize = 12;

/// Transform an entire fetched batch. Fails on the first malformed row, so
/// callers that persist the result never see a partially converted batch.
pub fn transform_batch(rows: &[RawKline]) -> Result<Vec<Candle>, IngestError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| candle_from_raw(index, row))
        .collect()
}

/// Convert one raw 12-field row into a typed [`Candle`]. `index` is the row's
/// position in the batch, used only for error reporting.
pub fn candle_from_raw(index: usize, row: &[Value]) -> Result<Candle, IngestError> {
    if row.len() < RAW_FIELD_COUNT {
        return Err(IngestError::MalformedRecord {
            index,
            field: "length",
            value: format!("{} fields (expected {RAW_FIELD_COUNT})", row.len()),
        });
    }

    let number_of_trades = field_i64(index, row, 8, "number_of_trades")?;
    if number_of_trades < 0 {
        return Err(IngestError::MalformedRecord {
            index,
            field: "number_of_trades",
            value: number_of_trades.to_string(),
        });
    }

    Ok(Candle {
        open_time: field_i64(index, row, 0, "open_time")?,
        open: field_f64(index, row, 1, "open")?,
        high: field_f64(index, row, 2, "high")?,
        low: field_f64(index, row, 3, "low")?,
        close: field_f64(index, row, 4, "close")?,
        volume: field_f64(index, row, 5, "volume")?,
        close_time: field_i64(index, row, 6, "close_time")?,
        quote_asset_volume: field_f64(index, row, 7, "quote_asset_volume")?,
        number_of_trades,
        taker_buy_base_volume: field_f64(index, row, 9, "taker_buy_base_volume")?,
        taker_buy_quote_volume: field_f64(index, row, 10, "taker_buy_quote_volume")?,
        // row[11] is the documented ignore field -- dropped.
    })
}

/// Parse a field that may be a JSON integer or a decimal string.
fn field_i64(index: usize, row: &[Value], pos: usize, field: &'static str) -> Result<i64, IngestError> {
    let val = &row[pos];
    val.as_i64()
        .or_else(|| val.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| IngestError::MalformedRecord {
            index,
            field,
            value: val.to_string(),
        })
}

/// Parse a field that may be a JSON number or a numeric string.
fn field_f64(index: usize, row: &[Value], pos: usize, field: &'static str) -> Result<f64, IngestError> {
    let val = &row[pos];
    val.as_f64()
        .or_else(|| val.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| IngestError::MalformedRecord {
            index,
            field,
            value: val.to_string(),
        })
}
