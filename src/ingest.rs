// =============================================================================
// Ingestion pipeline — parse → fetch → transform → persist
// =============================================================================
//
// The store is only touched after the ENTIRE batch has fetched and
// transformed successfully, so a mid-batch failure leaves the database
// exactly as it was. No retries anywhere; every error belongs to this one
// call and goes straight back to the caller.
// =============================================================================

use std::path::Path;

use tracing::info;

use crate::binance::{KlineSource, SYMBOL};
use crate::error::IngestError;
use crate::store::CandleStore;
use crate::time_range::TimeRange;
use crate::transform::transform_batch;

/// Run one ingestion: fetch ETHUSDT klines for `[start, end)` at `interval`
/// granularity from `source` and upsert them into the database at `db_path`.
/// Returns the number of rows affected (insertions plus replacements).
pub async fn ingest_klines<S>(
    start: &str,
    end: &str,
    interval: &str,
    db_path: &Path,
    source: &S,
) -> Result<usize, IngestError>
where
    S: KlineSource + Sync,
{
    let range = TimeRange::parse(start, end)?;
    info!(
        symbol = SYMBOL,
        interval,
        start = %range.start(),
        end = %range.end(),
        "starting kline ingestion"
    );

    let raw = source.fetch_klines(SYMBOL, interval, &range).await?;
    let candles = transform_batch(&raw)?;

    let mut store = CandleStore::open(db_path)?;
    let affected = store.upsert_batch(&candles)?;

    info!(
        rows = affected,
        db = %db_path.display(),
        "kline ingestion complete"
    );
    Ok(affected)
}
