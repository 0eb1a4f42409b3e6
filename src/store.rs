// =============================================================================
// SQLite candle store — idempotent bulk upsert keyed by open_time
// =============================================================================
//
// One table, one file, no migrations. `INSERT OR REPLACE` gives full-replace
// semantics per row: re-ingesting an open_time overwrites every non-key
// column. SQLite reports one changed row per statement whether it inserted
// or replaced, so the returned count is insertions + replacements.
// =============================================================================

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::IngestError;
use crate::types::Candle;

/// Database file used when the caller does not name one.
pub const DEFAULT_DB_PATH: &str = "data/market.db";

const KLINE_TABLE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS eth_klines (
    open_time              INTEGER PRIMARY KEY,
    open                   REAL NOT NULL,
    high                   REAL NOT NULL,
    low                    REAL NOT NULL,
    close                  REAL NOT NULL,
    volume                 REAL NOT NULL,
    close_time             INTEGER NOT NULL,
    quote_asset_volume     REAL NOT NULL,
    number_of_trades       INTEGER NOT NULL,
    taker_buy_base_volume  REAL NOT NULL,
    taker_buy_quote_volume REAL NOT NULL
);
";

const UPSERT_SQL: &str = "
INSERT OR REPLACE INTO eth_klines (
    open_time, open, high, low, close, volume, close_time,
    quote_asset_volume, number_of_trades,
    taker_buy_base_volume, taker_buy_quote_volume
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);
";

/// Handle to one candle database file.
pub struct CandleStore {
    conn: Connection,
}

impl CandleStore {
    /// Open (or create) the database at `path`, ensuring the parent directory
    /// and the kline table exist. Safe to call repeatedly.
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(KLINE_TABLE_SCHEMA)?;
        debug!(path = %path.display(), "candle store opened");
        Ok(Self { conn })
    }

    /// Write every candle in one transaction, replacing rows that share an
    /// `open_time`. Returns the number of rows affected.
    pub fn upsert_batch(&mut self, candles: &[Candle]) -> Result<usize, IngestError> {
        let tx = self.conn.transaction()?;
        let mut affected = 0usize;
        {
            let mut stmt = tx.prepare(UPSERT_SQL)?;
            for c in candles {
                affected += stmt.execute(params![
                    c.open_time,
                    c.open,
                    c.high,
                    c.low,
                    c.close,
                    c.volume,
                    c.close_time,
                    c.quote_asset_volume,
                    c.number_of_trades,
                    c.taker_buy_base_volume,
                    c.taker_buy_quote_volume,
                ])?;
            }
        }
        tx.commit()?;
        debug!(rows = affected, "candle batch upserted");
        Ok(affected)
    }

    /// Number of stored candles.
    pub fn count(&self) -> Result<i64, IngestError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM eth_klines", [], |row| row.get(0))?;
        Ok(n)
    }

    /// All stored candles in chronological order.
    pub fn fetch_all(&self) -> Result<Vec<Candle>, IngestError> {
        let mut stmt = self.conn.prepare(
            "SELECT open_time, open, high, low, close, volume, close_time,
                    quote_asset_volume, number_of_trades,
                    taker_buy_base_volume, taker_buy_quote_volume
             FROM eth_klines
             ORDER BY open_time ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Candle {
                    open_time: row.get(0)?,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                    close_time: row.get(6)?,
                    quote_asset_volume: row.get(7)?,
                    number_of_trades: row.get(8)?,
                    taker_buy_base_volume: row.get(9)?,
                    taker_buy_quote_volume: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open_time: i64, close: f64) -> Candle {
        Candle {
            open_time,
            open: 3000.0,
            high: 3100.0,
            low: 2950.0,
            close,
            volume: 123.4,
            close_time: open_time + 3_600_000,
            quote_asset_volume: 400_000.0,
            number_of_trades: 800,
            taker_buy_base_volume: 60.0,
            taker_buy_quote_volume: 200_000.0,
        }
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("market.db");
        let store = CandleStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.db");
        {
            let mut store = CandleStore::open(&path).unwrap();
            store.upsert_batch(&[candle(1, 3050.0)]).unwrap();
        }
        // Reopening must not clobber the table or existing rows.
        let store = CandleStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn upsert_replaces_existing_open_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CandleStore::open(&dir.path().join("market.db")).unwrap();

        assert_eq!(store.upsert_batch(&[candle(1000, 3050.0)]).unwrap(), 1);
        assert_eq!(store.upsert_batch(&[candle(1000, 9999.0)]).unwrap(), 1);

        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 9999.0);
    }

    #[test]
    fn batch_reports_total_affected_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CandleStore::open(&dir.path().join("market.db")).unwrap();

        let batch = vec![candle(1000, 1.0), candle(2000, 2.0), candle(3000, 3.0)];
        assert_eq!(store.upsert_batch(&batch).unwrap(), 3);
        // Second pass replaces all three; count stays stable.
        assert_eq!(store.upsert_batch(&batch).unwrap(), 3);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn fetch_all_is_chronological() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CandleStore::open(&dir.path().join("market.db")).unwrap();
        store
            .upsert_batch(&[candle(3000, 3.0), candle(1000, 1.0), candle(2000, 2.0)])
            .unwrap();
        let times: Vec<i64> = store.fetch_all().unwrap().iter().map(|c| c.open_time).collect();
        assert_eq!(times, vec![1000, 2000, 3000]);
    }
}
