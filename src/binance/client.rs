// =============================================================================
// Binance REST API Client — historical klines
// =============================================================================
//
// Only the public /api/v3/klines endpoint is used, so no request signing is
// required. When an API key is available it is still sent as the X-MBX-APIKEY
// header, which buys higher request-rate limits. The secret is never logged.
//
// Binance caps each klines response at 1000 rows; the client pages forward
// through the requested window internally so callers see one logical fetch.
// Transient failures are NOT retried — any error propagates to the caller.
// =============================================================================

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::binance::{Credentials, KlineSource};
use crate::error::IngestError;
use crate::time_range::TimeRange;
use crate::types::RawKline;

/// Maximum rows Binance returns per klines request.
const KLINES_PAGE_LIMIT: usize = 1000;

/// Binance REST API client for public market data.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    authenticated: bool,
}

impl BinanceClient {
    /// Create a new `BinanceClient`. With `None` credentials the client is
    /// unauthenticated, which is sufficient for public market data.
    pub fn new(credentials: Option<Credentials>) -> Self {
        let mut default_headers = HeaderMap::new();
        let authenticated = credentials.is_some();
        if let Some(creds) = credentials {
            if let Ok(val) = HeaderValue::from_str(&creds.api_key) {
                default_headers.insert("X-MBX-APIKEY", val);
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        debug!(authenticated, "BinanceClient initialised (base_url=https://api.binance.com)");

        Self {
            base_url: "https://api.binance.com".to_string(),
            client,
            authenticated,
        }
    }

    /// GET /api/v3/klines over `[range.start, range.end)`, paging forward
    /// until the window is exhausted.
    ///
    /// Rows come back untyped: 12-element JSON arrays in ascending open-time
    /// order, exactly as the exchange sent them.
    #[instrument(skip(self, range), name = "binance::get_klines")]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
    ) -> Result<Vec<RawKline>, IngestError> {
        let end_ms = range.end_millis();
        let mut cursor = range.start_millis();
        let mut rows: Vec<RawKline> = Vec::new();

        loop {
            let page = self
                .fetch_klines_page(symbol, interval, cursor, end_ms)
                .await?;
            let page_len = page.len();
            // Advance the cursor past the last open_time before consuming
            // the page. An unreadable open_time ends paging here; the
            // transformer reports it as a malformed record.
            let last_open = page.last().and_then(|row| row.first()).and_then(open_time_ms);
            rows.extend(page);

            match last_open {
                Some(t) if page_len == KLINES_PAGE_LIMIT && t + 1 < end_ms => {
                    cursor = t + 1;
                }
                _ => break,
            }
        }

        debug!(symbol, interval, count = rows.len(), "klines fetched");
        Ok(rows)
    }

    /// One page of at most [`KLINES_PAGE_LIMIT`] rows. `end_ms` is exclusive;
    /// Binance's endTime parameter is inclusive, hence the -1.
    async fn fetch_klines_page(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawKline>, IngestError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
            self.base_url,
            symbol,
            interval,
            start_ms,
            end_ms - 1,
            KLINES_PAGE_LIMIT
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if !status.is_success() {
            return Err(IngestError::ExchangeRequest(format!(
                "Binance GET /api/v3/klines returned {status}: {body}"
            )));
        }

        let rows = body
            .as_array()
            .ok_or_else(|| {
                IngestError::ExchangeRequest(format!("klines response is not an array: {body}"))
            })?
            .iter()
            .map(|entry| {
                entry.as_array().cloned().ok_or_else(|| {
                    IngestError::ExchangeRequest(format!("kline entry is not an array: {entry}"))
                })
            })
            .collect::<Result<Vec<RawKline>, _>>()?;

        Ok(rows)
    }
}

impl KlineSource for BinanceClient {
    fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        range: &TimeRange,
    ) -> impl std::future::Future<Output = Result<Vec<RawKline>, IngestError>> + Send {
        self.get_klines(symbol, interval, range)
    }
}

/// Read an open_time cell that may be a JSON integer or a numeric string.
fn open_time_ms(val: &serde_json::Value) -> Option<i64> {
    val.as_i64()
        .or_else(|| val.as_str().and_then(|s| s.parse().ok()))
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.authenticated)
            .finish()
    }
}
