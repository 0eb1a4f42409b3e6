// =============================================================================
// kline-sync — Main Entry Point
// =============================================================================
//
// Two subcommands: `sync` runs one fetch-transform-store pass over a time
// range and prints the affected-row count; `serve` exposes the same pipeline
// over HTTP. Exit code is 0 on success and non-zero on failure.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod binance;
mod error;
mod ingest;
mod store;
mod time_range;
mod transform;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::binance::client::BinanceClient;
use crate::binance::Credentials;
use crate::store::DEFAULT_DB_PATH;

#[derive(Parser)]
#[command(
    name = "kline-sync",
    about = "Fetch ETHUSDT klines from Binance and store them in SQLite"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a time range of klines and upsert them into the database.
    Sync {
        /// Start time: YYYY-MM-DD, YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS.
        #[arg(long)]
        start: String,

        /// End time (exclusive), same formats as --start.
        #[arg(long)]
        end: String,

        /// Kline interval, e.g. 1m, 5m, 15m, 30m, 1h, 4h, 1d.
        #[arg(long, default_value = "1h")]
        interval: String,

        /// SQLite database file path.
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: PathBuf,

        /// Binance API key. Falls back to BINANCE_API_KEY.
        #[arg(long)]
        api_key: Option<String>,

        /// Binance API secret. Falls back to BINANCE_API_SECRET.
        #[arg(long)]
        api_secret: Option<String>,
    },
    /// Run the HTTP API server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: String,

        /// Default SQLite database file for /sync requests.
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Environment & logging ────────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            start,
            end,
            interval,
            db,
            api_key,
            api_secret,
        } => {
            let client = BinanceClient::new(Credentials::resolve_with_env(api_key, api_secret));
            let affected = ingest::ingest_klines(&start, &end, &interval, &db, &client).await?;
            println!("{affected} klines written to {}", db.display());
        }
        Commands::Serve { bind, db } => {
            let state = Arc::new(AppState {
                client: BinanceClient::new(Credentials::resolve_with_env(None, None)),
                default_db: db,
            });

            let app = api::rest::router(state);
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!(addr = %bind, "API server listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
