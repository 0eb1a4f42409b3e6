// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Three routes: `GET /` (service info), `GET /health` (liveness), and
// `POST /sync` (run one ingestion). Every failure maps to an HTTP error
// status with a structured `{success: false, error}` body — validation
// errors are 400, upstream exchange problems 502, storage problems 500.
//
// CORS is configured permissively for development; tighten the allowed
// origins in production.
// =============================================================================

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::api::AppState;
use crate::error::IngestError;
use crate::ingest;

/// Build the REST router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/sync", post(sync))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Service info
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "sync": "POST /sync — fetch and store ETHUSDT klines",
            "health": "GET /health — liveness probe",
        },
    }))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Sync
// =============================================================================

#[derive(Deserialize)]
struct SyncRequest {
    start: String,
    end: String,
    #[serde(default = "default_interval")]
    interval: String,
    /// Falls back to the server's configured default database.
    #[serde(default)]
    db_path: Option<String>,
}

fn default_interval() -> String {
    "1h".to_string()
}

#[derive(Serialize)]
struct SyncResponse {
    success: bool,
    message: String,
    records_count: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

async fn sync(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SyncRequest>,
) -> Response {
    let db_path = match &req.db_path {
        Some(p) => Path::new(p).to_path_buf(),
        None => state.default_db.clone(),
    };

    match ingest::ingest_klines(&req.start, &req.end, &req.interval, &db_path, &state.client).await
    {
        Ok(n) => Json(SyncResponse {
            success: true,
            message: format!("ingested {n} klines into {}", db_path.display()),
            records_count: n,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "sync request failed");
            (
                error_status(&e),
                Json(ErrorResponse {
                    success: false,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Map pipeline failures onto HTTP statuses: caller mistakes are 4xx,
/// upstream exchange trouble is 502, local storage trouble is 500.
fn error_status(err: &IngestError) -> StatusCode {
    match err {
        IngestError::InvalidTimeFormat(_) | IngestError::InvalidTimeRange { .. } => {
            StatusCode::BAD_REQUEST
        }
        IngestError::MalformedRecord { .. } | IngestError::ExchangeRequest(_) => {
            StatusCode::BAD_GATEWAY
        }
        IngestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn user_errors_map_to_bad_request() {
        let dt = NaiveDate::from_ymd_opt(2025, 10, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            error_status(&IngestError::InvalidTimeFormat("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&IngestError::InvalidTimeRange { start: dt, end: dt }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upstream_and_storage_errors_map_to_server_side_statuses() {
        assert_eq!(
            error_status(&IngestError::ExchangeRequest("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&IngestError::MalformedRecord {
                index: 0,
                field: "open",
                value: "x".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&IngestError::Storage("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
