//! Scan trigger and progress polling endpoints.
//!
//! Clients POST to start a run, then poll the progress endpoint (every ~2s)
//! until the record reaches `completed` or `failed`.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use ingestion::RunMode;
use serde::Serialize;
use serde_json::json;

use crate::server::app::AppState;

#[derive(Debug, Serialize)]
pub struct ScanAccepted {
    pub handle: String,
    pub mode: RunMode,
}

fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

fn start_run(state: &AppState, raw_handle: &str, mode: RunMode) -> Response {
    let handle = normalize_handle(raw_handle);
    if handle.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "handle is required" })),
        )
            .into_response();
    }

    let ingestion = state.deps.ingestion.clone();
    let task_handle = handle.clone();
    tokio::spawn(async move {
        let outcome = ingestion.run(&task_handle, mode).await;
        if let Some(error) = outcome.error {
            tracing::warn!(handle = %task_handle, %mode, %error, "Background scan failed");
        }
    });

    tracing::info!(%handle, %mode, "Scan accepted");
    (StatusCode::ACCEPTED, Json(ScanAccepted { handle, mode })).into_response()
}

/// Start a full scan (content, entities, persona)
pub async fn scan_handler(
    Extension(state): Extension<AppState>,
    Path(handle): Path<String>,
) -> Response {
    start_run(&state, &handle, RunMode::Full)
}

/// Start a rescan (content and entities only)
pub async fn rescan_handler(
    Extension(state): Extension<AppState>,
    Path(handle): Path<String>,
) -> Response {
    start_run(&state, &handle, RunMode::Rescan)
}

/// Current progress record, with the ETA recomputed for runs in flight
pub async fn progress_handler(
    Extension(state): Extension<AppState>,
    Path(handle): Path<String>,
) -> Response {
    let handle = normalize_handle(&handle);
    match state.deps.ingestion.progress(&handle).await {
        Some(mut record) => {
            record.estimated_seconds_remaining = record.live_eta(Utc::now());
            (StatusCode::OK, Json(record)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no scan in progress" })),
        )
            .into_response(),
    }
}
