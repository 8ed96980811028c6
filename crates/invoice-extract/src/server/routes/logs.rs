//! Activity log endpoints

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::LogsResponse;

/// GET /logs - Current activity log, oldest first
pub async fn list_logs(State(state): State<AppState>) -> Result<Json<LogsResponse>> {
    let logs = state.log_store().list().await?;
    tracing::debug!("Returning {} log entries", logs.len());

    Ok(Json(LogsResponse {
        success: true,
        logs,
    }))
}

/// GET /logs/test - Liveness probe for the log routes
pub async fn logs_test(State(state): State<AppState>) -> Json<Value> {
    let mount = state.config().server.mount_path.trim_end_matches('/');
    Json(json!({
        "message": "Logs endpoint is working",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "logsPath": format!("Check {}/logs for actual logs", mount),
    }))
}
