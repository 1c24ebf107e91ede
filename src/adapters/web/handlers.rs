//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::confirmation::{evaluate, parse_anchor_date, ConfirmationResult};

use super::{AppState, WebError};

#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    pub anchor_date: Option<String>,
}

/// GET /signal?anchor_date=YYYY-MM-DD
pub async fn signal(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignalQuery>,
) -> Result<Json<ConfirmationResult>, WebError> {
    let anchor_date = match query
        .anchor_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(raw) => parse_anchor_date(raw)?,
        None => state.default_anchor,
    };

    let port = Arc::clone(&state.ledger_port);
    let load = tokio::task::spawn_blocking(move || port.load())
        .await
        .map_err(|e| WebError::internal(format!("ledger load task failed: {e}")))??;

    if !load.rejected.is_empty() {
        tracing::warn!(
            rejected = load.rejected.len(),
            "ledger contains malformed rows; evaluating without them"
        );
    }

    let result = evaluate(&load.rows, anchor_date, &state.evaluation)?;
    tracing::info!(
        %anchor_date,
        confirmed = result.confirmed,
        confidence = result.confidence,
        "served signal"
    );
    Ok(Json(result))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn not_found() -> WebError {
    WebError::not_found("not found")
}
