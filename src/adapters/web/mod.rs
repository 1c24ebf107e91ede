//! Web server adapter.
//!
//! Serves the confirmation engine over HTTP as JSON. The ledger is read
//! through the [`LedgerPort`] on every request, so the response always
//! reflects the ledger currently on disk.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{Router, routing::get};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::confirmation::EvaluationConfig;
use crate::ports::ledger_port::LedgerPort;

pub struct AppState {
    pub ledger_port: Arc<dyn LedgerPort + Send + Sync>,
    pub evaluation: EvaluationConfig,
    /// Used when a request omits `anchor_date`.
    pub default_anchor: NaiveDate,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/signal", get(handlers::signal))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
