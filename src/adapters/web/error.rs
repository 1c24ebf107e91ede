//! HTTP error responses for web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::domain::error::BidSignalError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &BidSignalError) -> StatusCode {
    match err {
        BidSignalError::InvalidAnchor { .. } => StatusCode::BAD_REQUEST,
        BidSignalError::MalformedRow { .. } | BidSignalError::EmptyLedger { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BidSignalError::LedgerRead { .. }
        | BidSignalError::ConfigParse { .. }
        | BidSignalError::ConfigMissing { .. }
        | BidSignalError::ConfigInvalid { .. }
        | BidSignalError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<BidSignalError> for WebError {
    fn from(err: BidSignalError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
