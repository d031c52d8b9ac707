//! API error type and its JSON rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use guestbook_store::StoreError;

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid comment payload")]
    InvalidPayload(String),

    #[error("Comment ID is required")]
    MissingId,

    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("endpoint not found")]
    NotFound,
}

impl ApiError {
    /// Wrap a store failure with the message shown to the caller.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::InvalidPayload(details) => Some(details.clone()),
            ApiError::Store { source, .. } => Some(source.to_string()),
            ApiError::MissingId | ApiError::NotFound => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store { context, source } = &self {
            error!(error = %source, "{context}");
        }
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::MissingId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidPayload("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        let err = ApiError::store("Failed to fetch comments")(StoreError::Query("boom".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_error_carries_details() {
        let err = ApiError::store("Failed to save comment")(StoreError::Query("disk full".into()));
        assert_eq!(err.to_string(), "Failed to save comment");
        assert_eq!(err.details().as_deref(), Some("query error: disk full"));
    }
}
