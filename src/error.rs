// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::auth::AuthError;
use crate::ledger::LedgerError;

/// Error returned by every handler.
///
/// Serialized as `{ "error": <message>, "error_code": <code>, ...details }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
    /// Extra fields merged into the body.
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let code = match status {
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
            StatusCode::INTERNAL_SERVER_ERROR => "internal_error",
            _ => "bad_request",
        };
        Self {
            status,
            message: message.into(),
            code,
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        if matches!(e, LedgerError::Unavailable(_)) {
            warn!(error = %e, "Ledger unavailable");
        }
        Self {
            status: e.status_code(),
            message: e.to_string(),
            code: e.error_code(),
            details: e.details(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self {
            status: e.status_code(),
            message: e.to_string(),
            code: e.error_code(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(self.message));
        body.insert("error_code".to_string(), Value::String(self.code.to_string()));
        if let Some(Value::Object(details)) = self.details {
            for (key, value) in details {
                body.entry(key).or_insert(value);
            }
        }
        (self.status, Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let (status, body) = body_of(ApiError::bad_request("bad data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad data");
        assert_eq!(body["error_code"], "bad_request");
    }

    #[tokio::test]
    async fn insufficient_points_carries_amounts() {
        let error = ApiError::from(LedgerError::InsufficientPoints {
            available: 150,
            required: 500,
        });
        let (status, body) = body_of(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error_code"], "insufficient_points");
        assert_eq!(body["available"], 150);
        assert_eq!(body["required"], 500);
    }

    #[tokio::test]
    async fn ledger_errors_map_to_distinct_statuses() {
        let cases = [
            (LedgerError::AccountNotFound("x".into()), StatusCode::NOT_FOUND),
            (LedgerError::InvalidMaterial("wood".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (LedgerError::DuplicatePhone("81".into()), StatusCode::CONFLICT),
            (LedgerError::Unavailable("disk".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, expected) in cases {
            let code = error.error_code();
            let (status, body) = body_of(error.into()).await;
            assert_eq!(status, expected);
            assert_eq!(body["error_code"], code);
        }
    }

    #[tokio::test]
    async fn auth_errors_keep_their_code() {
        let (status, body) = body_of(AuthError::SessionEnded.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "session_ended");
    }
}
