// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in and sign-out.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{
    audit_log,
    auth::{Auth, AuthError},
    error::ApiError,
    models::Account,
    state::AppState,
    storage::{AuditEvent, AuditEventType, AuditRepository},
};

/// Sign-in request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignInRequest {
    /// Phone number in any formatting
    pub phone: String,
    pub password: String,
}

/// A started session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// Sign in with phone number and password.
#[utoipa::path(
    post,
    path = "/v1/sessions",
    tag = "Sessions",
    request_body = SignInRequest,
    responses(
        (status = 201, description = "Session started", body = SessionResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "No account for this phone")
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = match state
        .sessions
        .authenticate(&request.phone, &request.password)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials | AuthError::AccountNotFound(_)) {
                AuditRepository::new(state.storage()).record(
                    AuditEvent::new(AuditEventType::AuthFailure)
                        .with_resource("phone", request.phone.as_str())
                        .failed(e.to_string()),
                );
            }
            return Err(e.into());
        }
    };

    AuditRepository::new(state.storage()).record(
        AuditEvent::new(AuditEventType::SessionStarted)
            .with_actor(session.account.id.as_str())
            .with_resource("session", session.record.session_id.as_str()),
    );

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: session.token,
            token_type: "Bearer".to_string(),
            session_id: session.record.session_id,
            expires_at: session.record.expires_at,
            account: session.account,
        }),
    ))
}

/// End the caller's session.
///
/// The token stops working immediately.
#[utoipa::path(
    delete,
    path = "/v1/sessions/current",
    tag = "Sessions",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn end_session(Auth(user): Auth, State(state): State<AppState>) -> StatusCode {
    state.sessions.end_session(&user.session_id).await;
    audit_log!(
        state.storage(),
        AuditEventType::SessionEnded,
        &user,
        "session",
        user.session_id.as_str()
    );
    info!(account_id = %user.account_id, "Signed out");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::state::test_support::*;

    fn sign_in_request(phone: &str, password: &str) -> SignInRequest {
        SignInRequest {
            phone: phone.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn start_session_returns_token_and_account() {
        let (state, _temp) = test_state().await;

        let (status, Json(response)) = start_session(
            State(state.clone()),
            Json(sign_in_request("(81) 98888-8888", DEMO_PASSWORD)),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.account.role, Role::DropOffOperator);
        assert_eq!(response.account.affiliation.as_deref(), Some("1"));

        let user = state.sessions.verify(&response.token).await.unwrap();
        assert_eq!(user.affiliation.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn unknown_phone_is_404() {
        let (state, _temp) = test_state().await;

        let err = start_session(State(state), Json(sign_in_request("81000000000", "x")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "account_not_found");
    }

    #[tokio::test]
    async fn end_session_revokes_token() {
        let (state, _temp) = test_state().await;
        let token = sign_in(&state, END_USER_PHONE).await;
        let user = state.sessions.verify(&token).await.unwrap();

        let status = end_session(Auth(user), State(state.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(matches!(
            state.sessions.verify(&token).await,
            Err(AuthError::SessionEnded)
        ));
    }
}
