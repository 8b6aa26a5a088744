// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    api::accounts::HistoryResponse,
    auth::{Auth, AuthError, EndUserOnly},
    error::ApiError,
    models::Account,
    state::AppState,
};

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// The signed-in account, with its current balance
    pub account: Account,
    /// Session ID
    pub session_id: String,
    /// When the session expires
    pub expires_at: DateTime<Utc>,
}

/// Get the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserMeResponse>, ApiError> {
    let account = state.accounts.find_by_id(&user.account_id).await?;
    let expires_at = DateTime::<Utc>::from_timestamp(user.expires_at, 0)
        .ok_or_else(|| AuthError::InternalError("session expiry out of range".to_string()))?;

    Ok(Json(UserMeResponse {
        account,
        session_id: user.session_id,
        expires_at,
    }))
}

/// Balance, recycling history and redemption history of the caller.
#[utoipa::path(
    get,
    path = "/v1/users/me/history",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Own history, newest first", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "End users only")
    )
)]
pub async fn get_my_history(
    EndUserOnly(user): EndUserOnly,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.ledger.history_for(&user.account_id).await?;
    Ok(Json(history.into()))
}
