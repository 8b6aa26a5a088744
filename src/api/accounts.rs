// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and operator lookups.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::OperatorOnly,
    error::ApiError,
    ledger::AccountHistory,
    models::{Account, AccountId, RecycleEvent, RedemptionEvent, RegistrationInfo},
    state::AppState,
    storage::{AuditEvent, AuditEventType, AuditRepository},
};

/// Response after registering an account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub account: Account,
    pub message: String,
}

/// Query parameters for phone lookup.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Phone number in any formatting
    pub phone: String,
}

/// An account's balance and both histories, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub account_id: AccountId,
    pub point_balance: u64,
    pub recycling: Vec<RecycleEvent>,
    pub redemptions: Vec<RedemptionEvent>,
}

impl From<AccountHistory> for HistoryResponse {
    fn from(history: AccountHistory) -> Self {
        Self {
            account_id: history.account.id,
            point_balance: history.account.point_balance,
            recycling: history.recycling.to_vec(),
            redemptions: history.redemptions.to_vec(),
        }
    }
}

/// Register a new end-user account.
///
/// The phone number is normalized to digits before it is checked for
/// duplicates, so `(81) 99999-9999` and `81999999999` are the same account.
#[utoipa::path(
    post,
    path = "/v1/accounts",
    tag = "Accounts",
    request_body = RegistrationInfo,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 409, description = "Phone already registered"),
        (status = 422, description = "Invalid phone or name")
    )
)]
pub async fn register_account(
    State(state): State<AppState>,
    Json(request): Json<RegistrationInfo>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let password = request.password.clone();
    if password.is_empty() {
        return Err(ApiError::unprocessable("password must not be empty"));
    }

    let account = state.accounts.create(request).await?;
    if let Err(e) = state.sessions.enroll(&account.id, &password) {
        state.accounts.discard(&account).await;
        return Err(e.into());
    }

    AuditRepository::new(state.storage()).record(
        AuditEvent::new(AuditEventType::AccountRegistered)
            .with_actor(account.id.as_str())
            .with_resource("account", account.id.as_str()),
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account,
            message: "Account registered successfully".to_string(),
        }),
    ))
}

/// Find an account by phone number.
#[utoipa::path(
    get,
    path = "/v1/accounts/lookup",
    tag = "Accounts",
    security(("bearer" = [])),
    params(LookupQuery),
    responses(
        (status = 200, description = "Account found", body = Account),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Operators only"),
        (status = 404, description = "No account for this phone")
    )
)]
pub async fn lookup_account(
    OperatorOnly(_operator): OperatorOnly,
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Account>, ApiError> {
    let account = state.accounts.find_by_phone(&query.phone).await?;
    Ok(Json(account))
}

/// Balance and history of any account.
#[utoipa::path(
    get,
    path = "/v1/accounts/{account_id}/history",
    tag = "Accounts",
    security(("bearer" = [])),
    params(
        ("account_id" = String, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account history", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Operators only"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn account_history(
    OperatorOnly(_operator): OperatorOnly,
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let account_id = AccountId::from(account_id);
    let history = state.ledger.history_for(&account_id).await?;
    Ok(Json(history.into()))
}
