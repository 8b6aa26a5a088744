// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recording material delivered at a drop-off point.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    audit_log,
    auth::DropOffOperatorOnly,
    catalog::DEFAULT_ECO_POINT_ID,
    error::ApiError,
    ledger::CreditReceipt,
    models::AccountId,
    state::AppState,
    storage::AuditEventType,
};

/// A delivery of recyclable material.
///
/// Identify the end user by `account_id` or by `phone`, not both.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecycleRequest {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Material category key, e.g. `plastic`
    pub material_category: String,
    /// Weight in kilograms, must be positive
    pub weight_kg: f64,
}

/// Credit an end user for delivered material.
///
/// The delivery is attributed to the operator's own eco point.
#[utoipa::path(
    post,
    path = "/v1/recycling",
    tag = "Recycling",
    security(("bearer" = [])),
    request_body = RecycleRequest,
    responses(
        (status = 201, description = "Points credited", body = CreditReceipt),
        (status = 400, description = "Missing or ambiguous account identifier"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Drop-off operators only, or target is not an end user"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Unknown material or invalid weight")
    )
)]
pub async fn record_recycling(
    DropOffOperatorOnly(operator): DropOffOperatorOnly,
    State(state): State<AppState>,
    Json(request): Json<RecycleRequest>,
) -> Result<(StatusCode, Json<CreditReceipt>), ApiError> {
    let account_id = match (request.account_id, request.phone) {
        (Some(id), None) => AccountId::from(id),
        (None, Some(phone)) => state.accounts.find_by_phone(&phone).await?.id,
        _ => {
            return Err(ApiError::bad_request(
                "exactly one of account_id or phone is required",
            ))
        }
    };
    let origin = operator
        .affiliation
        .as_deref()
        .unwrap_or(DEFAULT_ECO_POINT_ID);

    let receipt = state
        .ledger
        .credit_for_recycling(&account_id, &request.material_category, request.weight_kg, origin)
        .await?;

    audit_log!(
        state.storage(),
        AuditEventType::PointsCredited,
        &operator,
        "account",
        account_id.as_str(),
        serde_json::json!({
            "event_id": receipt.event.id,
            "material": receipt.event.material_category,
            "weight_kg": receipt.event.weight_kg,
            "points": receipt.event.points_awarded,
            "eco_point_id": origin,
        })
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::*;

    async fn operator(state: &AppState) -> DropOffOperatorOnly {
        let token = sign_in(state, DROP_OFF_PHONE).await;
        DropOffOperatorOnly(state.sessions.verify(&token).await.unwrap())
    }

    fn by_phone(phone: &str, material: &str, weight_kg: f64) -> RecycleRequest {
        RecycleRequest {
            account_id: None,
            phone: Some(phone.to_string()),
            material_category: material.to_string(),
            weight_kg,
        }
    }

    #[tokio::test]
    async fn credits_by_phone_at_operator_eco_point() {
        let (state, _temp) = test_state().await;
        let op = operator(&state).await;

        let (status, Json(receipt)) = record_recycling(
            op,
            State(state.clone()),
            Json(by_phone("(81) 99999-9999", "paper", 2.5)),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt.event.points_awarded, 75);
        assert_eq!(receipt.balance, 225);
        assert_eq!(receipt.event.origin_eco_point_id, "1");

        let maria = state.accounts.find_by_phone(END_USER_PHONE).await.unwrap();
        assert_eq!(maria.point_balance, 225);
    }

    #[tokio::test]
    async fn credits_by_account_id() {
        let (state, _temp) = test_state().await;
        let op = operator(&state).await;
        let maria = state.accounts.find_by_phone(END_USER_PHONE).await.unwrap();

        let request = RecycleRequest {
            account_id: Some(maria.id.to_string()),
            phone: None,
            material_category: "metal".to_string(),
            weight_kg: 1.0,
        };
        let (_, Json(receipt)) = record_recycling(op, State(state), Json(request))
            .await
            .unwrap();
        assert_eq!(receipt.balance, 220);
    }

    #[tokio::test]
    async fn rejects_ambiguous_identifier() {
        let (state, _temp) = test_state().await;
        let op = operator(&state).await;
        let maria = state.accounts.find_by_phone(END_USER_PHONE).await.unwrap();

        let mut request = by_phone(END_USER_PHONE, "plastic", 1.0);
        request.account_id = Some(maria.id.to_string());
        let err = record_recycling(op, State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_bad_material_and_weight_without_crediting() {
        let (state, _temp) = test_state().await;

        let err = record_recycling(
            operator(&state).await,
            State(state.clone()),
            Json(by_phone(END_USER_PHONE, "wood", 1.0)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "invalid_material");

        let err = record_recycling(
            operator(&state).await,
            State(state.clone()),
            Json(by_phone(END_USER_PHONE, "plastic", 0.0)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "invalid_weight");

        let maria = state.accounts.find_by_phone(END_USER_PHONE).await.unwrap();
        assert_eq!(maria.point_balance, 150);
    }

    #[tokio::test]
    async fn cannot_credit_an_operator() {
        let (state, _temp) = test_state().await;
        let op = operator(&state).await;

        let err = record_recycling(
            op,
            State(state),
            Json(by_phone(SPONSOR_PHONE, "plastic", 1.0)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, "wrong_role");
    }
}
