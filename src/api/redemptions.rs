// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redeeming partner offers at the point of sale.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    audit_log,
    auth::SponsorOnly,
    error::ApiError,
    ledger::DebitReceipt,
    models::AccountId,
    state::AppState,
    storage::AuditEventType,
};

/// An end user redeeming one offer.
///
/// Identify the end user by `account_id` or by `phone`, not both.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RedeemRequest {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub partner_id: String,
    pub offer_id: String,
}

/// Debit an offer's cost from an end user.
///
/// A sponsor operator affiliated with a partner may only redeem that
/// partner's offers.
#[utoipa::path(
    post,
    path = "/v1/redemptions",
    tag = "Redemptions",
    security(("bearer" = [])),
    request_body = RedeemRequest,
    responses(
        (status = 201, description = "Offer redeemed", body = DebitReceipt),
        (status = 400, description = "Missing or ambiguous account identifier"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this partner's operator, or target is not an end user"),
        (status = 404, description = "Account, partner or offer not found"),
        (status = 409, description = "Insufficient points")
    )
)]
pub async fn redeem_offer(
    SponsorOnly(operator): SponsorOnly,
    State(state): State<AppState>,
    Json(request): Json<RedeemRequest>,
) -> Result<(StatusCode, Json<DebitReceipt>), ApiError> {
    operator.require_partner(&request.partner_id)?;

    let account_id = match (request.account_id, request.phone) {
        (Some(id), None) => AccountId::from(id),
        (None, Some(phone)) => state.accounts.find_by_phone(&phone).await?.id,
        _ => {
            return Err(ApiError::bad_request(
                "exactly one of account_id or phone is required",
            ))
        }
    };

    let receipt = state
        .ledger
        .debit_for_redemption(&account_id, &request.partner_id, &request.offer_id)
        .await?;

    audit_log!(
        state.storage(),
        AuditEventType::PointsRedeemed,
        &operator,
        "account",
        account_id.as_str(),
        serde_json::json!({
            "event_id": receipt.event.id,
            "partner_id": receipt.event.partner_id,
            "offer_id": receipt.event.offer_id,
            "points": receipt.event.points_spent,
        })
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::*;

    async fn sponsor(state: &AppState) -> SponsorOnly {
        let token = sign_in(state, SPONSOR_PHONE).await;
        SponsorOnly(state.sessions.verify(&token).await.unwrap())
    }

    fn redeem(phone: &str, partner_id: &str, offer_id: &str) -> RedeemRequest {
        RedeemRequest {
            account_id: None,
            phone: Some(phone.to_string()),
            partner_id: partner_id.to_string(),
            offer_id: offer_id.to_string(),
        }
    }

    #[tokio::test]
    async fn redeems_own_partner_offer() {
        let (state, _temp) = test_state().await;

        let (status, Json(receipt)) = redeem_offer(
            sponsor(&state).await,
            State(state.clone()),
            Json(redeem(RICH_USER_PHONE, "3", "5")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt.balance, 1600);
        assert_eq!(receipt.event.points_spent, 400);
        assert_eq!(receipt.event.partner_id, "3");
    }

    #[tokio::test]
    async fn other_partner_is_forbidden() {
        let (state, _temp) = test_state().await;

        let err = redeem_offer(
            sponsor(&state).await,
            State(state.clone()),
            Json(redeem(RICH_USER_PHONE, "1", "1")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let rich = state.accounts.find_by_phone(RICH_USER_PHONE).await.unwrap();
        assert_eq!(rich.point_balance, 2000);
    }

    #[tokio::test]
    async fn insufficient_points_leaves_balance() {
        let (state, _temp) = test_state().await;

        let err = redeem_offer(
            sponsor(&state).await,
            State(state.clone()),
            Json(redeem(END_USER_PHONE, "3", "6")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "insufficient_points");
        let details = err.details.unwrap();
        assert_eq!(details["available"], 150);
        assert_eq!(details["required"], 600);

        let maria = state.accounts.find_by_phone(END_USER_PHONE).await.unwrap();
        assert_eq!(maria.point_balance, 150);
    }

    #[tokio::test]
    async fn offer_of_another_partner_is_not_found() {
        let (state, _temp) = test_state().await;

        let err = redeem_offer(
            sponsor(&state).await,
            State(state),
            Json(redeem(RICH_USER_PHONE, "3", "1")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, "offer_not_found");
    }

    #[tokio::test]
    async fn missing_identifier_is_bad_request() {
        let (state, _temp) = test_state().await;

        let mut request = redeem(RICH_USER_PHONE, "3", "5");
        request.phone = None;
        let err = redeem_offer(sponsor(&state).await, State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
