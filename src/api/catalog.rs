// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Materials, partners and their offers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    audit_log,
    auth::SponsorOnly,
    catalog::OfferDraft,
    error::ApiError,
    models::{MaterialRate, Offer, Partner, RedemptionEvent},
    state::AppState,
    storage::AuditEventType,
};

/// Material categories and their points per kilogram.
#[utoipa::path(
    get,
    path = "/v1/materials",
    tag = "Catalog",
    responses(
        (status = 200, description = "Rate table", body = Vec<MaterialRate>)
    )
)]
pub async fn list_materials(State(state): State<AppState>) -> Json<Vec<MaterialRate>> {
    Json(state.rates.all().to_vec())
}

/// All partners.
#[utoipa::path(
    get,
    path = "/v1/partners",
    tag = "Catalog",
    responses(
        (status = 200, description = "Partner list", body = Vec<Partner>)
    )
)]
pub async fn list_partners(State(state): State<AppState>) -> Json<Vec<Partner>> {
    Json(state.catalog.partners().to_vec())
}

/// A partner's offers.
#[utoipa::path(
    get,
    path = "/v1/partners/{partner_id}/offers",
    tag = "Catalog",
    params(
        ("partner_id" = String, Path, description = "Partner ID")
    ),
    responses(
        (status = 200, description = "Offers in catalog order", body = Vec<Offer>),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn list_offers(
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
) -> Result<Json<Vec<Offer>>, ApiError> {
    Ok(Json(state.catalog.offers_for(&partner_id).await?))
}

/// Add an offer to the caller's partner.
#[utoipa::path(
    post,
    path = "/v1/partners/{partner_id}/offers",
    tag = "Catalog",
    security(("bearer" = [])),
    params(
        ("partner_id" = String, Path, description = "Partner ID")
    ),
    request_body = OfferDraft,
    responses(
        (status = 201, description = "Offer added", body = Offer),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this partner's operator"),
        (status = 404, description = "Partner not found"),
        (status = 422, description = "Empty title or negative cost")
    )
)]
pub async fn add_offer(
    SponsorOnly(operator): SponsorOnly,
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
    Json(draft): Json<OfferDraft>,
) -> Result<(StatusCode, Json<Offer>), ApiError> {
    operator.require_partner(&partner_id)?;
    let offer = state.catalog.add_offer(&partner_id, draft).await?;

    audit_log!(
        state.storage(),
        AuditEventType::OfferAdded,
        &operator,
        "offer",
        offer.id.as_str(),
        serde_json::json!({ "partner_id": partner_id, "point_cost": offer.point_cost })
    );

    Ok((StatusCode::CREATED, Json(offer)))
}

/// Change an offer's title, description and cost.
///
/// Past redemptions keep the cost and title they were made at.
#[utoipa::path(
    put,
    path = "/v1/partners/{partner_id}/offers/{offer_id}",
    tag = "Catalog",
    security(("bearer" = [])),
    params(
        ("partner_id" = String, Path, description = "Partner ID"),
        ("offer_id" = String, Path, description = "Offer ID")
    ),
    request_body = OfferDraft,
    responses(
        (status = 200, description = "Offer updated", body = Offer),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this partner's operator"),
        (status = 404, description = "Offer not found"),
        (status = 422, description = "Empty title or negative cost")
    )
)]
pub async fn update_offer(
    SponsorOnly(operator): SponsorOnly,
    State(state): State<AppState>,
    Path((partner_id, offer_id)): Path<(String, String)>,
    Json(draft): Json<OfferDraft>,
) -> Result<Json<Offer>, ApiError> {
    operator.require_partner(&partner_id)?;
    let offer = state
        .catalog
        .update_offer(&partner_id, &offer_id, draft)
        .await?;

    audit_log!(
        state.storage(),
        AuditEventType::OfferUpdated,
        &operator,
        "offer",
        offer_id.as_str(),
        serde_json::json!({ "partner_id": partner_id, "point_cost": offer.point_cost })
    );

    Ok(Json(offer))
}

/// Withdraw an offer.
#[utoipa::path(
    delete,
    path = "/v1/partners/{partner_id}/offers/{offer_id}",
    tag = "Catalog",
    security(("bearer" = [])),
    params(
        ("partner_id" = String, Path, description = "Partner ID"),
        ("offer_id" = String, Path, description = "Offer ID")
    ),
    responses(
        (status = 204, description = "Offer removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this partner's operator"),
        (status = 404, description = "Offer not found")
    )
)]
pub async fn remove_offer(
    SponsorOnly(operator): SponsorOnly,
    State(state): State<AppState>,
    Path((partner_id, offer_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    operator.require_partner(&partner_id)?;
    state.catalog.remove_offer(&partner_id, &offer_id).await?;

    audit_log!(
        state.storage(),
        AuditEventType::OfferRemoved,
        &operator,
        "offer",
        offer_id.as_str(),
        serde_json::json!({ "partner_id": partner_id })
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Every redemption of the partner's offers, newest first.
#[utoipa::path(
    get,
    path = "/v1/partners/{partner_id}/redemptions",
    tag = "Catalog",
    security(("bearer" = [])),
    params(
        ("partner_id" = String, Path, description = "Partner ID")
    ),
    responses(
        (status = 200, description = "Redemptions, newest first", body = Vec<RedemptionEvent>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not this partner's operator"),
        (status = 404, description = "Partner not found")
    )
)]
pub async fn partner_redemptions(
    SponsorOnly(operator): SponsorOnly,
    State(state): State<AppState>,
    Path(partner_id): Path<String>,
) -> Result<Json<Vec<RedemptionEvent>>, ApiError> {
    operator.require_partner(&partner_id)?;
    let history = state.ledger.redemptions_for_partner(&partner_id).await?;
    Ok(Json(history.to_vec()))
}
