// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    catalog::OfferDraft,
    ledger::{CreditReceipt, DebitReceipt, EcoPointStats, MaterialShare},
    models::{
        Account, AccountId, Address, EcoPoint, MaterialRate, Offer, Partner, PhoneNumber,
        RecycleEvent, RedemptionEvent, RegistrationInfo,
    },
    state::AppState,
};

pub mod accounts;
pub mod catalog;
pub mod eco_points;
pub mod health;
pub mod recycling;
pub mod redemptions;
pub mod sessions;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/accounts", post(accounts::register_account))
        .route("/accounts/lookup", get(accounts::lookup_account))
        .route(
            "/accounts/{account_id}/history",
            get(accounts::account_history),
        )
        .route("/sessions", post(sessions::start_session))
        .route("/sessions/current", delete(sessions::end_session))
        .route("/users/me", get(users::get_current_user))
        .route("/users/me/history", get(users::get_my_history))
        .route("/recycling", post(recycling::record_recycling))
        .route("/redemptions", post(redemptions::redeem_offer))
        .route("/materials", get(catalog::list_materials))
        .route("/partners", get(catalog::list_partners))
        .route(
            "/partners/{partner_id}/offers",
            get(catalog::list_offers).post(catalog::add_offer),
        )
        .route(
            "/partners/{partner_id}/offers/{offer_id}",
            delete(catalog::remove_offer).put(catalog::update_offer),
        )
        .route(
            "/partners/{partner_id}/redemptions",
            get(catalog::partner_redemptions),
        )
        .route("/eco-points", get(eco_points::list_eco_points))
        .route(
            "/eco-points/{eco_point_id}/stats",
            get(eco_points::eco_point_stats),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::register_account,
        accounts::lookup_account,
        accounts::account_history,
        sessions::start_session,
        sessions::end_session,
        users::get_current_user,
        users::get_my_history,
        recycling::record_recycling,
        redemptions::redeem_offer,
        catalog::list_materials,
        catalog::list_partners,
        catalog::list_offers,
        catalog::add_offer,
        catalog::update_offer,
        catalog::remove_offer,
        catalog::partner_redemptions,
        eco_points::list_eco_points,
        eco_points::eco_point_stats,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Account,
            AccountId,
            Address,
            PhoneNumber,
            Role,
            RegistrationInfo,
            RecycleEvent,
            RedemptionEvent,
            MaterialRate,
            Partner,
            Offer,
            OfferDraft,
            EcoPoint,
            EcoPointStats,
            MaterialShare,
            CreditReceipt,
            DebitReceipt,
            accounts::RegisterResponse,
            accounts::HistoryResponse,
            sessions::SignInRequest,
            sessions::SessionResponse,
            users::UserMeResponse,
            recycling::RecycleRequest,
            redemptions::RedeemRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Accounts", description = "Registration and operator lookups"),
        (name = "Sessions", description = "Sign-in and sign-out"),
        (name = "Users", description = "The signed-in account"),
        (name = "Recycling", description = "Crediting points for delivered material"),
        (name = "Redemptions", description = "Debiting points for partner offers"),
        (name = "Catalog", description = "Materials, partners and offers"),
        (name = "Eco Points", description = "Drop-off points and their statistics"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
