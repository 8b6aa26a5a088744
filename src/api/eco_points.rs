// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drop-off points and their recycling statistics.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::DropOffOperatorOnly,
    error::ApiError,
    ledger::EcoPointStats,
    models::EcoPoint,
    state::AppState,
};

/// Query parameters for eco point statistics.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Only count deliveries at or after this RFC 3339 instant
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

/// All drop-off points.
#[utoipa::path(
    get,
    path = "/v1/eco-points",
    tag = "Eco Points",
    responses(
        (status = 200, description = "Eco point directory", body = Vec<EcoPoint>)
    )
)]
pub async fn list_eco_points(State(state): State<AppState>) -> Json<Vec<EcoPoint>> {
    Json(state.eco_points.all().to_vec())
}

/// Recycling received at one eco point.
///
/// Operators only see the point they are affiliated with.
#[utoipa::path(
    get,
    path = "/v1/eco-points/{eco_point_id}/stats",
    tag = "Eco Points",
    security(("bearer" = [])),
    params(
        ("eco_point_id" = String, Path, description = "Eco point ID"),
        StatsQuery
    ),
    responses(
        (status = 200, description = "Aggregated statistics", body = EcoPointStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Operator of another eco point"),
        (status = 404, description = "Eco point not found")
    )
)]
pub async fn eco_point_stats(
    DropOffOperatorOnly(operator): DropOffOperatorOnly,
    State(state): State<AppState>,
    Path(eco_point_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<EcoPointStats>, ApiError> {
    if state.eco_points.get(&eco_point_id).is_none() {
        return Err(ApiError::not_found(format!(
            "Eco point not found: {eco_point_id}"
        )));
    }
    if operator
        .affiliation
        .as_deref()
        .is_some_and(|affiliation| affiliation != eco_point_id)
    {
        return Err(ApiError::forbidden(
            "Operators may only view their own eco point",
        ));
    }

    let stats = state
        .ledger
        .eco_point_stats(&eco_point_id, query.since)
        .await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::state::test_support::*;

    async fn operator(state: &AppState) -> DropOffOperatorOnly {
        let token = sign_in(state, DROP_OFF_PHONE).await;
        DropOffOperatorOnly(state.sessions.verify(&token).await.unwrap())
    }

    #[tokio::test]
    async fn lists_directory() {
        let (state, _temp) = test_state().await;
        let Json(points) = list_eco_points(State(state)).await;
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].id, "1");
    }

    #[tokio::test]
    async fn stats_for_own_point() {
        let (state, _temp) = test_state().await;

        let Json(stats) = eco_point_stats(
            operator(&state).await,
            State(state),
            Path("1".to_string()),
            Query(StatsQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(stats.deliveries, 2);
        assert_eq!(stats.accounts_served, 2);
        assert_eq!(stats.points_distributed, 2150);
        assert_eq!(stats.top_material.as_deref(), Some("electronics"));
    }

    #[tokio::test]
    async fn since_in_the_future_counts_nothing() {
        let (state, _temp) = test_state().await;

        let Json(stats) = eco_point_stats(
            operator(&state).await,
            State(state),
            Path("1".to_string()),
            Query(StatsQuery {
                since: Some(Utc::now() + chrono::Duration::hours(1)),
            }),
        )
        .await
        .unwrap();
        assert_eq!(stats.deliveries, 0);
        assert_eq!(stats.points_distributed, 0);
        assert!(stats.top_material.is_none());
    }

    #[tokio::test]
    async fn other_point_is_forbidden_and_unknown_is_404() {
        let (state, _temp) = test_state().await;

        let err = eco_point_stats(
            operator(&state).await,
            State(state.clone()),
            Path("2".to_string()),
            Query(StatsQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = eco_point_stats(
            operator(&state).await,
            State(state),
            Path("42".to_string()),
            Query(StatsQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
