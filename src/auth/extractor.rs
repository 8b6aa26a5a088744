// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The role-specific extractors additionally reject callers of any other role.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Extractor for authenticated callers.
///
/// Reads `Authorization: Bearer <session token>` and checks it against the
/// session provider.
///
/// # Example
///
/// ```rust,ignore
/// async fn current_account(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Account>, ApiError> {
///     // user.account_id identifies the caller
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = state.sessions.verify(token).await?;
        Ok(Auth(user))
    }
}

async fn require(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
) -> Result<AuthenticatedUser, AuthError> {
    let Auth(user) = Auth::from_request_parts(parts, state).await?;
    user.require_role(role)?;
    Ok(user)
}

/// Extractor that requires an end-user session.
pub struct EndUserOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for EndUserOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Role::EndUser).await.map(EndUserOnly)
    }
}

/// Extractor that requires a drop-off operator session.
pub struct DropOffOperatorOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for DropOffOperatorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Role::DropOffOperator)
            .await
            .map(DropOffOperatorOnly)
    }
}

/// Extractor that requires a sponsor operator session.
pub struct SponsorOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for SponsorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Role::SponsorOperator)
            .await
            .map(SponsorOnly)
    }
}

/// Extractor that accepts either operator role.
pub struct OperatorOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for OperatorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        if !user.role.is_operator() {
            return Err(AuthError::InsufficientPermissions);
        }
        Ok(OperatorOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{sign_in, test_state, DROP_OFF_PHONE, END_USER_PHONE};
    use axum::http::Request;

    fn parts_with(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state().await;
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _temp_dir) = test_state().await;
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic abc")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_session_token() {
        let (state, _temp_dir) = test_state().await;
        let token = sign_in(&state, END_USER_PHONE).await;
        let mut parts = parts_with(Some(&token));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.role, Role::EndUser);
    }

    #[tokio::test]
    async fn role_extractors_reject_other_roles() {
        let (state, _temp_dir) = test_state().await;
        let end_user = sign_in(&state, END_USER_PHONE).await;
        let operator = sign_in(&state, DROP_OFF_PHONE).await;

        let mut parts = parts_with(Some(&end_user));
        assert!(matches!(
            DropOffOperatorOnly::from_request_parts(&mut parts, &state).await,
            Err(AuthError::InsufficientPermissions)
        ));
        let mut parts = parts_with(Some(&end_user));
        assert!(matches!(
            OperatorOnly::from_request_parts(&mut parts, &state).await,
            Err(AuthError::InsufficientPermissions)
        ));

        let mut parts = parts_with(Some(&operator));
        assert!(DropOffOperatorOnly::from_request_parts(&mut parts, &state).await.is_ok());
        let mut parts = parts_with(Some(&operator));
        assert!(OperatorOnly::from_request_parts(&mut parts, &state).await.is_ok());
        let mut parts = parts_with(Some(&operator));
        assert!(matches!(
            SponsorOnly::from_request_parts(&mut parts, &state).await,
            Err(AuthError::InsufficientPermissions)
        ));
        let mut parts = parts_with(Some(&operator));
        assert!(matches!(
            EndUserOnly::from_request_parts(&mut parts, &state).await,
            Err(AuthError::InsufficientPermissions)
        ));
    }
}
