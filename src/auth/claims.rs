// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;
use super::roles::Role;
use crate::models::AccountId;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account id)
    pub sub: String,

    /// Session id, the key of the persisted session record
    pub sid: String,

    /// Account role at sign-in
    pub role: Role,

    /// Eco point or partner id for operators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aff: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller, extracted from a verified session token.
///
/// This is the primary type used throughout the application to represent
/// who is making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account the session belongs to
    pub account_id: AccountId,

    /// Account role
    pub role: Role,

    /// Session id
    pub session_id: String,

    /// Eco point or partner the operator acts for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            account_id: AccountId(claims.sub),
            role: claims.role,
            session_id: claims.sid,
            affiliation: claims.aff,
            expires_at: claims.exp,
        }
    }

    /// Reject callers whose role is not `required`.
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }

    /// Sponsor operators with an affiliation may only act for that partner.
    pub fn require_partner(&self, partner_id: &str) -> Result<(), AuthError> {
        self.require_role(Role::SponsorOperator)?;
        match &self.affiliation {
            Some(affiliation) if affiliation != partner_id => {
                Err(AuthError::InsufficientPermissions)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> SessionClaims {
        SessionClaims {
            sub: "acct_123".to_string(),
            sid: "sess_abc".to_string(),
            role: Role::SponsorOperator,
            aff: Some("3".to_string()),
            iat: 1700000000,
            exp: 1700003600,
        }
    }

    #[test]
    fn from_claims_copies_identity() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.account_id.as_str(), "acct_123");
        assert_eq!(user.session_id, "sess_abc");
        assert_eq!(user.role, Role::SponsorOperator);
        assert_eq!(user.affiliation.as_deref(), Some("3"));
        assert_eq!(user.expires_at, 1700003600);
    }

    #[test]
    fn require_role_is_exact() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert!(user.require_role(Role::SponsorOperator).is_ok());
        assert!(matches!(
            user.require_role(Role::DropOffOperator),
            Err(AuthError::InsufficientPermissions)
        ));
    }

    #[test]
    fn require_partner_honors_affiliation() {
        let mut user = AuthenticatedUser::from_claims(sample_claims());
        assert!(user.require_partner("3").is_ok());
        assert!(user.require_partner("1").is_err());

        user.affiliation = None;
        assert!(user.require_partner("1").is_ok());

        user.role = Role::EndUser;
        assert!(user.require_partner("1").is_err());
    }

    #[test]
    fn claims_omit_missing_affiliation() {
        let mut claims = sample_claims();
        claims.aff = None;
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("aff").is_none());
        assert_eq!(json["role"], "sponsor_operator");
    }
}
