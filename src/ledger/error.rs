// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger, account and catalog errors.

use axum::http::StatusCode;

use crate::auth::Role;
use crate::models::AccountId;
use crate::storage::StorageError;

/// Every failure a point operation can report.
///
/// All variants are recoverable. A failed operation leaves balances and
/// history exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account {account_id} has role {actual}, expected {expected}")]
    WrongRole {
        account_id: AccountId,
        expected: Role,
        actual: Role,
    },

    #[error("Unknown material category: {0}")]
    InvalidMaterial(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("Offer {offer_id} not found for partner {partner_id}")]
    OfferNotFound { partner_id: String, offer_id: String },

    #[error("Partner not found: {0}")]
    PartnerNotFound(String),

    #[error("Insufficient points: {available} available, {required} required")]
    InsufficientPoints { available: u64, required: u64 },

    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid offer: {0}")]
    InvalidOffer(String),

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::AccountNotFound(_) => "account_not_found",
            LedgerError::WrongRole { .. } => "wrong_role",
            LedgerError::InvalidMaterial(_) => "invalid_material",
            LedgerError::InvalidWeight(_) => "invalid_weight",
            LedgerError::OfferNotFound { .. } => "offer_not_found",
            LedgerError::PartnerNotFound(_) => "partner_not_found",
            LedgerError::InsufficientPoints { .. } => "insufficient_points",
            LedgerError::DuplicatePhone(_) => "duplicate_phone",
            LedgerError::InvalidPhone(_) => "invalid_phone",
            LedgerError::InvalidOffer(_) => "invalid_offer",
            LedgerError::InvalidRegistration(_) => "invalid_registration",
            LedgerError::Unavailable(_) => "unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::AccountNotFound(_)
            | LedgerError::OfferNotFound { .. }
            | LedgerError::PartnerNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::WrongRole { .. } => StatusCode::FORBIDDEN,
            LedgerError::InvalidMaterial(_)
            | LedgerError::InvalidWeight(_)
            | LedgerError::InvalidPhone(_)
            | LedgerError::InvalidOffer(_)
            | LedgerError::InvalidRegistration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::InsufficientPoints { .. } | LedgerError::DuplicatePhone(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Structured details a client needs beyond the message.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            LedgerError::InsufficientPoints {
                available,
                required,
            } => Some(serde_json::json!({
                "available": available,
                "required": required,
                "shortfall": required - available,
            })),
            _ => None,
        }
    }
}

impl From<StorageError> for LedgerError {
    fn from(e: StorageError) -> Self {
        LedgerError::Unavailable(e.to_string())
    }
}
