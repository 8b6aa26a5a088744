// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Models
//!
//! Records shared by the account store, the ledger and the API. All types
//! derive `Serialize`, `Deserialize`, and `ToSchema` so they can be persisted
//! as JSON documents and documented in the OpenAPI schema.
//!
//! ## Model Categories
//!
//! - **Accounts**: identity, role and point balance
//! - **Ledger events**: append-only recycling credits and redemptions
//! - **Reference data**: material rates, partners, offers, eco points

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Identifier Types
// =============================================================================

/// Unique account identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        AccountId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        AccountId(value)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        AccountId(value.to_string())
    }
}

/// Phone number reduced to its digits.
///
/// Phone numbers are the natural key for accounts, so every lookup and
/// insert goes through [`PhoneNumber::normalize`]. `"(81) 99999-9999"` and
/// `"81999999999"` are the same number.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum digits: two-digit area code plus an eight-digit landline.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum digits: two-digit area code plus a nine-digit mobile number.
    pub const MAX_DIGITS: usize = 11;

    /// Strip every non-digit character.
    pub fn normalize(raw: &str) -> Self {
        PhoneNumber(raw.chars().filter(char::is_ascii_digit).collect())
    }

    /// Whether the number has a plausible length for registration.
    pub fn is_valid(&self) -> bool {
        (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&self.0.len())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// Postal address captured at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// Landmark to help locate the address.
    #[serde(default)]
    pub reference: String,
}

/// A program participant or operator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Normalized phone number (unique).
    pub phone: PhoneNumber,
    /// What the account may do.
    pub role: Role,
    /// Current point balance. Only the ledger changes this.
    pub point_balance: u64,
    /// Eco point id for drop-off operators, partner id for sponsor operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    /// Address given at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

/// Data supplied to register a new end-user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationInfo {
    /// Display name.
    pub name: String,
    /// Phone number in any formatting.
    pub phone: String,
    /// Password handed to the active credential strategy.
    pub password: String,
    /// Optional postal address.
    #[serde(default)]
    pub address: Option<Address>,
}

// =============================================================================
// Ledger Event Models
// =============================================================================

/// Points credited for material dropped off at an eco point.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecycleEvent {
    pub id: String,
    /// Owning account.
    pub account_id: AccountId,
    /// Material category key (e.g. `plastic`).
    pub material_category: String,
    /// Weight delivered, in kilograms.
    pub weight_kg: f64,
    /// Points credited for this delivery.
    pub points_awarded: u64,
    pub timestamp: DateTime<Utc>,
    /// Eco point where the material was received.
    pub origin_eco_point_id: String,
}

/// Points spent on a partner offer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RedemptionEvent {
    pub id: String,
    /// Owning account.
    pub account_id: AccountId,
    pub partner_id: String,
    pub offer_id: String,
    /// Offer title at redemption time; the offer itself may change later.
    pub offer_title: String,
    /// Points debited.
    pub points_spent: u64,
    pub timestamp: DateTime<Utc>,
    /// Ledger-wide redemption counter. Orders events that share a timestamp.
    #[serde(default)]
    pub sequence: u64,
}

/// Anything with a position on the ledger timeline.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for RecycleEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for RedemptionEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// =============================================================================
// Reference Data Models
// =============================================================================

/// Points awarded per kilogram of a material category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MaterialRate {
    pub category_id: String,
    pub display_name: String,
    pub points_per_kg: f64,
}

/// A merchant offering point-redeemable rewards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Partner {
    pub id: String,
    pub name: String,
}

/// A redeemable reward owned by a partner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Offer {
    pub id: String,
    /// Owning partner.
    pub partner_id: String,
    pub title: String,
    pub description: String,
    /// Points required to redeem.
    pub point_cost: u64,
}

/// A physical drop-off point.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EcoPoint {
    pub id: String,
    pub name: String,
    pub address: String,
    pub opening_hours: String,
    /// Material categories accepted at this point.
    pub materials: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization_strips_formatting() {
        let formatted = PhoneNumber::normalize("(81) 99999-9999");
        let plain = PhoneNumber::normalize("81999999999");
        assert_eq!(formatted, plain);
        assert_eq!(formatted.as_str(), "81999999999");
        assert_eq!(PhoneNumber::normalize("+55 81 3333.4444").as_str(), "558133334444");
    }

    #[test]
    fn phone_validity_bounds() {
        assert!(PhoneNumber::normalize("81 3333-4444").is_valid());
        assert!(PhoneNumber::normalize("(81) 99999-9999").is_valid());
        assert!(!PhoneNumber::normalize("999-9999").is_valid());
        assert!(!PhoneNumber::normalize("+55 81 99999-9999").is_valid());
        assert!(!PhoneNumber::normalize("").is_valid());
    }

    #[test]
    fn account_id_from_and_display() {
        let from_str: AccountId = "abc".into();
        assert_eq!(from_str.as_str(), "abc");
        assert_eq!(from_str.to_string(), "abc");

        let generated = AccountId::generate();
        assert_ne!(generated, AccountId::generate());
    }

    #[test]
    fn account_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountId::from("acct-1")).unwrap();
        assert_eq!(json, r#""acct-1""#);
    }
}
