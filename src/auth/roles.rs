// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account roles.
///
/// ## Capabilities
///
/// - `EndUser` - earns points by recycling, spends them on offers
/// - `DropOffOperator` - staff at an eco point, registers deliveries
/// - `SponsorOperator` - staff at a partner, manages that partner's offers
///
/// Only end users hold a point balance that can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Citizen who recycles
    EndUser,
    /// Eco point staff
    DropOffOperator,
    /// Partner staff
    SponsorOperator,
}

impl Role {
    /// Operators act on behalf of an eco point or partner.
    pub fn is_operator(&self) -> bool {
        !matches!(self, Role::EndUser)
    }

    /// Parse role from string (case-insensitive).
    /// Accepts the Portuguese labels used by the mobile app.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "end_user" | "comum" => Some(Role::EndUser),
            "drop_off_operator" | "ecoponto" => Some(Role::DropOffOperator),
            "sponsor_operator" | "patrocinador" => Some(Role::SponsorOperator),
            _ => None,
        }
    }
}

impl Default for Role {
    /// New registrations are end users.
    fn default() -> Self {
        Role::EndUser
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::EndUser => write!(f, "end_user"),
            Role::DropOffOperator => write!(f, "drop_off_operator"),
            Role::SponsorOperator => write!(f, "sponsor_operator"),
        }
    }
}
