// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Demo data.
//!
//! Two end users with some recycling history, one drop-off operator for eco
//! point 1 and one sponsor operator for partner 3 (Assaí). Every demo account
//! signs in with [`DEMO_PASSWORD`].

use tracing::info;

use crate::auth::Role;
use crate::catalog::DEFAULT_ECO_POINT_ID;
use crate::models::{Address, RegistrationInfo};
use crate::state::{AppState, StateError};

pub const DEMO_PASSWORD: &str = "ecoganha123";

pub const END_USER_PHONE: &str = "81999999999";
pub const RICH_USER_PHONE: &str = "81666666666";
pub const DROP_OFF_PHONE: &str = "81988888888";
pub const SPONSOR_PHONE: &str = "81977777777";

fn registration(name: &str, phone: &str, address: Option<Address>) -> RegistrationInfo {
    RegistrationInfo {
        name: name.to_string(),
        phone: phone.to_string(),
        password: DEMO_PASSWORD.to_string(),
        address,
    }
}

/// Create the demo accounts and their opening balances.
pub async fn seed_demo_data(state: &AppState) -> Result<(), StateError> {
    let maria = state
        .accounts
        .create(registration(
            "Maria da Silva",
            END_USER_PHONE,
            Some(Address {
                street: "Rua do Sol".to_string(),
                number: "123".to_string(),
                complement: "Apto 201".to_string(),
                district: "Boa Viagem".to_string(),
                city: "Recife".to_string(),
                state: "PE".to_string(),
                postal_code: "51020-000".to_string(),
                reference: "Próximo à padaria".to_string(),
            }),
        ))
        .await?;
    let vandilma = state
        .accounts
        .create(registration("Vandilma Candido", RICH_USER_PHONE, None))
        .await?;
    let drop_off = state
        .accounts
        .create_with_role(
            registration("Operador Eco Ponto Boa Viagem", DROP_OFF_PHONE, None),
            Role::DropOffOperator,
            Some(DEFAULT_ECO_POINT_ID.to_string()),
        )
        .await?;
    let sponsor = state
        .accounts
        .create_with_role(
            registration("Operador Assaí", SPONSOR_PHONE, None),
            Role::SponsorOperator,
            Some("3".to_string()),
        )
        .await?;

    for account in [&maria, &vandilma, &drop_off, &sponsor] {
        state.sessions.enroll(&account.id, DEMO_PASSWORD)?;
    }

    state
        .ledger
        .credit_for_recycling(&maria.id, "plastic", 3.0, DEFAULT_ECO_POINT_ID)
        .await?;
    state
        .ledger
        .credit_for_recycling(&vandilma.id, "electronics", 20.0, DEFAULT_ECO_POINT_ID)
        .await?;

    info!(accounts = 4, "Seeded demo data");
    Ok(())
}
