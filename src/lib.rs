// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EcoGanha - Recycling Rewards Points Ledger
//!
//! End users earn points for recyclable material delivered at drop-off
//! points (eco points) and spend them on partner offers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Sessions, roles and credential checking
//! - `catalog` - Material rates, partner offers and the eco point directory
//! - `ledger` - The only component that changes point balances
//! - `store` - Account store with per-account locking
//! - `storage` - JSON file persistence and the audit log

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod seed;
pub mod session_sweeper;
pub mod state;
pub mod storage;
pub mod store;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches to
/// one JSON object per line.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(config::LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_current_span(false).with_target(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
