// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Points Ledger
//!
//! Credits points for recycling, debits points for redemptions and keeps
//! the append-only history that explains every balance.
//!
//! ## Consistency
//!
//! - A balance change and its history entry happen under the same
//!   per-account lock and are persisted in one document write. If the write
//!   fails, the in-memory change is rolled back and `Unavailable` is
//!   returned.
//! - Operations on one account serialize; different accounts run in
//!   parallel.
//! - For every account, `point_balance == sum(points_awarded) -
//!   sum(points_spent)` and the balance never goes below zero.

pub mod error;
pub mod history;
pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::catalog::{MaterialRateTable, OfferCatalog};
use crate::models::{Account, AccountId, RecycleEvent, RedemptionEvent};
use crate::store::AccountStore;

pub use error::LedgerError;
pub use history::{AccountHistory, History};
pub use stats::{EcoPointStats, MaterialShare};

/// Outcome of a successful credit.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct CreditReceipt {
    pub balance: u64,
    pub event: RecycleEvent,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct DebitReceipt {
    pub balance: u64,
    pub event: RedemptionEvent,
}

/// The only component allowed to change point balances.
pub struct LedgerEngine {
    accounts: Arc<AccountStore>,
    rates: Arc<MaterialRateTable>,
    catalog: Arc<OfferCatalog>,
}

impl LedgerEngine {
    pub fn new(
        accounts: Arc<AccountStore>,
        rates: Arc<MaterialRateTable>,
        catalog: Arc<OfferCatalog>,
    ) -> Self {
        Self {
            accounts,
            rates,
            catalog,
        }
    }

    /// Credit an end user for material delivered at `origin_eco_point_id`.
    ///
    /// `points_awarded = round_half_up(rate(material) * weight_kg)`.
    pub async fn credit_for_recycling(
        &self,
        account_id: &AccountId,
        material_category: &str,
        weight_kg: f64,
        origin_eco_point_id: &str,
    ) -> Result<CreditReceipt, LedgerError> {
        let points = self.rates.points_for(material_category, weight_kg)?;

        let mut record = self.accounts.lock(account_id).await?;
        ensure_end_user(&record.account)?;

        let previous = record.account.point_balance;
        let balance = previous.checked_add(points).ok_or_else(|| {
            LedgerError::InvalidWeight(format!(
                "crediting {points} points would overflow the balance"
            ))
        })?;

        let event = RecycleEvent {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.clone(),
            material_category: material_category.to_string(),
            weight_kg,
            points_awarded: points,
            timestamp: Utc::now(),
            origin_eco_point_id: origin_eco_point_id.to_string(),
        };

        record.account.point_balance = balance;
        record.recycling.push(event.clone());
        if let Err(e) = self.accounts.persist(&record) {
            record.recycling.pop();
            record.account.point_balance = previous;
            return Err(e);
        }

        info!(
            account_id = %account_id,
            material = material_category,
            weight_kg,
            points,
            balance,
            eco_point = origin_eco_point_id,
            "Points credited"
        );
        Ok(CreditReceipt { balance, event })
    }

    /// Debit the cost of a partner offer from an end user.
    pub async fn debit_for_redemption(
        &self,
        account_id: &AccountId,
        partner_id: &str,
        offer_id: &str,
    ) -> Result<DebitReceipt, LedgerError> {
        let offer = self.catalog.offer(partner_id, offer_id).await?;

        let mut record = self.accounts.lock(account_id).await?;
        ensure_end_user(&record.account)?;

        let previous = record.account.point_balance;
        if previous < offer.point_cost {
            debug!(
                account_id = %account_id,
                available = previous,
                required = offer.point_cost,
                "Redemption rejected"
            );
            return Err(LedgerError::InsufficientPoints {
                available: previous,
                required: offer.point_cost,
            });
        }
        let balance = previous - offer.point_cost;

        let event = RedemptionEvent {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.clone(),
            partner_id: offer.partner_id.clone(),
            offer_id: offer.id.clone(),
            offer_title: offer.title.clone(),
            points_spent: offer.point_cost,
            timestamp: Utc::now(),
            sequence: self.accounts.next_sequence(),
        };

        record.account.point_balance = balance;
        record.redemptions.push(event.clone());
        if let Err(e) = self.accounts.persist(&record) {
            record.redemptions.pop();
            record.account.point_balance = previous;
            return Err(e);
        }

        info!(
            account_id = %account_id,
            partner_id,
            offer_id,
            points = offer.point_cost,
            balance,
            "Points redeemed"
        );
        Ok(DebitReceipt { balance, event })
    }

    /// The account and both its histories, newest first.
    pub async fn history_for(&self, account_id: &AccountId) -> Result<AccountHistory, LedgerError> {
        let record = self.accounts.lock(account_id).await?;
        Ok(AccountHistory {
            account: record.account.clone(),
            recycling: History::newest_first(&record.recycling),
            redemptions: History::newest_first(&record.redemptions),
        })
    }

    /// Every redemption of one partner's offers, newest first.
    pub async fn redemptions_for_partner(
        &self,
        partner_id: &str,
    ) -> Result<History<RedemptionEvent>, LedgerError> {
        self.catalog.partner(partner_id)?;

        let mut events = Vec::new();
        for (account_id, slot) in self.accounts.slots().await {
            let record = self.accounts.lock_slot(&account_id, slot).await?;
            events.extend(
                record
                    .redemptions
                    .iter()
                    .filter(|e| e.partner_id == partner_id)
                    .cloned(),
            );
        }
        // Accounts come back in arbitrary order. Equal timestamps fall back
        // to the order the redemptions were made.
        events.sort_by_key(|e| (e.timestamp, e.sequence));
        Ok(History::newest_first(&events))
    }

    /// Recycling statistics for one eco point.
    pub async fn eco_point_stats(
        &self,
        eco_point_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<EcoPointStats, LedgerError> {
        let mut events = Vec::new();
        for (account_id, slot) in self.accounts.slots().await {
            let record = self.accounts.lock_slot(&account_id, slot).await?;
            events.extend(
                record
                    .recycling
                    .iter()
                    .filter(|e| e.origin_eco_point_id == eco_point_id)
                    .cloned(),
            );
        }
        Ok(EcoPointStats::collect(eco_point_id, since, &events, &self.rates))
    }
}

fn ensure_end_user(account: &Account) -> Result<(), LedgerError> {
    if account.role == Role::EndUser {
        Ok(())
    } else {
        Err(LedgerError::WrongRole {
            account_id: account.id.clone(),
            expected: Role::EndUser,
            actual: account.role,
        })
    }
}
