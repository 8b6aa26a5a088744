// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Partner and offer catalog.
//!
//! One structure answers both "who is partner 3" and "what does partner 3
//! offer": every offer carries its partner id and partner names are resolved
//! from the same catalog.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::ledger::LedgerError;
use crate::models::{Offer, Partner};
use crate::storage::{JsonStorage, OfferRepository};

const DEFAULT_PARTNERS: [(&str, &str); 4] = [
    ("1", "O Boticário"),
    ("2", "iFood"),
    ("3", "Assaí"),
    ("4", "Claro"),
];

/// (id, partner, title, description, cost)
const DEFAULT_OFFERS: [(&str, &str, &str, &str, u64); 8] = [
    ("1", "1", "20% de desconto em qualquer produto", "Válido para compras acima de R$100", 500),
    ("2", "1", "Kit amostras de perfumaria", "Retirada em lojas participantes", 250),
    ("3", "2", "Cupom de R$15", "Válido para compras acima de R$30", 300),
    ("4", "2", "Entrega grátis", "Válido para um pedido", 150),
    ("5", "3", "10% de desconto em frutas e verduras", "Válido uma vez por semana", 400),
    ("6", "3", "Cupom de R$20", "Válido para compras acima de R$150", 600),
    ("7", "4", "1GB de internet móvel", "Válido por 30 dias", 350),
    ("8", "4", "R$10 de recarga", "Para planos pré-pagos", 450),
];

/// Fields a sponsor operator supplies to add or change an offer.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OfferDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Points required to redeem. Must not be negative.
    pub point_cost: i64,
}

impl OfferDraft {
    fn validate(&self) -> Result<u64, LedgerError> {
        if self.title.trim().is_empty() {
            return Err(LedgerError::InvalidOffer("title must not be empty".to_string()));
        }
        u64::try_from(self.point_cost).map_err(|_| {
            LedgerError::InvalidOffer(format!(
                "point cost must not be negative, got {}",
                self.point_cost
            ))
        })
    }
}

/// Read-mostly catalog of partners and their offers.
pub struct OfferCatalog {
    partners: Vec<Partner>,
    offers: RwLock<Vec<Offer>>,
    storage: Option<Arc<JsonStorage>>,
}

impl Default for OfferCatalog {
    fn default() -> Self {
        Self::new(default_partners(), default_offers())
    }
}

impl OfferCatalog {
    /// In-memory catalog.
    pub fn new(partners: Vec<Partner>, offers: Vec<Offer>) -> Self {
        Self {
            partners,
            offers: RwLock::new(offers),
            storage: None,
        }
    }

    /// Load the persisted offers, seeding the defaults on first start.
    pub fn load(storage: Arc<JsonStorage>) -> Result<Self, LedgerError> {
        let repo = OfferRepository::new(&storage);
        let offers = match repo.load()? {
            Some(offers) => offers,
            None => {
                let offers = default_offers();
                repo.save(&offers)?;
                info!(offers = offers.len(), "Seeded default offer catalog");
                offers
            }
        };

        Ok(Self {
            partners: default_partners(),
            offers: RwLock::new(offers),
            storage: Some(storage),
        })
    }

    /// All partners.
    pub fn partners(&self) -> &[Partner] {
        &self.partners
    }

    /// Look up a partner.
    pub fn partner(&self, partner_id: &str) -> Result<&Partner, LedgerError> {
        self.partners
            .iter()
            .find(|p| p.id == partner_id)
            .ok_or_else(|| LedgerError::PartnerNotFound(partner_id.to_string()))
    }

    /// A partner's offers in catalog order.
    pub async fn offers_for(&self, partner_id: &str) -> Result<Vec<Offer>, LedgerError> {
        self.partner(partner_id)?;
        Ok(self
            .offers
            .read()
            .await
            .iter()
            .filter(|offer| offer.partner_id == partner_id)
            .cloned()
            .collect())
    }

    /// Resolve one offer of one partner.
    ///
    /// An offer that exists under a different partner is reported as not found.
    pub async fn offer(&self, partner_id: &str, offer_id: &str) -> Result<Offer, LedgerError> {
        self.offers
            .read()
            .await
            .iter()
            .find(|offer| offer.id == offer_id && offer.partner_id == partner_id)
            .cloned()
            .ok_or_else(|| offer_not_found(partner_id, offer_id))
    }

    /// Add an offer to a partner's list.
    pub async fn add_offer(&self, partner_id: &str, draft: OfferDraft) -> Result<Offer, LedgerError> {
        self.partner(partner_id)?;
        let point_cost = draft.validate()?;

        let offer = Offer {
            id: uuid::Uuid::new_v4().to_string(),
            partner_id: partner_id.to_string(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            point_cost,
        };

        let mut offers = self.offers.write().await;
        offers.push(offer.clone());
        if let Err(e) = self.persist(&offers) {
            offers.pop();
            return Err(e);
        }

        info!(partner_id, offer_id = %offer.id, point_cost, "Offer added");
        Ok(offer)
    }

    /// Replace the title, description and cost of an offer.
    pub async fn update_offer(
        &self,
        partner_id: &str,
        offer_id: &str,
        draft: OfferDraft,
    ) -> Result<Offer, LedgerError> {
        let point_cost = draft.validate()?;

        let mut offers = self.offers.write().await;
        let position = offers
            .iter()
            .position(|o| o.id == offer_id && o.partner_id == partner_id)
            .ok_or_else(|| offer_not_found(partner_id, offer_id))?;

        let updated = Offer {
            id: offer_id.to_string(),
            partner_id: partner_id.to_string(),
            title: draft.title.trim().to_string(),
            description: draft.description,
            point_cost,
        };
        let previous = std::mem::replace(&mut offers[position], updated.clone());
        if let Err(e) = self.persist(&offers) {
            offers[position] = previous;
            return Err(e);
        }

        info!(partner_id, offer_id, point_cost, "Offer updated");
        Ok(updated)
    }

    /// Remove an offer. Past redemptions keep their own copy of the title.
    pub async fn remove_offer(&self, partner_id: &str, offer_id: &str) -> Result<Offer, LedgerError> {
        let mut offers = self.offers.write().await;
        let position = offers
            .iter()
            .position(|o| o.id == offer_id && o.partner_id == partner_id)
            .ok_or_else(|| offer_not_found(partner_id, offer_id))?;

        let removed = offers.remove(position);
        if let Err(e) = self.persist(&offers) {
            offers.insert(position, removed);
            return Err(e);
        }

        info!(partner_id, offer_id, "Offer removed");
        Ok(removed)
    }

    fn persist(&self, offers: &[Offer]) -> Result<(), LedgerError> {
        if let Some(storage) = &self.storage {
            OfferRepository::new(storage).save(offers).map_err(|e| {
                warn!(error = %e, "Failed to persist offer catalog");
                LedgerError::from(e)
            })?;
        }
        Ok(())
    }
}

fn offer_not_found(partner_id: &str, offer_id: &str) -> LedgerError {
    LedgerError::OfferNotFound {
        partner_id: partner_id.to_string(),
        offer_id: offer_id.to_string(),
    }
}

fn default_partners() -> Vec<Partner> {
    DEFAULT_PARTNERS
        .iter()
        .map(|(id, name)| Partner {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

fn default_offers() -> Vec<Offer> {
    DEFAULT_OFFERS
        .iter()
        .map(|(id, partner_id, title, description, cost)| Offer {
            id: id.to_string(),
            partner_id: partner_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            point_cost: *cost,
        })
        .collect()
}
