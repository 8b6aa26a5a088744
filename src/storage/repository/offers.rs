// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Offer catalog repository.
//!
//! The catalog is small, so the whole offer list is one document at
//! `catalog/offers.json`.

use super::super::{JsonStorage, StorageResult};
use crate::models::Offer;

/// Repository for the persisted offer list.
pub struct OfferRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> OfferRepository<'a> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    /// Load the offer list, or `None` when nothing was ever saved.
    pub fn load(&self) -> StorageResult<Option<Vec<Offer>>> {
        let path = self.storage.paths().offers();
        if !self.storage.exists(&path) {
            return Ok(None);
        }
        self.storage.read_json(path).map(Some)
    }

    /// Replace the persisted offer list.
    pub fn save(&self, offers: &[Offer]) -> StorageResult<()> {
        self.storage.write_json(self.storage.paths().offers(), &offers)
    }
}
