// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository.
//!
//! Each account is stored together with its full point history as a single
//! JSON document under `accounts/{account_id}.json`, so a balance and the
//! events that explain it are always written in one atomic rename.

use serde::{Deserialize, Serialize};

use super::super::{JsonStorage, StorageError, StorageResult};
use crate::models::{Account, RecycleEvent, RedemptionEvent};

/// Account plus its append-only ledger history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub account: Account,
    /// Recycling credits in insertion order.
    #[serde(default)]
    pub recycling: Vec<RecycleEvent>,
    /// Redemptions in insertion order.
    #[serde(default)]
    pub redemptions: Vec<RedemptionEvent>,
}

impl AccountRecord {
    /// A fresh record with no history.
    pub fn new(account: Account) -> Self {
        Self {
            account,
            recycling: Vec::new(),
            redemptions: Vec::new(),
        }
    }

    /// Balance implied by the history alone.
    pub fn replayed_balance(&self) -> i128 {
        let credited: i128 = self
            .recycling
            .iter()
            .map(|e| i128::from(e.points_awarded))
            .sum();
        let spent: i128 = self
            .redemptions
            .iter()
            .map(|e| i128::from(e.points_spent))
            .sum();
        credited - spent
    }
}

/// Repository for account documents.
pub struct AccountRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository.
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    /// Get an account document by ID.
    pub fn get(&self, account_id: &str) -> StorageResult<AccountRecord> {
        let path = self.storage.paths().account(account_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Account {account_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create or replace an account document.
    pub fn save(&self, record: &AccountRecord) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().account(record.account.id.as_str()), record)
    }

    /// Delete an account document.
    pub fn delete(&self, account_id: &str) -> StorageResult<()> {
        self.storage.delete(self.storage.paths().account(account_id))
    }

    /// Load every account document.
    ///
    /// Unreadable documents are skipped with a warning.
    pub fn list_all(&self) -> StorageResult<Vec<AccountRecord>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().accounts_dir(), "json")?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(account_id = %id, error = %e, "Skipping unreadable account"),
            }
        }
        Ok(records)
    }
}
