// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential digest repository.
//!
//! Only used by the HMAC credential strategy. Digests live apart from the
//! account documents so account JSON never carries secrets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{JsonStorage, StorageError, StorageResult};

/// Stored password digest for one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredential {
    pub account_id: String,
    /// Base64-encoded HMAC-SHA256 of the password.
    pub digest: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for credential digests.
pub struct CredentialRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> CredentialRepository<'a> {
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    /// Get the credential for an account.
    pub fn get(&self, account_id: &str) -> StorageResult<StoredCredential> {
        let path = self.storage.paths().credential(account_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Credential {account_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create or replace the credential for an account.
    pub fn save(&self, credential: &StoredCredential) -> StorageResult<()> {
        self.storage.write_json(
            self.storage.paths().credential(&credential.account_id),
            credential,
        )
    }
}
