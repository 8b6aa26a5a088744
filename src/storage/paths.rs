// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the on-disk storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for all persistent storage.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Account Paths ==========

    /// Directory containing all account documents.
    pub fn accounts_dir(&self) -> PathBuf {
        self.root.join("accounts")
    }

    /// Path to an account document (account record plus its point history).
    pub fn account(&self, account_id: &str) -> PathBuf {
        self.accounts_dir().join(format!("{account_id}.json"))
    }

    // ========== Credential Paths ==========

    /// Directory containing credential digests.
    pub fn credentials_dir(&self) -> PathBuf {
        self.root.join("credentials")
    }

    /// Path to the credential digest of an account.
    pub fn credential(&self, account_id: &str) -> PathBuf {
        self.credentials_dir().join(format!("{account_id}.json"))
    }

    // ========== Session Paths ==========

    /// Directory containing active sessions.
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    /// Path to a specific session record.
    pub fn session(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(format!("{session_id}.json"))
    }

    /// Generated session signing key, used when no secret is configured.
    pub fn session_key(&self) -> PathBuf {
        self.root.join("session.key")
    }

    // ========== Catalog Paths ==========

    /// Directory containing catalog data.
    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join("catalog")
    }

    /// Path to the persisted offer list.
    pub fn offers(&self) -> PathBuf {
        self.catalog_dir().join("offers.json")
    }

    // ========== Audit Log Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Directory for a specific date's audit logs.
    pub fn audit_date_dir(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date)
    }

    /// Path to a daily audit events file (JSONL format).
    pub fn audit_events_file(&self, date: &str) -> PathBuf {
        self.audit_date_dir(date).join("events.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("./data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(paths.root(), Path::new("/tmp/test-data"));
        assert_eq!(
            paths.account("acct-123"),
            PathBuf::from("/tmp/test-data/accounts/acct-123.json")
        );
    }

    #[test]
    fn session_and_credential_paths_are_correct() {
        let paths = StoragePaths::new("/data");
        assert_eq!(paths.sessions_dir(), PathBuf::from("/data/sessions"));
        assert_eq!(
            paths.session("sess-1"),
            PathBuf::from("/data/sessions/sess-1.json")
        );
        assert_eq!(
            paths.credential("acct-1"),
            PathBuf::from("/data/credentials/acct-1.json")
        );
    }

    #[test]
    fn catalog_and_audit_paths_are_correct() {
        let paths = StoragePaths::new("/data");
        assert_eq!(paths.offers(), PathBuf::from("/data/catalog/offers.json"));
        assert_eq!(
            paths.audit_events_file("2026-01-28"),
            PathBuf::from("/data/audit/2026-01-28/events.jsonl")
        );
    }
}
