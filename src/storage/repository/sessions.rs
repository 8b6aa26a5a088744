// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session repository.
//!
//! Active sessions are persisted under `sessions/{session_id}.json` so a
//! signed-in user stays signed in across restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{JsonStorage, StorageError, StorageResult};
use crate::auth::Role;
use crate::models::AccountId;

/// A persisted session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub account_id: AccountId,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Repository for session records.
pub struct SessionRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> SessionRepository<'a> {
    /// Create a new SessionRepository.
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    /// Get a session by ID.
    pub fn get(&self, session_id: &str) -> StorageResult<SessionRecord> {
        let path = self.storage.paths().session(session_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Session {session_id}")));
        }
        self.storage.read_json(path)
    }

    /// Persist a session.
    pub fn save(&self, session: &SessionRecord) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().session(&session.session_id), session)
    }

    /// Delete a session. Deleting a missing session is not an error.
    pub fn delete(&self, session_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().session(session_id);
        if !self.storage.exists(&path) {
            return Ok(());
        }
        self.storage.delete(path)
    }

    /// Load every persisted session.
    pub fn list_all(&self) -> StorageResult<Vec<SessionRecord>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().sessions_dir(), "json")?;

        let mut sessions = Vec::new();
        for id in ids {
            if let Ok(session) = self.get(&id) {
                sessions.push(session);
            }
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, JsonStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn test_session(id: &str) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            session_id: id.to_string(),
            account_id: AccountId::from("acct-1"),
            role: Role::EndUser,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn save_get_delete_session() {
        let (_temp, storage) = test_storage();
        let repo = SessionRepository::new(&storage);

        let session = test_session("sess-1");
        repo.save(&session).unwrap();
        assert_eq!(repo.get("sess-1").unwrap(), session);

        repo.delete("sess-1").unwrap();
        assert!(matches!(repo.get("sess-1"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn deleting_missing_session_is_ok() {
        let (_temp, storage) = test_storage();
        SessionRepository::new(&storage).delete("never-existed").unwrap();
    }

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let session = test_session("s");
        assert!(!session.is_expired(session.issued_at));
        assert!(session.is_expired(session.expires_at));
    }
}
