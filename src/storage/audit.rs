// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for point movements and account activity.
//!
//! Credits, redemptions, registrations, sessions and catalog changes are
//! appended to a daily JSONL file under `audit/{date}/events.jsonl`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{JsonStorage, StorageError, StorageResult};

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Account events
    AccountRegistered,

    // Ledger events
    PointsCredited,
    PointsRedeemed,

    // Catalog events
    OfferAdded,
    OfferUpdated,
    OfferRemoved,

    // Auth events
    SessionStarted,
    SessionEnded,
    AuthFailure,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// Account that performed the action (if known).
    pub actor_id: Option<String>,
    /// Resource affected (account id, offer id, ...).
    pub resource_id: Option<String>,
    /// Resource type (account, offer, session).
    pub resource_type: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            actor_id: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the acting account.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    storage: &'a JsonStorage,
}

impl<'a> AuditRepository<'a> {
    /// Create a new audit repository.
    pub fn new(storage: &'a JsonStorage) -> Self {
        Self { storage }
    }

    /// Log an audit event.
    ///
    /// Events are appended to a daily log file in JSONL format.
    pub fn log(&self, event: &AuditEvent) -> StorageResult<()> {
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().audit_events_file(&date);

        let mut line = serde_json::to_vec(event).map_err(|e| {
            StorageError::SerializationError(format!("Failed to serialize audit event: {e}"))
        })?;
        line.push(b'\n');

        self.storage.append_raw(&path, &line)
    }

    /// Log an event, downgrading failures to a warning.
    ///
    /// Auditing never fails the operation being audited.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.log(&event) {
            tracing::warn!(
                error = %e,
                event_type = ?event.event_type,
                "Failed to write audit event"
            );
        }
    }

    /// Read audit events for a specific date.
    pub fn read_events(&self, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let path = self.storage.paths().audit_events_file(date);
        let content = self.storage.read_raw(&path)?;

        let content_str = String::from_utf8(content).map_err(|e| {
            StorageError::SerializationError(format!("Invalid UTF-8 in audit log: {e}"))
        })?;

        content_str
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    StorageError::SerializationError(format!(
                        "Failed to deserialize audit event: {e}"
                    ))
                })
            })
            .collect()
    }
}

/// Record an audit event for an authenticated caller.
///
/// Failures are logged and swallowed.
#[macro_export]
macro_rules! audit_log {
    ($storage:expr, $event_type:expr, $user:expr) => {{
        let repo = $crate::storage::AuditRepository::new($storage);
        let event = $crate::storage::AuditEvent::new($event_type)
            .with_actor($user.account_id.as_str());
        repo.record(event);
    }};
    ($storage:expr, $event_type:expr, $user:expr, $resource_type:expr, $resource_id:expr) => {{
        let repo = $crate::storage::AuditRepository::new($storage);
        let event = $crate::storage::AuditEvent::new($event_type)
            .with_actor($user.account_id.as_str())
            .with_resource($resource_type, $resource_id);
        repo.record(event);
    }};
    ($storage:expr, $event_type:expr, $user:expr, $resource_type:expr, $resource_id:expr, $details:expr) => {{
        let repo = $crate::storage::AuditRepository::new($storage);
        let event = $crate::storage::AuditEvent::new($event_type)
            .with_actor($user.account_id.as_str())
            .with_resource($resource_type, $resource_id)
            .with_details($details);
        repo.record(event);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    #[test]
    fn create_audit_event() {
        let event = AuditEvent::new(AuditEventType::PointsCredited)
            .with_actor("operator_1")
            .with_resource("account", "acct_abc")
            .with_details(serde_json::json!({ "points": 150 }));

        assert_eq!(event.event_type, AuditEventType::PointsCredited);
        assert_eq!(event.actor_id, Some("operator_1".to_string()));
        assert_eq!(event.resource_type, Some("account".to_string()));
        assert_eq!(event.resource_id, Some("acct_abc".to_string()));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::AuthFailure).failed("Invalid credentials");

        assert!(!event.success);
        assert_eq!(event.error, Some("Invalid credentials".to_string()));
    }

    #[test]
    fn log_and_read_events() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.record(
            AuditEvent::new(AuditEventType::AccountRegistered).with_resource("account", "a1"),
        );
        repo.record(AuditEvent::new(AuditEventType::PointsRedeemed).with_resource("account", "a1"));

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let events = repo.read_events(&today).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::AccountRegistered);
        assert_eq!(events[1].event_type, AuditEventType::PointsRedeemed);
    }

    #[test]
    fn record_on_uninitialized_storage_does_not_panic() {
        let storage = JsonStorage::new(StoragePaths::new("/tmp/never-init-audit"));
        AuditRepository::new(&storage).record(AuditEvent::new(AuditEventType::SessionEnded));
    }

    #[test]
    fn logging_appends_to_existing_day() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        let earlier = AuditEvent::new(AuditEventType::SessionStarted).with_actor("a1");
        let date = earlier.timestamp.format("%Y-%m-%d").to_string();
        let path = storage.paths().audit_events_file(&date);
        let mut existing = serde_json::to_vec(&earlier).unwrap();
        existing.push(b'\n');
        storage.write_raw(&path, &existing).unwrap();

        let later = AuditEvent {
            timestamp: earlier.timestamp,
            ..AuditEvent::new(AuditEventType::SessionEnded).with_actor("a1")
        };
        repo.log(&later).unwrap();

        let content = storage.read_raw(&path).unwrap();
        assert!(content.starts_with(&existing));
        let events = repo.read_events(&date).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_id, earlier.event_id);
        assert_eq!(events[1].event_id, later.event_id);
    }

    #[test]
    fn unwritable_log_fails_without_touching_it() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        let event = AuditEvent::new(AuditEventType::PointsCredited);
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let path = storage.paths().audit_events_file(&date);
        std::fs::create_dir_all(path.join("kept")).unwrap();

        assert!(repo.log(&event).is_err());
        assert!(path.join("kept").is_dir());
    }
}
