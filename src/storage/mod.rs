// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage Module
//!
//! All durable state is kept as JSON documents under the data directory
//! (`DATA_DIR`, default `./data`).
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   accounts/
//!     {account_id}.json    # Account, balance and full point history
//!   credentials/
//!     {account_id}.json    # Password digest (hmac credential mode only)
//!   sessions/
//!     {session_id}.json    # Active sessions
//!   catalog/
//!     offers.json          # Partner offers
//!   audit/
//!     {date}/events.jsonl  # Daily audit logs
//!   session.key            # Generated token key when SESSION_SECRET is unset
//! ```

pub mod audit;
pub mod json_fs;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use json_fs::{JsonStorage, StorageError, StorageResult};
pub use paths::{StoragePaths, DATA_ROOT};
pub use repository::{
    AccountRecord, AccountRepository, CredentialRepository, OfferRepository, SessionRecord,
    SessionRepository, StoredCredential,
};
