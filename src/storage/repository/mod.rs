// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to JSON storage.
//!
//! Each repository provides access to one entity type, using JsonStorage
//! for all file operations.

pub mod accounts;
pub mod credentials;
pub mod offers;
pub mod sessions;

pub use accounts::{AccountRecord, AccountRepository};
pub use credentials::{CredentialRepository, StoredCredential};
pub use offers::OfferRepository;
pub use sessions::{SessionRecord, SessionRepository};
