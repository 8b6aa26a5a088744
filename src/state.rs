// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! Every component is owned here and handed to handlers through axum's
//! `State` extractor. Nothing is global.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{
    AcceptAnyPassword, AuthError, CredentialVerifier, HmacPasswordVerifier, SessionProvider,
};
use crate::catalog::{EcoPointDirectory, MaterialRateTable, OfferCatalog};
use crate::config::{Config, CredentialMode};
use crate::ledger::{LedgerEngine, LedgerError};
use crate::seed;
use crate::storage::{JsonStorage, StorageError, StoragePaths};
use crate::store::AccountStore;

/// Startup failures.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("auth: {0}")]
    Auth(#[from] AuthError),
}

/// Length of a generated session key in bytes.
const SESSION_KEY_LEN: usize = 32;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<JsonStorage>,
    pub accounts: Arc<AccountStore>,
    pub rates: Arc<MaterialRateTable>,
    pub catalog: Arc<OfferCatalog>,
    pub eco_points: Arc<EcoPointDirectory>,
    pub ledger: Arc<LedgerEngine>,
    pub sessions: Arc<SessionProvider>,
}

impl AppState {
    /// Open the data directory, reload accounts, offers and sessions, and
    /// seed the demo data if requested and storage is empty.
    pub async fn open(config: &Config) -> Result<Self, StateError> {
        let mut storage = JsonStorage::new(StoragePaths::new(&config.data_dir));
        storage.initialize()?;
        let storage = Arc::new(storage);

        let accounts = Arc::new(
            AccountStore::load(Arc::clone(&storage))?.with_lock_timeout(config.lock_timeout),
        );
        let rates = Arc::new(MaterialRateTable::default());
        let catalog = Arc::new(OfferCatalog::load(Arc::clone(&storage))?);
        let ledger = Arc::new(LedgerEngine::new(
            Arc::clone(&accounts),
            Arc::clone(&rates),
            Arc::clone(&catalog),
        ));

        let verifier: Arc<dyn CredentialVerifier> = match &config.credential_mode {
            CredentialMode::AcceptAny => Arc::new(AcceptAnyPassword),
            CredentialMode::Hmac { pepper } => {
                Arc::new(HmacPasswordVerifier::new(pepper.as_bytes().to_vec()))
            }
        };
        let secret = match &config.session_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => load_or_create_session_key(&storage)?,
        };
        let ttl = chrono::Duration::from_std(config.session_ttl)
            .map_err(|e| AuthError::InternalError(format!("session TTL out of range: {e}")))?;
        let sessions = Arc::new(SessionProvider::new(
            Arc::clone(&storage),
            Arc::clone(&accounts),
            verifier,
            &secret,
            ttl,
        )?);

        let state = Self {
            storage,
            accounts,
            rates,
            catalog,
            eco_points: Arc::new(EcoPointDirectory::default()),
            ledger,
            sessions,
        };

        if config.seed_demo_data {
            if state.accounts.is_empty().await {
                seed::seed_demo_data(&state).await?;
            } else {
                info!("Storage already holds accounts, skipping demo data");
            }
        }

        Ok(state)
    }

    /// Storage handle for repositories.
    pub fn storage(&self) -> &JsonStorage {
        &self.storage
    }
}

/// The signing key kept in the data directory, created on first start.
///
/// Tokens stay valid across restarts as long as the data directory does.
fn load_or_create_session_key(storage: &JsonStorage) -> Result<Vec<u8>, StorageError> {
    let path = storage.paths().session_key();
    match storage.read_raw(&path) {
        Ok(key) if key.len() >= SESSION_KEY_LEN => return Ok(key),
        Ok(_) => warn!(path = %path.display(), "Session key too short, generating a new one"),
        Err(StorageError::NotFound(_)) => {
            info!(path = %path.display(), "SESSION_SECRET not set, generating a session key")
        }
        Err(e) => return Err(e),
    }

    let mut key = Vec::with_capacity(SESSION_KEY_LEN);
    key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    storage.write_raw(&path, &key)?;
    Ok(key)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_seeds_demo_data_once() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            session_secret: Some("secret".to_string()),
            seed_demo_data: true,
            ..Config::default()
        };

        let first = AppState::open(&config).await.unwrap();
        let seeded = first.accounts.len().await;
        assert_eq!(seeded, 4);
        drop(first);

        let reopened = AppState::open(&config).await.unwrap();
        assert_eq!(reopened.accounts.len().await, seeded);
        let maria = reopened.accounts.find_by_phone(END_USER_PHONE).await.unwrap();
        assert_eq!(maria.point_balance, 150);
    }

    #[tokio::test]
    async fn open_without_seed_starts_empty() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            ..Config::default()
        };
        let state = AppState::open(&config).await.unwrap();
        assert!(state.accounts.is_empty().await);
        assert_eq!(state.catalog.partners().len(), 4);
    }

    #[tokio::test]
    async fn test_state_signs_in_every_role() {
        let (state, _temp) = test_state().await;
        for phone in [END_USER_PHONE, RICH_USER_PHONE, DROP_OFF_PHONE, SPONSOR_PHONE] {
            let token = sign_in(&state, phone).await;
            assert!(state.sessions.verify(&token).await.is_ok());
        }
    }

    #[tokio::test]
    async fn sessions_survive_restart_without_configured_secret() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp.path().to_path_buf(),
            seed_demo_data: true,
            ..Config::default()
        };
        assert!(config.session_secret.is_none());

        let first = AppState::open(&config).await.unwrap();
        let token = sign_in(&first, END_USER_PHONE).await;
        assert!(first.storage.paths().session_key().is_file());
        drop(first);

        let reopened = AppState::open(&config).await.unwrap();
        let user = reopened.sessions.verify(&token).await.unwrap();
        let maria = reopened.accounts.find_by_phone(END_USER_PHONE).await.unwrap();
        assert_eq!(user.account_id, maria.id);
    }

    #[tokio::test]
    async fn configured_secret_does_not_write_a_key() {
        let (state, _temp) = test_state().await;
        assert!(!state.storage.paths().session_key().exists());
    }
}
