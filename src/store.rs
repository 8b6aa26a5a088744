// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account store.
//!
//! Holds every account together with its point history. Each account lives
//! in its own mutex-guarded slot, so operations on one account serialize
//! while different accounts proceed in parallel. The phone index maps
//! normalized phone numbers to account ids and is guarded by a separate
//! read-write lock that is never held while waiting on a slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{info, warn};

use crate::auth::Role;
use crate::ledger::LedgerError;
use crate::models::{Account, AccountId, PhoneNumber, RegistrationInfo};
use crate::storage::{AccountRecord, AccountRepository, JsonStorage};

/// Default upper bound on waiting for an account slot.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

type Slot = Arc<Mutex<AccountRecord>>;

#[derive(Default)]
struct Index {
    by_id: HashMap<AccountId, Slot>,
    by_phone: HashMap<PhoneNumber, AccountId>,
}

/// Owned, injectable account store.
pub struct AccountStore {
    index: RwLock<Index>,
    storage: Option<Arc<JsonStorage>>,
    lock_timeout: Duration,
    /// Last redemption sequence handed out.
    sequence: AtomicU64,
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore {
    /// Purely in-memory store.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(Index::default()),
            storage: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            sequence: AtomicU64::new(0),
        }
    }

    /// Load every persisted account and write future changes back to `storage`.
    pub fn load(storage: Arc<JsonStorage>) -> Result<Self, LedgerError> {
        let records = AccountRepository::new(&storage).list_all()?;

        let mut index = Index::default();
        let mut sequence = 0;
        for record in records {
            let account = &record.account;
            if index.by_phone.contains_key(&account.phone) {
                warn!(
                    account_id = %account.id,
                    phone = %account.phone,
                    "Skipping account with duplicate phone"
                );
                continue;
            }
            if record.replayed_balance() != i128::from(account.point_balance) {
                warn!(
                    account_id = %account.id,
                    balance = account.point_balance,
                    replayed = %record.replayed_balance(),
                    "Stored balance does not match history"
                );
            }
            sequence = record
                .redemptions
                .iter()
                .map(|e| e.sequence)
                .fold(sequence, u64::max);
            index
                .by_phone
                .insert(account.phone.clone(), account.id.clone());
            index
                .by_id
                .insert(account.id.clone(), Arc::new(Mutex::new(record)));
        }

        info!(accounts = index.by_id.len(), "Account store loaded");

        Ok(Self {
            index: RwLock::new(index),
            storage: Some(storage),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            sequence: AtomicU64::new(sequence),
        })
    }

    /// Next redemption sequence number, continuing after any loaded history.
    pub(crate) fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Override how long an operation may wait for an account slot.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Number of registered accounts.
    pub async fn len(&self) -> usize {
        self.index.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Find an account by phone number in any formatting.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Account, LedgerError> {
        let phone = PhoneNumber::normalize(phone);
        let account_id = self
            .index
            .read()
            .await
            .by_phone
            .get(&phone)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(phone.to_string()))?;
        self.find_by_id(&account_id).await
    }

    /// Find an account by id.
    pub async fn find_by_id(&self, account_id: &AccountId) -> Result<Account, LedgerError> {
        let record = self.lock(account_id).await?;
        Ok(record.account.clone())
    }

    /// Register a new end-user account with a zero balance.
    pub async fn create(&self, info: RegistrationInfo) -> Result<Account, LedgerError> {
        self.create_with_role(info, Role::EndUser, None).await
    }

    /// Register an account with an explicit role.
    ///
    /// Operators are provisioned this way; `affiliation` names their eco point
    /// or partner.
    pub async fn create_with_role(
        &self,
        info: RegistrationInfo,
        role: Role,
        affiliation: Option<String>,
    ) -> Result<Account, LedgerError> {
        let name = info.name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidRegistration(
                "name must not be empty".to_string(),
            ));
        }

        let phone = PhoneNumber::normalize(&info.phone);
        if !phone.is_valid() {
            return Err(LedgerError::InvalidPhone(format!(
                "expected {} to {} digits, got {:?}",
                PhoneNumber::MIN_DIGITS,
                PhoneNumber::MAX_DIGITS,
                info.phone
            )));
        }

        let mut index = self.index.write().await;
        if index.by_phone.contains_key(&phone) {
            return Err(LedgerError::DuplicatePhone(phone.to_string()));
        }

        let account = Account {
            id: AccountId::generate(),
            name: name.to_string(),
            phone: phone.clone(),
            role,
            point_balance: 0,
            affiliation,
            address: info.address,
            created_at: Utc::now(),
        };
        let record = AccountRecord::new(account.clone());
        self.persist(&record)?;

        index.by_phone.insert(phone, account.id.clone());
        index
            .by_id
            .insert(account.id.clone(), Arc::new(Mutex::new(record)));

        info!(account_id = %account.id, role = %account.role, "Account registered");
        Ok(account)
    }

    /// Undo a registration whose follow-up steps failed.
    ///
    /// Only meant for accounts that have no history yet.
    pub(crate) async fn discard(&self, account: &Account) {
        let account_id = &account.id;
        {
            let mut index = self.index.write().await;
            if index.by_id.remove(account_id).is_none() {
                return;
            }
            index.by_phone.remove(&account.phone);
        }

        if let Some(storage) = &self.storage {
            if let Err(e) = AccountRepository::new(storage).delete(account_id.as_str()) {
                warn!(account_id = %account_id, error = %e, "Failed to delete discarded account");
            }
        }
        info!(account_id = %account_id, "Registration discarded");
    }

    /// Lock an account slot, waiting at most the configured timeout.
    ///
    /// The guard gives exclusive access to the account and its history.
    pub(crate) async fn lock(
        &self,
        account_id: &AccountId,
    ) -> Result<OwnedMutexGuard<AccountRecord>, LedgerError> {
        let slot = self
            .index
            .read()
            .await
            .by_id
            .get(account_id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        tokio::time::timeout(self.lock_timeout, slot.lock_owned())
            .await
            .map_err(|_| {
                warn!(account_id = %account_id, "Timed out waiting for account lock");
                LedgerError::Unavailable(format!("account {account_id} is busy"))
            })
    }

    /// Every account slot, in no particular order.
    pub(crate) async fn slots(&self) -> Vec<(AccountId, Slot)> {
        self.index
            .read()
            .await
            .by_id
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect()
    }

    /// Lock a slot obtained from [`AccountStore::slots`].
    pub(crate) async fn lock_slot(
        &self,
        account_id: &AccountId,
        slot: Slot,
    ) -> Result<OwnedMutexGuard<AccountRecord>, LedgerError> {
        tokio::time::timeout(self.lock_timeout, slot.lock_owned())
            .await
            .map_err(|_| LedgerError::Unavailable(format!("account {account_id} is busy")))
    }

    /// Write an account document through to storage, if configured.
    pub(crate) fn persist(&self, record: &AccountRecord) -> Result<(), LedgerError> {
        if let Some(storage) = &self.storage {
            AccountRepository::new(storage).save(record).map_err(|e| {
                warn!(account_id = %record.account.id, error = %e, "Failed to persist account");
                LedgerError::from(e)
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn registration(name: &str, phone: &str) -> RegistrationInfo {
        RegistrationInfo {
            name: name.to_string(),
            phone: phone.to_string(),
            password: "secret".to_string(),
            address: None,
        }
    }

    #[tokio::test]
    async fn create_registers_end_user_with_zero_balance() {
        let store = AccountStore::new();
        let account = store
            .create(registration("Maria da Silva", "(81) 99999-9999"))
            .await
            .unwrap();

        assert_eq!(account.role, Role::EndUser);
        assert_eq!(account.point_balance, 0);
        assert_eq!(account.phone.as_str(), "81999999999");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected_after_normalization() {
        let store = AccountStore::new();
        store
            .create(registration("Maria", "(81) 99999-9999"))
            .await
            .unwrap();

        let err = store
            .create(registration("Outra Maria", "81999999999"))
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::DuplicatePhone("81999999999".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn invalid_phone_and_empty_name_are_rejected() {
        let store = AccountStore::new();

        let err = store.create(registration("Maria", "9999-9999")).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPhone(_)));

        let err = store.create(registration("   ", "81999999999")).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRegistration(_)));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn find_by_phone_accepts_any_formatting() {
        let store = AccountStore::new();
        let created = store
            .create(registration("Vandilma Candido", "81666666666"))
            .await
            .unwrap();

        let found = store.find_by_phone("(81) 66666-6666").await.unwrap();
        assert_eq!(found, created);

        let by_id = store.find_by_id(&created.id).await.unwrap();
        assert_eq!(by_id, created);
    }

    #[tokio::test]
    async fn missing_accounts_are_not_found() {
        let store = AccountStore::new();
        assert!(matches!(
            store.find_by_phone("81000000000").await,
            Err(LedgerError::AccountNotFound(_))
        ));
        assert!(matches!(
            store.find_by_id(&AccountId::from("ghost")).await,
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn operators_keep_role_and_affiliation() {
        let store = AccountStore::new();
        let operator = store
            .create_with_role(
                registration("Operador Eco Ponto", "81988888888"),
                Role::DropOffOperator,
                Some("1".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(operator.role, Role::DropOffOperator);
        assert_eq!(operator.affiliation.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn accounts_survive_reload() {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let storage = Arc::new(storage);

        let created = {
            let store = AccountStore::load(Arc::clone(&storage)).unwrap();
            store
                .create(registration("Maria", "81999999999"))
                .await
                .unwrap()
        };

        let reloaded = AccountStore::load(storage).unwrap();
        assert_eq!(reloaded.find_by_phone("81999999999").await.unwrap(), created);
    }

    #[tokio::test]
    async fn lock_times_out_instead_of_blocking() {
        let store = AccountStore::new().with_lock_timeout(Duration::from_millis(20));
        let account = store
            .create(registration("Maria", "81999999999"))
            .await
            .unwrap();

        let _held = store.lock(&account.id).await.unwrap();
        let err = store.find_by_id(&account.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn discarded_registration_frees_the_phone() {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let storage = Arc::new(storage);
        let store = AccountStore::load(Arc::clone(&storage)).unwrap();

        let first = store
            .create(registration("Maria", "81999999999"))
            .await
            .unwrap();
        store.discard(&first).await;

        assert!(store.is_empty().await);
        assert!(!storage.exists(storage.paths().account(first.id.as_str())));
        let second = store
            .create(registration("Maria", "(81) 99999-9999"))
            .await
            .unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(AccountStore::load(storage).unwrap().len().await, 1);
    }
}
