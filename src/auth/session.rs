// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session/identity provider.
//!
//! Signs users in by phone number, issues HS256 session tokens and keeps the
//! matching session records on disk so a signed-in user survives a restart.
//! A token is only honored while its session record exists.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::claims::{AuthenticatedUser, SessionClaims};
use super::credentials::CredentialVerifier;
use super::error::AuthError;
use crate::ledger::LedgerError;
use crate::models::{Account, AccountId};
use crate::storage::{
    CredentialRepository, JsonStorage, SessionRecord, SessionRepository, StorageError,
    StoredCredential,
};
use crate::store::AccountStore;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// A freshly started session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub record: SessionRecord,
    pub account: Account,
}

/// Issues and checks sessions.
pub struct SessionProvider {
    storage: Arc<JsonStorage>,
    accounts: Arc<AccountStore>,
    verifier: Arc<dyn CredentialVerifier>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionProvider {
    /// Create a provider and reload the persisted sessions.
    ///
    /// Sessions that expired while the server was down are deleted.
    pub fn new(
        storage: Arc<JsonStorage>,
        accounts: Arc<AccountStore>,
        verifier: Arc<dyn CredentialVerifier>,
        secret: &[u8],
        ttl: Duration,
    ) -> Result<Self, AuthError> {
        let repo = SessionRepository::new(&storage);
        let now = Utc::now();

        let mut sessions = HashMap::new();
        for record in repo.list_all()? {
            if record.is_expired(now) {
                if let Err(e) = repo.delete(&record.session_id) {
                    warn!(session_id = %record.session_id, error = %e, "Failed to delete expired session");
                }
                continue;
            }
            sessions.insert(record.session_id.clone(), record);
        }

        info!(
            sessions = sessions.len(),
            credentials = verifier.name(),
            "Session provider ready"
        );

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            storage,
            accounts,
            verifier,
            ttl,
            sessions: RwLock::new(sessions),
        })
    }

    /// Name of the active credential strategy.
    pub fn credential_mode(&self) -> &'static str {
        self.verifier.name()
    }

    /// Record whatever the credential strategy keeps for a new account.
    pub fn enroll(&self, account_id: &AccountId, password: &str) -> Result<(), AuthError> {
        if let Some(digest) = self.verifier.enroll(account_id, password)? {
            CredentialRepository::new(&self.storage).save(&StoredCredential {
                account_id: account_id.to_string(),
                digest,
                updated_at: Utc::now(),
            })?;
        }
        Ok(())
    }

    /// Sign in by phone number and password.
    pub async fn authenticate(&self, phone: &str, password: &str) -> Result<Session, AuthError> {
        let account = self.accounts.find_by_phone(phone).await.map_err(|e| match e {
            LedgerError::AccountNotFound(phone) => AuthError::AccountNotFound(phone),
            other => AuthError::Unavailable(other.to_string()),
        })?;

        let stored = match CredentialRepository::new(&self.storage).get(account.id.as_str()) {
            Ok(credential) => Some(credential.digest),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        if password.is_empty() || !self.verifier.verify(&account.id, password, stored.as_deref()) {
            warn!(account_id = %account.id, "Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let issued_at = Utc::now();
        let record = SessionRecord {
            session_id: uuid::Uuid::new_v4().to_string(),
            account_id: account.id.clone(),
            role: account.role,
            issued_at,
            expires_at: issued_at + self.ttl,
        };

        let claims = SessionClaims {
            sub: account.id.to_string(),
            sid: record.session_id.clone(),
            role: account.role,
            aff: account.affiliation.clone(),
            iat: record.issued_at.timestamp(),
            exp: record.expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        SessionRepository::new(&self.storage).save(&record)?;
        self.sessions
            .write()
            .await
            .insert(record.session_id.clone(), record.clone());

        info!(
            account_id = %account.id,
            session_id = %record.session_id,
            role = %account.role,
            "Session started"
        );
        Ok(Session {
            token,
            record,
            account,
        })
    }

    /// Verify a bearer token and return the caller it identifies.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        let sessions = self.sessions.read().await;
        let record = sessions
            .get(&claims.sid)
            .filter(|record| record.account_id.as_str() == claims.sub)
            .ok_or_else(|| {
                debug!(session_id = %claims.sid, "Token for unknown session");
                AuthError::SessionEnded
            })?;
        if record.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        Ok(AuthenticatedUser::from_claims(claims))
    }

    /// End a session. Ending an unknown session is not an error.
    pub async fn end_session(&self, session_id: &str) {
        let removed = self.sessions.write().await.remove(session_id);
        if let Err(e) = SessionRepository::new(&self.storage).delete(session_id) {
            warn!(session_id, error = %e, "Failed to delete session record");
        }
        if let Some(record) = removed {
            info!(account_id = %record.account_id, session_id, "Session ended");
        }
    }

    /// Number of live sessions.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = {
            let mut sessions = self.sessions.write().await;
            let expired: Vec<String> = sessions
                .values()
                .filter(|record| record.is_expired(now))
                .map(|record| record.session_id.clone())
                .collect();
            for session_id in &expired {
                sessions.remove(session_id);
            }
            expired
        };

        let repo = SessionRepository::new(&self.storage);
        for session_id in &expired {
            if let Err(e) = repo.delete(session_id) {
                warn!(session_id = %session_id, error = %e, "Failed to delete expired session");
            }
        }
        expired.len()
    }
}
