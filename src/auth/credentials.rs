// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password verification strategies.
//!
//! The session provider only talks to [`CredentialVerifier`]; which strategy
//! is active is a configuration choice.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::AuthError;
use crate::models::AccountId;

type HmacSha256 = Hmac<Sha256>;

/// Checks a password presented at sign-in.
pub trait CredentialVerifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Called once at registration. Returns the digest to store, if the
    /// strategy keeps one.
    fn enroll(&self, account_id: &AccountId, password: &str) -> Result<Option<String>, AuthError>;

    /// `stored` is the digest returned by `enroll`, when one was recorded.
    fn verify(&self, account_id: &AccountId, password: &str, stored: Option<&str>) -> bool;
}

/// Accepts any non-empty password and stores nothing.
///
/// This is how the product signs people in today. Swap it for
/// [`HmacPasswordVerifier`] to check real passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyPassword;

impl CredentialVerifier for AcceptAnyPassword {
    fn name(&self) -> &'static str {
        "accept-any"
    }

    fn enroll(&self, _account_id: &AccountId, _password: &str) -> Result<Option<String>, AuthError> {
        Ok(None)
    }

    fn verify(&self, _account_id: &AccountId, password: &str, _stored: Option<&str>) -> bool {
        !password.is_empty()
    }
}

/// HMAC-SHA256 over `account_id:password`, keyed by a server-wide pepper.
pub struct HmacPasswordVerifier {
    pepper: Vec<u8>,
}

impl HmacPasswordVerifier {
    pub fn new(pepper: impl Into<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    fn mac(&self, account_id: &AccountId, password: &str) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.pepper)
            .map_err(|e| AuthError::InternalError(format!("invalid pepper: {e}")))?;
        mac.update(account_id.as_str().as_bytes());
        mac.update(b":");
        mac.update(password.as_bytes());
        Ok(mac)
    }
}

impl CredentialVerifier for HmacPasswordVerifier {
    fn name(&self) -> &'static str {
        "hmac"
    }

    fn enroll(&self, account_id: &AccountId, password: &str) -> Result<Option<String>, AuthError> {
        let digest = self.mac(account_id, password)?.finalize().into_bytes();
        Ok(Some(Base64::encode_string(&digest)))
    }

    fn verify(&self, account_id: &AccountId, password: &str, stored: Option<&str>) -> bool {
        let Some(expected) = stored.and_then(|s| Base64::decode_vec(s).ok()) else {
            return false;
        };
        match self.mac(account_id, password) {
            // Constant-time comparison.
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_any_only_rejects_empty() {
        let id = AccountId::from("acct");
        let verifier = AcceptAnyPassword;
        assert_eq!(verifier.enroll(&id, "whatever").unwrap(), None);
        assert!(verifier.verify(&id, "whatever", None));
        assert!(!verifier.verify(&id, "", None));
    }

    #[test]
    fn hmac_round_trip() {
        let id = AccountId::from("acct");
        let verifier = HmacPasswordVerifier::new(b"pepper".to_vec());
        let digest = verifier.enroll(&id, "s3nha").unwrap().unwrap();

        assert!(verifier.verify(&id, "s3nha", Some(&digest)));
        assert!(!verifier.verify(&id, "senha", Some(&digest)));
        assert!(!verifier.verify(&id, "s3nha", None));
        assert!(!verifier.verify(&id, "s3nha", Some("not base64!")));
    }

    #[test]
    fn hmac_digest_is_bound_to_account_and_pepper() {
        let a = AccountId::from("a");
        let b = AccountId::from("b");
        let verifier = HmacPasswordVerifier::new(b"pepper".to_vec());
        let digest = verifier.enroll(&a, "s3nha").unwrap().unwrap();

        assert!(!verifier.verify(&b, "s3nha", Some(&digest)));
        let other = HmacPasswordVerifier::new(b"other".to_vec());
        assert!(!other.verify(&a, "s3nha", Some(&digest)));
    }
}
