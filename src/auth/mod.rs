// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Phone-number sign-in and session tokens for the EcoGanha API.
//!
//! ## Auth Flow
//!
//! 1. Client posts phone number and password to `POST /v1/sessions`
//! 2. The configured [`CredentialVerifier`] checks the password
//! 3. Server issues an HS256 session token and persists the session record
//! 4. Client sends `Authorization: Bearer <token>` on later requests
//! 5. Extractors verify the signature, expiry and that the session still
//!    exists, then expose:
//!      - `sub` → `account_id`
//!      - `role` and, for operators, `aff` → affiliation
//!
//! ## Security
//!
//! - Every operator and account endpoint requires a session
//! - Ending a session invalidates its token immediately
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod roles;
pub mod session;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use credentials::{AcceptAnyPassword, CredentialVerifier, HmacPasswordVerifier};
pub use error::AuthError;
pub use extractor::{Auth, DropOffOperatorOnly, EndUserOnly, OperatorOnly, SponsorOnly};
pub use roles::Role;
pub use session::{Session, SessionProvider};
