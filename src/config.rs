// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for JSON persistence | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SESSION_SECRET` | HS256 key for session tokens | Generated once into `DATA_DIR/session.key` |
//! | `SESSION_TTL_SECS` | Session token lifetime | `86400` |
//! | `CREDENTIAL_MODE` | `accept-any` or `hmac` | `accept-any` |
//! | `CREDENTIAL_PEPPER` | HMAC key for `hmac` mode | Required in `hmac` mode |
//! | `LEDGER_LOCK_TIMEOUT_MS` | Max wait for an account lock | `2000` |
//! | `SEED_DEMO_DATA` | Seed demo accounts into empty storage | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::storage::DATA_ROOT;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const CREDENTIAL_MODE_ENV: &str = "CREDENTIAL_MODE";
pub const CREDENTIAL_PEPPER_ENV: &str = "CREDENTIAL_PEPPER";
pub const LOCK_TIMEOUT_ENV: &str = "LEDGER_LOCK_TIMEOUT_MS";
pub const SEED_DEMO_DATA_ENV: &str = "SEED_DEMO_DATA";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} is required when {1}")]
    Missing(&'static str, &'static str),
}

/// Password checking strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// Any non-empty password signs in.
    AcceptAny,
    /// HMAC-SHA256 digests keyed by the pepper.
    Hmac { pepper: String },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// `None` means the key in `DATA_DIR/session.key` is used, created on first start.
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
    pub credential_mode: CredentialMode,
    pub lock_timeout: Duration,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_ROOT),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            session_secret: None,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            credential_mode: CredentialMode::AcceptAny,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            seed_demo_data: false,
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to read variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DATA_ROOT));

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => parse(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                name: HOST_ENV,
                value: host.clone(),
                reason: e.to_string(),
            })?;

        let session_ttl = match var(SESSION_TTL_ENV) {
            Some(raw) => positive(SESSION_TTL_ENV, &raw).map(Duration::from_secs)?,
            None => Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        };

        let credential_mode = match var(CREDENTIAL_MODE_ENV).as_deref() {
            None | Some("accept-any") => CredentialMode::AcceptAny,
            Some("hmac") => CredentialMode::Hmac {
                pepper: var(CREDENTIAL_PEPPER_ENV).ok_or(ConfigError::Missing(
                    CREDENTIAL_PEPPER_ENV,
                    "CREDENTIAL_MODE=hmac",
                ))?,
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: CREDENTIAL_MODE_ENV,
                    value: other.to_string(),
                    reason: "expected accept-any or hmac".to_string(),
                })
            }
        };

        let lock_timeout = match var(LOCK_TIMEOUT_ENV) {
            Some(raw) => positive(LOCK_TIMEOUT_ENV, &raw).map(Duration::from_millis)?,
            None => Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        };

        let seed_demo_data = match var(SEED_DEMO_DATA_ENV) {
            Some(raw) => parse_bool(SEED_DEMO_DATA_ENV, &raw)?,
            None => false,
        };

        Ok(Self {
            data_dir,
            bind_addr,
            session_secret: var(SESSION_SECRET_ENV),
            session_ttl,
            credential_mode,
            lock_timeout,
            seed_demo_data,
        })
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match parse::<u64>(name, raw)? {
        0 => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        n => Ok(n),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
