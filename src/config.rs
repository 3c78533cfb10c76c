//! Runtime settings, read from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STARTING_BALANCE: i64 = 100_000;
const DEFAULT_IO_TIMEOUT_MS: u64 = 5_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where the ledger snapshots are kept. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres(String),
    Directory(PathBuf),
    Memory,
}

/// Admin account created on first start, when the user blob is still empty.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub jwt_secret: Vec<u8>,
    pub starting_balance: Decimal,
    pub io_timeout: Duration,
    pub admin: Option<AdminSeed>,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let storage = if let Some(url) = get("DATABASE_URL") {
            StorageBackend::Postgres(url)
        } else if let Some(dir) = get("LEDGER_DATA_DIR") {
            StorageBackend::Directory(PathBuf::from(dir))
        } else {
            StorageBackend::Memory
        };

        let starting_balance = match get("STARTING_BALANCE") {
            Some(raw) => parse::<Decimal>("STARTING_BALANCE", &raw)?,
            None => Decimal::from(DEFAULT_STARTING_BALANCE),
        };
        if starting_balance.is_sign_negative() {
            return Err(ConfigError::Invalid {
                name: "STARTING_BALANCE",
                reason: "must not be negative".to_string(),
            });
        }

        let io_timeout_ms = match get("IO_TIMEOUT_MS") {
            Some(raw) => parse::<u64>("IO_TIMEOUT_MS", &raw)?,
            None => DEFAULT_IO_TIMEOUT_MS,
        };
        if io_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "IO_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                name: get("ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
                password,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            storage,
            jwt_secret: jwt_secret.into_bytes(),
            starting_balance,
            io_timeout: Duration::from_millis(io_timeout_ms),
            admin,
        })
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            starting_balance: self.starting_balance,
            io_timeout: self.io_timeout,
        }
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
