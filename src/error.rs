use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the blob store. Always infrastructure, never the caller's fault.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode blob '{key}': {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid blob key '{0}'")]
    InvalidKey(String),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote source unavailable: {0}")]
    Unavailable(String),

    #[error("quote lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("quote source returned non-positive price {price} for '{symbol}'")]
    InvalidPrice { symbol: String, price: Decimal },
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("an account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("invalid account profile: {0}")]
    InvalidProfile(String),

    #[error("account {0} not found")]
    AccountNotFound(Uuid),

    #[error("unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("share count must be a positive integer within range")]
    InvalidQuantity,

    #[error("insufficient funds: order costs {required}, cash balance is {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        held: u64,
    },

    #[error("no position in {0}")]
    PositionNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("credential processing failed: {0}")]
    Credential(String),
}

impl LedgerError {
    /// True for rejections caused by the request itself; false for
    /// infrastructure faults (store, quote feed, hashing).
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            LedgerError::Store(_) | LedgerError::Quote(_) | LedgerError::Credential(_)
        )
    }
}
