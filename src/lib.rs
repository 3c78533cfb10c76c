//! Account ledger and trade-settlement engine.
//!
//! Users hold cash and stock positions; market orders settle immediately at
//! the quote source's current price and are recorded in an append-only
//! transaction log. State persists as JSON blobs through a [`persistence::BlobStore`].

pub mod accounts;
pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod positions;
pub mod quotes;
pub mod settlement;
pub mod transactions;
pub mod types;
pub mod valuation;

pub use error::{LedgerError, QuoteError, StoreError};
pub use ledger::{Ledger, LedgerConfig};
