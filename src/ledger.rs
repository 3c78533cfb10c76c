//! The ledger service: owns the account repository and transaction log,
//! settles trades against the quote source and persists every change.
//!
//! All state sits behind one `RwLock`. Mutations hold the write lock across
//! read-modify-persist-commit: the new state is built on a copy, written to the
//! store, and swapped in only after the store accepted it. A failed write
//! therefore leaves memory exactly as it was.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::accounts::{AccountRepository, normalize_email, validate_profile};
use crate::credentials::{hash_password, verify_password};
use crate::error::{LedgerError, QuoteError, StoreError};
use crate::persistence::{BlobStore, TRANSACTIONS_KEY, USERS_KEY};
use crate::positions::get_positions;
use crate::quotes::QuoteSource;
use crate::settlement::settle;
use crate::transactions::TransactionLog;
use crate::types::account::{Account, AccountId, AccountRole, AccountStatus, NewAccount};
use crate::types::order::{OrderSide, Price, Qty, normalize_symbol};
use crate::types::position::Position;
use crate::types::quote::Quote;
use crate::types::transaction::Transaction;
use crate::valuation::{
    AccountValue, PlatformStats, PositionValuation, account_value, platform_stats, value_positions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Cash credited to every new account.
    pub starting_balance: Decimal,
    /// Upper bound on any single quote lookup or store operation.
    pub io_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_balance: Decimal::from(100_000),
            io_timeout: Duration::from_secs(5),
        }
    }
}

struct LedgerState {
    accounts: AccountRepository,
    transactions: TransactionLog,
}

pub struct Ledger {
    state: RwLock<LedgerState>,
    store: Arc<dyn BlobStore>,
    quotes: Arc<dyn QuoteSource>,
    config: LedgerConfig,
}

impl Ledger {
    /// Hydrate from `store`. Missing blobs start empty; a blob that does not
    /// decode is an error rather than a silent reset.
    pub async fn load(
        store: Arc<dyn BlobStore>,
        quotes: Arc<dyn QuoteSource>,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let limit = config.io_timeout;

        let accounts = match store_call(limit, store.get(USERS_KEY)).await? {
            Some(blob) => AccountRepository::decode(&blob).map_err(|source| StoreError::Codec {
                key: USERS_KEY.to_string(),
                source,
            })?,
            None => AccountRepository::new(),
        };

        let transactions = match store_call(limit, store.get(TRANSACTIONS_KEY)).await? {
            Some(blob) => TransactionLog::decode(&blob).map_err(|source| StoreError::Codec {
                key: TRANSACTIONS_KEY.to_string(),
                source,
            })?,
            None => TransactionLog::new(),
        };

        info!(
            accounts = accounts.len(),
            transactions = transactions.len(),
            "ledger loaded"
        );

        Ok(Self {
            state: RwLock::new(LedgerState {
                accounts,
                transactions,
            }),
            store,
            quotes,
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // --- Accounts ---

    /// Create an admin account if no account exists yet. Returns it when created.
    pub async fn seed_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Option<Account>, LedgerError> {
        if !self.state.read().await.accounts.is_empty() {
            return Ok(None);
        }
        let mut profile = NewAccount::new(email, name, password);
        profile.role = AccountRole::Admin;
        let account = self.create_account(profile).await?;
        info!(user_id = %account.id, "seeded admin account");
        Ok(Some(account))
    }

    pub async fn create_account(&self, profile: NewAccount) -> Result<Account, LedgerError> {
        validate_profile(&profile)?;

        // Cheap duplicate check before paying for the hash; repeated under the write lock.
        if self
            .state
            .read()
            .await
            .accounts
            .find_by_email(&profile.email)
            .is_some()
        {
            return Err(LedgerError::DuplicateEmail(normalize_email(&profile.email)));
        }

        let password_hash = hash_off_thread(profile.password.clone()).await?;

        let mut state = self.state.write().await;
        let mut next = state.accounts.clone();
        let account = next.create(&profile, password_hash, self.config.starting_balance, Utc::now())?;
        self.persist(vec![(USERS_KEY, encode_accounts(&next)?)]).await?;
        state.accounts = next;

        info!(user_id = %account.id, "account created");
        Ok(account)
    }

    /// `Ok(None)` for an unknown email and for a wrong password alike.
    /// A successful login bumps the login counter and last-active time.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let candidate = self
            .state
            .read()
            .await
            .accounts
            .find_by_email(email)
            .map(|a| (a.id, a.password_hash.clone()));

        let Some((id, password_hash)) = candidate else {
            debug!("login rejected");
            return Ok(None);
        };
        if !verify_off_thread(password.to_string(), password_hash).await? {
            debug!("login rejected");
            return Ok(None);
        }

        let mut state = self.state.write().await;
        let mut next = state.accounts.clone();
        let account = match next.record_login(id, Utc::now()) {
            Ok(account) => account,
            // Deleted while the hash was being checked
            Err(LedgerError::AccountNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.persist(vec![(USERS_KEY, encode_accounts(&next)?)]).await?;
        state.accounts = next;

        debug!(user_id = %account.id, "login accepted");
        Ok(Some(account))
    }

    pub async fn set_account_status(
        &self,
        id: AccountId,
        status: AccountStatus,
    ) -> Result<Account, LedgerError> {
        let mut state = self.state.write().await;
        let mut next = state.accounts.clone();
        let account = next.set_status(id, status)?;
        self.persist(vec![(USERS_KEY, encode_accounts(&next)?)]).await?;
        state.accounts = next;

        info!(user_id = %id, ?status, "account status changed");
        Ok(account)
    }

    /// Returns true if an account was removed. The snapshot is rewritten either
    /// way. The user's transactions stay in the log.
    pub async fn delete_account(&self, id: AccountId) -> Result<bool, LedgerError> {
        let mut state = self.state.write().await;
        let mut next = state.accounts.clone();
        let removed = next.remove(id);
        self.persist(vec![(USERS_KEY, encode_accounts(&next)?)]).await?;
        state.accounts = next;

        if removed {
            info!(user_id = %id, "account deleted");
        }
        Ok(removed)
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.state
            .read()
            .await
            .accounts
            .find(id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    pub async fn list_accounts(&self) -> Vec<Account> {
        self.state.read().await.accounts.list().to_vec()
    }

    // --- Settlement ---

    /// Settle a market order at the current quote and return the logged
    /// transaction. Rejections and store failures change nothing.
    pub async fn settle_trade(
        &self,
        user_id: AccountId,
        symbol: &str,
        side: OrderSide,
        shares: Qty,
    ) -> Result<Transaction, LedgerError> {
        if shares == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        let symbol = normalize_symbol(symbol);
        let quote = self
            .lookup_quote(&symbol)
            .await?
            .ok_or_else(|| LedgerError::UnknownInstrument(symbol.clone()))?;

        let mut state = self.state.write().await;
        let account = state
            .accounts
            .find(user_id)
            .ok_or(LedgerError::AccountNotFound(user_id))?;

        let settlement = match settle(account, &symbol, side, shares, quote.price, Utc::now()) {
            Ok(settlement) => settlement,
            Err(e) => {
                warn!(%user_id, %symbol, %side, shares, error = %e, "trade rejected");
                return Err(e);
            }
        };

        let mut next_accounts = state.accounts.clone();
        next_accounts.replace(settlement.account)?;
        let mut next_log = state.transactions.clone();
        next_log.append(settlement.transaction.clone());

        // Account snapshot first, then the log
        self.persist(vec![
            (USERS_KEY, encode_accounts(&next_accounts)?),
            (TRANSACTIONS_KEY, encode_log(&next_log)?),
        ])
        .await?;
        state.accounts = next_accounts;
        state.transactions = next_log;

        let tx = settlement.transaction;
        info!(
            %user_id,
            symbol = %tx.stock_symbol,
            side = %tx.side,
            shares = tx.shares,
            price = %tx.price,
            total = %tx.total,
            "trade settled"
        );
        Ok(tx)
    }

    // --- Reads ---

    pub async fn get_positions(&self, user_id: AccountId) -> Result<Vec<Position>, LedgerError> {
        let account = self.get_account(user_id).await?;
        Ok(get_positions(&account.portfolio, None))
    }

    /// Positions with live price, market value and unrealized P&L.
    pub async fn get_position_valuations(
        &self,
        user_id: AccountId,
    ) -> Result<Vec<PositionValuation>, LedgerError> {
        let account = self.get_account(user_id).await?;
        let prices = self.prices_for(&account).await?;
        Ok(value_positions(&account, &prices))
    }

    /// Oldest first. An unknown user simply has no transactions.
    pub async fn get_transactions(&self, user_id: AccountId) -> Vec<Transaction> {
        self.state.read().await.transactions.for_user(user_id)
    }

    pub async fn get_all_transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.all().to_vec()
    }

    pub async fn get_account_value(&self, user_id: AccountId) -> Result<AccountValue, LedgerError> {
        let account = self.get_account(user_id).await?;
        let prices = self.prices_for(&account).await?;
        Ok(account_value(&account, &prices))
    }

    pub async fn get_platform_stats(&self) -> PlatformStats {
        let state = self.state.read().await;
        platform_stats(state.accounts.list(), state.transactions.len())
    }

    // --- Quotes ---

    pub async fn quote(&self, symbol: &str) -> Result<Quote, LedgerError> {
        let symbol = normalize_symbol(symbol);
        self.lookup_quote(&symbol)
            .await?
            .ok_or(LedgerError::UnknownInstrument(symbol))
    }

    pub async fn search_quotes(&self, query: &str) -> Result<Vec<Quote>, LedgerError> {
        let limit = self.config.io_timeout;
        Ok(quote_call(limit, self.quotes.search(query)).await?)
    }

    pub async fn list_quotes(&self) -> Result<Vec<Quote>, LedgerError> {
        self.search_quotes("").await
    }

    // --- Internals ---

    async fn lookup_quote(&self, symbol: &str) -> Result<Option<Quote>, LedgerError> {
        let limit = self.config.io_timeout;
        Ok(quote_call(limit, self.quotes.quote(symbol)).await?)
    }

    async fn prices_for(&self, account: &Account) -> Result<HashMap<String, Price>, LedgerError> {
        let mut prices = HashMap::new();
        for pos in &account.portfolio {
            match self.lookup_quote(&pos.stock_symbol).await? {
                Some(quote) => {
                    prices.insert(pos.stock_symbol.clone(), quote.price);
                }
                None => {
                    warn!(user_id = %account.id, symbol = %pos.stock_symbol, "no quote for held symbol; valued at zero");
                }
            }
        }
        Ok(prices)
    }

    async fn persist(&self, entries: Vec<(&str, String)>) -> Result<(), LedgerError> {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        store_call(self.config.io_timeout, self.store.set_many(entries)).await?;
        Ok(())
    }
}

async fn store_call<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

async fn quote_call<T, F>(limit: Duration, fut: F) -> Result<T, QuoteError>
where
    F: Future<Output = Result<T, QuoteError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| QuoteError::Timeout(limit))?
}

fn encode_accounts(accounts: &AccountRepository) -> Result<String, StoreError> {
    accounts.encode().map_err(|source| StoreError::Codec {
        key: USERS_KEY.to_string(),
        source,
    })
}

fn encode_log(log: &TransactionLog) -> Result<String, StoreError> {
    log.encode().map_err(|source| StoreError::Codec {
        key: TRANSACTIONS_KEY.to_string(),
        source,
    })
}

async fn hash_off_thread(password: String) -> Result<String, LedgerError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| LedgerError::Credential(e.to_string()))?
        .map_err(|e| LedgerError::Credential(e.to_string()))
}

async fn verify_off_thread(password: String, password_hash: String) -> Result<bool, LedgerError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| LedgerError::Credential(e.to_string()))
}
