//! Account repository: the in-memory, insertion-ordered set of user records.
//!
//! Mutations here only touch memory. `Ledger` applies them to a copy,
//! persists the copy's snapshot and only then swaps it in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::types::account::{Account, AccountId, AccountStatus, NewAccount};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRepository {
    accounts: Vec<Account>,
}

/// Emails are compared trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration checks: an email with an `@`, a name, and a password of at
/// least `MIN_PASSWORD_LEN` characters.
pub fn validate_profile(profile: &NewAccount) -> Result<(), LedgerError> {
    let email = profile.email.trim();
    if email.is_empty() {
        return Err(LedgerError::InvalidProfile("email is required".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(LedgerError::InvalidProfile(format!(
                "'{email}' is not a valid email address"
            )));
        }
    }
    if profile.name.trim().is_empty() {
        return Err(LedgerError::InvalidProfile("name is required".to_string()));
    }
    if profile.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LedgerError::InvalidProfile(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl AccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(blob: &str) -> Result<Self, serde_json::Error> {
        let accounts: Vec<Account> = serde_json::from_str(blob)?;
        Ok(Self { accounts })
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.accounts)
    }

    pub fn find(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Account> {
        let email = normalize_email(email);
        self.accounts.iter().find(|a| a.email == email)
    }

    pub fn list(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Insert a new account funded with `starting_balance`. The profile must
    /// already be validated and its password hashed into `password_hash`.
    pub fn create(
        &mut self,
        profile: &NewAccount,
        password_hash: String,
        starting_balance: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Account, LedgerError> {
        let email = normalize_email(&profile.email);
        if self.find_by_email(&email).is_some() {
            return Err(LedgerError::DuplicateEmail(email));
        }

        // Ids are never reused
        let mut id = Uuid::new_v4();
        while self.find(id).is_some() {
            id = Uuid::new_v4();
        }

        let account = Account {
            id,
            email,
            name: profile.name.trim().to_string(),
            password_hash,
            status: profile.status,
            role: profile.role,
            last_active: now,
            login_count: 0,
            cash_balance: starting_balance,
            total_invested: Decimal::ZERO,
            stocks_owned: Vec::new(),
            portfolio: Vec::new(),
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    pub fn set_status(&mut self, id: AccountId, status: AccountStatus) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.status = status;
        Ok(account.clone())
    }

    /// Bump the login counter and last-active time after a verified login.
    pub fn record_login(&mut self, id: AccountId, now: DateTime<Utc>) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.login_count += 1;
        account.last_active = now;
        Ok(account.clone())
    }

    /// Swap in the post-settlement version of an existing account.
    pub fn replace(&mut self, account: Account) -> Result<(), LedgerError> {
        let slot = self
            .accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or(LedgerError::AccountNotFound(account.id))?;
        *slot = account;
        Ok(())
    }

    /// Returns true if a record was removed.
    pub fn remove(&mut self, id: AccountId) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|a| a.id != id);
        self.accounts.len() < before
    }
}
