use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::position::Position;

pub type AccountId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Admin,
    #[default]
    Trader,
}

/// A registered user with cash, holdings and login bookkeeping.
///
/// `stocks_owned` mirrors the symbols in `portfolio` and is kept in sync by
/// settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub role: AccountRole,
    pub last_active: DateTime<Utc>,
    pub login_count: u64,
    pub cash_balance: Decimal,
    pub total_invested: Decimal,
    pub stocks_owned: Vec<String>,
    pub portfolio: Vec<Position>,
}

impl Account {
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.portfolio.iter().find(|p| p.stock_symbol == symbol)
    }

    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }
}

/// Registration payload. The password is hashed before it reaches the repository.
#[derive(Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub role: AccountRole,
}

impl NewAccount {
    pub fn new(email: impl Into<String>, name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            status: AccountStatus::Active,
            role: AccountRole::Trader,
        }
    }
}

/// Account as shown to API callers: everything except the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub status: AccountStatus,
    pub role: AccountRole,
    pub last_active: DateTime<Utc>,
    pub login_count: u64,
    pub cash_balance: Decimal,
    pub total_invested: Decimal,
    pub stocks_owned: Vec<String>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            status: account.status,
            role: account.role,
            last_active: account.last_active,
            login_count: account.login_count,
            cash_balance: account.cash_balance,
            total_invested: account.total_invested,
            stocks_owned: account.stocks_owned.clone(),
        }
    }
}
