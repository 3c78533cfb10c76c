//! Derived views: account value, per-position valuation and platform stats.
//! Always recomputed from current state and prices, never stored.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::positions::{market_value, unrealized_pnl};
use crate::types::account::{Account, AccountStatus};
use crate::types::order::{Price, Qty};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountValue {
    pub cash_balance: Decimal,
    pub total_invested: Decimal,
    pub portfolio_value: Decimal,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub stock_symbol: String,
    pub shares: Qty,
    pub avg_purchase_price: Price,
    pub total_invested: Decimal,
    /// `None` when the quote source no longer lists the symbol.
    pub current_price: Option<Price>,
    pub market_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: usize,
    pub active_users: usize,
    pub total_invested: Decimal,
    pub total_transactions: usize,
}

/// Cash plus the market value of every position with a known price.
/// Positions missing from `prices` contribute nothing.
pub fn account_value(account: &Account, prices: &HashMap<String, Price>) -> AccountValue {
    let portfolio_value: Decimal = account
        .portfolio
        .iter()
        .filter_map(|pos| prices.get(&pos.stock_symbol).map(|&p| market_value(pos, p)))
        .sum();

    AccountValue {
        cash_balance: account.cash_balance,
        total_invested: account.total_invested,
        portfolio_value,
        total_value: account.cash_balance + portfolio_value,
    }
}

pub fn value_positions(account: &Account, prices: &HashMap<String, Price>) -> Vec<PositionValuation> {
    account
        .portfolio
        .iter()
        .map(|pos| {
            let current_price = prices.get(&pos.stock_symbol).copied();
            PositionValuation {
                stock_symbol: pos.stock_symbol.clone(),
                shares: pos.shares,
                avg_purchase_price: pos.avg_purchase_price,
                total_invested: pos.total_invested,
                current_price,
                market_value: current_price.map(|p| market_value(pos, p)),
                unrealized_pnl: current_price.map(|p| unrealized_pnl(pos, p)),
            }
        })
        .collect()
}

pub fn platform_stats(accounts: &[Account], total_transactions: usize) -> PlatformStats {
    PlatformStats {
        total_users: accounts.len(),
        active_users: accounts
            .iter()
            .filter(|a| a.status == AccountStatus::Active)
            .count(),
        total_invested: accounts.iter().map(|a| a.total_invested).sum(),
        total_transactions,
    }
}
