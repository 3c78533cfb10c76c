//! Trade settlement: validate a market order against an account and compute
//! the account and transaction it produces.
//!
//! `settle` is pure. It works on a copy of the account, so a rejected order
//! leaves the caller's state untouched; persisting and committing the result is
//! the ledger's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{LedgerError, QuoteError};
use crate::positions::{add_to_position, reduce_position};
use crate::types::account::Account;
use crate::types::order::{OrderSide, Price, Qty};
use crate::types::transaction::Transaction;

/// A settled order: the account as it must look afterwards, and the log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub account: Account,
    pub transaction: Transaction,
}

/// `shares * price`, rejecting zero shares and amounts outside decimal range.
pub fn order_total(shares: Qty, price: Price) -> Result<Decimal, LedgerError> {
    if shares == 0 {
        return Err(LedgerError::InvalidQuantity);
    }
    Decimal::from(shares)
        .checked_mul(price)
        .ok_or(LedgerError::InvalidQuantity)
}

/// Fill `shares` of `symbol` at `price` for `account`.
///
/// `symbol` must already be normalized. Buys need `cash_balance >= total`;
/// sells need an existing position with at least `shares`. Cumulative invested
/// grows by the buy total and shrinks by the cost basis of shares sold.
/// A non-positive `price` is a faulty quote and rejects the order.
pub fn settle(
    account: &Account,
    symbol: &str,
    side: OrderSide,
    shares: Qty,
    price: Price,
    now: DateTime<Utc>,
) -> Result<Settlement, LedgerError> {
    if price <= Decimal::ZERO {
        return Err(QuoteError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        }
        .into());
    }
    let total = order_total(shares, price)?;
    let mut next = account.clone();

    match side {
        OrderSide::Buy => {
            if next.cash_balance < total {
                return Err(LedgerError::InsufficientFunds {
                    required: total,
                    available: next.cash_balance,
                });
            }
            next.cash_balance -= total;

            let opened = add_to_position(&mut next.portfolio, symbol, shares, price, total)?;
            if opened && !next.stocks_owned.iter().any(|s| s == symbol) {
                next.stocks_owned.push(symbol.to_string());
            }
            next.total_invested += total;
        }
        OrderSide::Sell => {
            let reduction = reduce_position(&mut next.portfolio, symbol, shares)?;
            next.cash_balance = next
                .cash_balance
                .checked_add(total)
                .ok_or(LedgerError::InvalidQuantity)?;
            if reduction.closed {
                next.stocks_owned.retain(|s| s != symbol);
            }
            next.total_invested -= reduction.cost_basis;
        }
    }

    let transaction = Transaction {
        id: Uuid::new_v4(),
        user_id: account.id,
        stock_symbol: symbol.to_string(),
        side,
        shares,
        price,
        timestamp: now,
        total,
    };

    Ok(Settlement {
        account: next,
        transaction,
    })
}
