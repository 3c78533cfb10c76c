//! Position tracking: add_to_position, reduce_position, get_positions, unrealized_pnl.
//! Pure functions over an account's portfolio; testable without a ledger.

use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::types::order::{Price, Qty};
use crate::types::position::Position;

/// Outcome of a sell leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reduction {
    /// Shares sold valued at the position's average purchase price.
    pub cost_basis: Decimal,
    /// The position reached zero shares and was removed.
    pub closed: bool,
}

/// Apply a buy leg of `shares` at `price`, where `total = shares * price`.
/// Adds to an existing position using a weighted average, or opens a new one.
/// Returns true when a new position was opened. A share count or invested
/// amount that would overflow is rejected as `InvalidQuantity`.
pub fn add_to_position(
    portfolio: &mut Vec<Position>,
    symbol: &str,
    shares: Qty,
    price: Price,
    total: Decimal,
) -> Result<bool, LedgerError> {
    match portfolio.iter_mut().find(|p| p.stock_symbol == symbol) {
        Some(pos) => {
            let new_shares = pos
                .shares
                .checked_add(shares)
                .ok_or(LedgerError::InvalidQuantity)?;
            let new_invested = pos
                .total_invested
                .checked_add(total)
                .ok_or(LedgerError::InvalidQuantity)?;
            // Weighted by invested amount, not a mean of fill prices
            pos.avg_purchase_price = new_invested / Decimal::from(new_shares);
            pos.shares = new_shares;
            pos.total_invested = new_invested;
            Ok(false)
        }
        None => {
            portfolio.push(Position {
                stock_symbol: symbol.to_string(),
                shares,
                avg_purchase_price: price,
                total_invested: total,
            });
            Ok(true)
        }
    }
}

/// Apply a sell leg of `shares`. The average price is unchanged; invested is
/// recomputed for the remainder. Removes the position when it reaches zero.
pub fn reduce_position(
    portfolio: &mut Vec<Position>,
    symbol: &str,
    shares: Qty,
) -> Result<Reduction, LedgerError> {
    let index = portfolio
        .iter()
        .position(|p| p.stock_symbol == symbol)
        .ok_or_else(|| LedgerError::PositionNotFound(symbol.to_string()))?;

    let pos = &mut portfolio[index];
    if pos.shares < shares {
        return Err(LedgerError::InsufficientShares {
            symbol: symbol.to_string(),
            requested: shares,
            held: pos.shares,
        });
    }

    let cost_basis = Decimal::from(shares) * pos.avg_purchase_price;
    let remaining = pos.shares - shares;

    if remaining == 0 {
        portfolio.remove(index);
        return Ok(Reduction {
            cost_basis,
            closed: true,
        });
    }

    pos.shares = remaining;
    pos.total_invested = pos.avg_purchase_price * Decimal::from(remaining);
    Ok(Reduction {
        cost_basis,
        closed: false,
    })
}

/// Returns positions, optionally filtered by symbol (case-insensitive).
pub fn get_positions(portfolio: &[Position], symbol_filter: Option<&str>) -> Vec<Position> {
    let symbol_upper = symbol_filter.map(|s| s.trim().to_uppercase());
    portfolio
        .iter()
        .filter(|pos| symbol_upper.as_ref().is_none_or(|s| &pos.stock_symbol == s))
        .cloned()
        .collect()
}

/// Market value at `current_price`.
pub fn market_value(position: &Position, current_price: Price) -> Decimal {
    Decimal::from(position.shares) * current_price
}

/// Unrealized P&L: (current_price - average_price) * shares.
pub fn unrealized_pnl(position: &Position, current_price: Price) -> Decimal {
    (current_price - position.avg_purchase_price) * Decimal::from(position.shares)
}
