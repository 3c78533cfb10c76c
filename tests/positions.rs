//! Position tracking: add_to_position, reduce_position, get_positions, unrealized_pnl.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stock_ledger::error::LedgerError;
use stock_ledger::positions::{
    add_to_position, get_positions, market_value, reduce_position, unrealized_pnl,
};
use stock_ledger::types::position::Position;

fn buy(portfolio: &mut Vec<Position>, symbol: &str, shares: u64, price: Decimal) -> bool {
    add_to_position(portfolio, symbol, shares, price, Decimal::from(shares) * price).unwrap()
}

#[test]
fn add_to_position_opens_new_position() {
    let mut portfolio = Vec::new();

    let opened = buy(&mut portfolio, "AAPL", 10, dec!(178.45));

    assert!(opened);
    assert_eq!(portfolio.len(), 1);
    assert_eq!(portfolio[0].stock_symbol, "AAPL");
    assert_eq!(portfolio[0].shares, 10);
    assert_eq!(portfolio[0].avg_purchase_price, dec!(178.45));
    assert_eq!(portfolio[0].total_invested, dec!(1784.50));
}

#[test]
fn add_to_position_weighted_average() {
    let mut portfolio = Vec::new();

    buy(&mut portfolio, "MSFT", 10, dec!(100));
    let opened = buy(&mut portfolio, "MSFT", 5, dec!(130));

    assert!(!opened);
    assert_eq!(portfolio.len(), 1);
    assert_eq!(portfolio[0].shares, 15);
    assert_eq!(portfolio[0].total_invested, dec!(1650));
    assert_eq!(portfolio[0].avg_purchase_price, dec!(110));
}

#[test]
fn add_to_position_rejects_share_overflow() {
    let mut portfolio = Vec::new();
    add_to_position(&mut portfolio, "AAPL", u64::MAX, dec!(0.01), dec!(1)).unwrap();
    let before = portfolio.clone();

    let err = add_to_position(&mut portfolio, "AAPL", 1, dec!(0.01), dec!(0.01)).unwrap_err();

    assert!(matches!(err, LedgerError::InvalidQuantity));
    assert_eq!(portfolio, before);
}

#[test]
fn reduce_position_keeps_average_and_rescales_invested() {
    let mut portfolio = Vec::new();
    buy(&mut portfolio, "MSFT", 10, dec!(100));
    buy(&mut portfolio, "MSFT", 5, dec!(130));

    let reduction = reduce_position(&mut portfolio, "MSFT", 5).unwrap();

    assert!(!reduction.closed);
    assert_eq!(reduction.cost_basis, dec!(550));
    assert_eq!(portfolio[0].shares, 10);
    assert_eq!(portfolio[0].avg_purchase_price, dec!(110));
    assert_eq!(portfolio[0].total_invested, dec!(1100));
}

#[test]
fn reduce_position_to_zero_removes_it() {
    let mut portfolio = Vec::new();
    buy(&mut portfolio, "TSLA", 4, dec!(248.32));
    buy(&mut portfolio, "NVDA", 1, dec!(495.22));

    let reduction = reduce_position(&mut portfolio, "TSLA", 4).unwrap();

    assert!(reduction.closed);
    assert_eq!(reduction.cost_basis, dec!(993.28));
    assert_eq!(portfolio.len(), 1);
    assert_eq!(portfolio[0].stock_symbol, "NVDA");
}

#[test]
fn reduce_position_rejects_oversell_without_changes() {
    let mut portfolio = Vec::new();
    buy(&mut portfolio, "AAPL", 3, dec!(178.45));
    let before = portfolio.clone();

    let err = reduce_position(&mut portfolio, "AAPL", 4).unwrap_err();

    assert!(matches!(
        err,
        LedgerError::InsufficientShares { requested: 4, held: 3, .. }
    ));
    assert_eq!(portfolio, before);
}

#[test]
fn reduce_position_without_holding_fails() {
    let mut portfolio = Vec::new();

    let err = reduce_position(&mut portfolio, "GOOGL", 1).unwrap_err();

    assert!(matches!(err, LedgerError::PositionNotFound(s) if s == "GOOGL"));
}

#[test]
fn get_positions_filter_by_symbol() {
    let mut portfolio = Vec::new();
    buy(&mut portfolio, "AAPL", 1, dec!(178.45));
    buy(&mut portfolio, "META", 2, dec!(512.15));

    assert_eq!(get_positions(&portfolio, None).len(), 2);

    let filtered = get_positions(&portfolio, Some("meta"));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].stock_symbol, "META");

    assert!(get_positions(&portfolio, Some("NFLX")).is_empty());
}

#[test]
fn market_value_and_unrealized_pnl() {
    let mut portfolio = Vec::new();
    buy(&mut portfolio, "AMZN", 10, dec!(170));

    assert_eq!(market_value(&portfolio[0], dec!(178.91)), dec!(1789.10));
    assert_eq!(unrealized_pnl(&portfolio[0], dec!(178.91)), dec!(89.10));
    assert_eq!(unrealized_pnl(&portfolio[0], dec!(160)), dec!(-100));
}
