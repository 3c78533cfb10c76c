use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::order::{Price, Qty};

/// Holding of one instrument inside an account. Only exists while `shares > 0`.
///
/// `total_invested` is carried as its own field rather than derived from
/// `shares * avg_purchase_price`, so the persisted value is exactly what the
/// last fill produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub stock_symbol: String,
    pub shares: Qty,
    pub avg_purchase_price: Price,
    pub total_invested: Decimal,
}
