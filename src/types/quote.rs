use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::order::Price;

/// Point-in-time price snapshot for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Price,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<Decimal>,
}
