use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::account::AccountId;
use crate::types::order::{OrderSide, Price, Qty};

/// A settled trade. Never edited or removed once appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: AccountId,
    pub stock_symbol: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub shares: Qty,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
    pub total: Decimal,
}
