//! Quote source: the read-only price feed trades settle against.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::QuoteError;
use crate::types::order::{Price, normalize_symbol};
use crate::types::quote::Quote;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Current quote for `symbol`, or `None` if the instrument is not listed.
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, QuoteError>;

    /// Case-insensitive substring match on symbol or name. An empty query
    /// returns the whole catalog.
    async fn search(&self, query: &str) -> Result<Vec<Quote>, QuoteError>;
}

/// Fixed in-process catalog. Prices only move through `set_price`.
#[derive(Debug, Default)]
pub struct StaticQuoteSource {
    quotes: RwLock<Vec<Quote>>,
}

impl StaticQuoteSource {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            quotes: RwLock::new(quotes),
        }
    }

    /// The eight large-cap US equities the platform lists by default.
    pub fn with_default_catalog() -> Self {
        Self::new(default_catalog())
    }

    /// Replace the price of a listed symbol. Returns false if it is not listed.
    pub async fn set_price(&self, symbol: &str, price: Price) -> bool {
        let symbol = normalize_symbol(symbol);
        let mut guard = self.quotes.write().await;
        match guard.iter_mut().find(|q| q.symbol == symbol) {
            Some(quote) => {
                quote.price = price;
                true
            }
            None => false,
        }
    }

    /// Add or replace a listing.
    pub async fn upsert(&self, quote: Quote) {
        let mut guard = self.quotes.write().await;
        match guard.iter_mut().find(|q| q.symbol == quote.symbol) {
            Some(existing) => *existing = quote,
            None => guard.push(quote),
        }
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, QuoteError> {
        let symbol = normalize_symbol(symbol);
        let guard = self.quotes.read().await;
        Ok(guard.iter().find(|q| q.symbol == symbol).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<Quote>, QuoteError> {
        let needle = query.trim().to_lowercase();
        let guard = self.quotes.read().await;
        Ok(guard
            .iter()
            .filter(|q| {
                q.symbol.to_lowercase().contains(&needle) || q.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    symbol: &str,
    name: &str,
    price: Decimal,
    change: Decimal,
    change_percent: Decimal,
    volume: &str,
    market_cap: &str,
    pe_ratio: Decimal,
    dividend_yield: Decimal,
) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price,
        change,
        change_percent,
        volume: volume.to_string(),
        market_cap: Some(market_cap.to_string()),
        pe_ratio: Some(pe_ratio),
        dividend_yield: Some(dividend_yield),
    }
}

// Decimal::new(mantissa, scale): 17845 with scale 2 is 178.45.
pub fn default_catalog() -> Vec<Quote> {
    let d = Decimal::new;
    vec![
        listing("AAPL", "Apple Inc.", d(17845, 2), d(234, 2), d(133, 2), "54.2M", "2.8T", d(295, 1), d(5, 1)),
        listing("GOOGL", "Alphabet Inc.", d(14267, 2), d(-123, 2), d(-85, 2), "32.1M", "1.7T", d(253, 1), d(0, 0)),
        listing("MSFT", "Microsoft Corp.", d(41289, 2), d(567, 2), d(139, 2), "28.5M", "3.1T", d(352, 1), d(7, 1)),
        listing("TSLA", "Tesla Inc.", d(24832, 2), d(-345, 2), d(-137, 2), "92.3M", "790B", d(681, 1), d(0, 0)),
        listing("AMZN", "Amazon.com Inc.", d(17891, 2), d(412, 2), d(236, 2), "45.6M", "1.8T", d(628, 1), d(0, 0)),
        listing("NVDA", "NVIDIA Corp.", d(49522, 2), d(845, 2), d(174, 2), "67.8M", "1.2T", d(724, 1), d(5, 2)),
        listing("META", "Meta Platforms Inc.", d(51215, 2), d(-218, 2), d(-42, 2), "23.4M", "1.3T", d(321, 1), d(0, 0)),
        listing("NFLX", "Netflix Inc.", d(62341, 2), d(1234, 2), d(202, 2), "12.7M", "270B", d(356, 1), d(0, 0)),
    ]
}
