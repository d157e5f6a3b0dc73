//! Typed results for [`ApiClient::submit_as`](crate::ApiClient::submit_as)

use rust_decimal::Decimal;
use serde::Deserialize;

// ============================================================================
// Market Data Types
// ============================================================================

/// One pair's entry in the `Ticker` result
///
/// Price arrays keep the exchange's text so no precision is lost; the
/// accessors parse the leading element.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerInfo {
    /// `[price, whole lot volume, lot volume]`
    #[serde(rename = "a")]
    pub ask: Vec<String>,
    /// `[price, whole lot volume, lot volume]`
    #[serde(rename = "b")]
    pub bid: Vec<String>,
    /// `[price, lot volume]` of the last trade
    #[serde(rename = "c")]
    pub last_trade: Vec<String>,
    /// `[today, last 24 hours]`
    #[serde(rename = "v")]
    pub volume: Vec<String>,
    #[serde(rename = "p")]
    pub vwap: Vec<String>,
    #[serde(rename = "t")]
    pub trade_count: Vec<u64>,
    #[serde(rename = "l")]
    pub low: Vec<String>,
    #[serde(rename = "h")]
    pub high: Vec<String>,
    #[serde(rename = "o")]
    pub open: String,
}

fn leading_decimal(values: &[String]) -> Option<Decimal> {
    values.first()?.parse().ok()
}

impl TickerInfo {
    pub fn ask_price(&self) -> Option<Decimal> {
        leading_decimal(&self.ask)
    }

    pub fn bid_price(&self) -> Option<Decimal> {
        leading_decimal(&self.bid)
    }

    pub fn last_price(&self) -> Option<Decimal> {
        leading_decimal(&self.last_trade)
    }

    /// Ask minus bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.ask_price()? - self.bid_price()?)
    }
}

// ============================================================================
// Funding Types
// ============================================================================

/// Reference to a submitted withdrawal
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRef {
    pub refid: String,
}

/// One entry of the recent withdrawals list
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalInfo {
    pub method: String,
    pub aclass: String,
    pub asset: String,
    pub refid: String,
    pub txid: String,
    pub info: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fee: Decimal,
    /// Unix timestamp
    pub time: u64,
    pub status: String,
    /// Additional status, e.g. `canceled`
    #[serde(rename = "status-prop", default)]
    pub status_prop: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}
