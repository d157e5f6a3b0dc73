//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use kraken_types::{Decimal, FieldSchema, Location, ModelResult, ModelSchema};

use crate::request::Request;
use crate::transport::Method;

static SPREAD_LIST: ModelSchema = ModelSchema::new(
    "SpreadListRequest",
    &[
        FieldSchema::char("pair").required().location(Location::Path),
        FieldSchema::decimal("since").location(Location::Path),
    ],
);

static TICKER_SHOW: ModelSchema = ModelSchema::new(
    "TickerShowRequest",
    &[FieldSchema::char("pair").location(Location::Body)],
);

request_model!(
    /// Recent spreads for a pair
    SpreadListRequest,
    SPREAD_LIST
);

impl SpreadListRequest {
    pub fn with_pair(mut self, pair: &str) -> ModelResult<Self> {
        self.model.set("pair", pair)?;
        Ok(self)
    }

    /// Only return spreads after `since`
    pub fn with_since(mut self, since: Decimal) -> ModelResult<Self> {
        self.model.set("since", since)?;
        Ok(self)
    }
}

impl Request for SpreadListRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Get)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/public/Trades")
    }

    fn authenticate(&self) -> bool {
        false
    }

    fn factory_response(&self) -> Option<String> {
        Some(
            r#"{
  "error": [],
  "result": {
    "error": [],
    "result": {
      "XXBTZUSD": [
        [1688671834, "30292.10000", "30297.50000"],
        [1688671834, "30292.10000", "30296.70000"],
        [1688671834, "30292.70000", "30296.70000"]
      ],
      "last": 1688672106
    }
  }
}"#
            .to_string(),
        )
    }
}

request_model!(
    /// Ticker information for one or more pairs
    TickerShowRequest,
    TICKER_SHOW
);

impl TickerShowRequest {
    /// Restrict to a pair (comma-separate several)
    pub fn with_pair(mut self, pair: &str) -> ModelResult<Self> {
        self.model.set("pair", pair)?;
        Ok(self)
    }
}

impl Request for TickerShowRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/public/Ticker")
    }

    fn authenticate(&self) -> bool {
        false
    }

    fn factory_response(&self) -> Option<String> {
        Some(
            r#"{
  "error": [],
  "result": {
    "XXBTZUSD": {
      "a": ["30300.10000", "1", "1.000"],
      "b": ["30300.00000", "1", "1.000"],
      "c": ["30303.20000", "0.00067643"],
      "v": ["4083.67001100", "4412.73601799"],
      "p": ["30706.77771", "30689.13205"],
      "t": [34619, 38907],
      "l": ["29868.30000", "29868.30000"],
      "h": ["31631.00000", "31631.00000"],
      "o": "30502.80000"
    }
  }
}"#
            .to_string(),
        )
    }
}
