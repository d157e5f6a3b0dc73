//! Trade history endpoint

use kraken_types::{Decimal, FieldSchema, Location, ModelResult, ModelSchema};

use crate::request::Request;
use crate::transport::Method;

static TRADE_LIST: ModelSchema = ModelSchema::new(
    "TradeListRequest",
    &[
        FieldSchema::char("pair").required().location(Location::Path),
        FieldSchema::decimal("since").location(Location::Path),
        FieldSchema::decimal("count")
            .min(Decimal::ONE)
            .max(Decimal::ONE_THOUSAND)
            .location(Location::Path),
    ],
);

request_model!(
    /// Trade history for a pair
    TradeListRequest,
    TRADE_LIST
);

impl TradeListRequest {
    pub fn with_pair(mut self, pair: &str) -> ModelResult<Self> {
        self.model.set("pair", pair)?;
        Ok(self)
    }

    /// Number of trades to return, between 1 and 1000
    pub fn with_count(mut self, count: u32) -> ModelResult<Self> {
        self.model.set("count", count)?;
        Ok(self)
    }
}

impl Request for TradeListRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Get)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/TradesHistory")
    }

    fn factory_response(&self) -> Option<String> {
        Some(
            r#"{
  "error": [],
  "result": {
    "XXBTZUSD": [
      ["30243.40000", "0.34507674", 1688669597.8277369, "b", "m", "", 61044952],
      ["30243.30000", "0.00376960", 1688669598.2804112, "s", "l", "", 61044953],
      ["30243.30000", "0.01235716", 1688669602.698379, "s", "m", "", 61044956]
    ],
    "last": "1688671969993150842"
  }
}"#
            .to_string(),
        )
    }
}
