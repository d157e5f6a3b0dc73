//! Funding endpoints (deposits and withdrawals)
//!
//! The withdrawal endpoints are served from `/private/Withdraw`, without the
//! `/0` version prefix the other private endpoints use.

use kraken_types::{Decimal, FieldSchema, Location, ModelResult, ModelSchema};

use crate::request::Request;
use crate::transport::Method;

/// Page size used when none is given
const DEFAULT_WITHDRAWAL_PAGE: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

static DEPOSIT_METHOD_LIST: ModelSchema = ModelSchema::new(
    "DepositMethodListRequest",
    &[FieldSchema::char("txid").location(Location::Body)],
);

static WITHDRAWAL_CREATE: ModelSchema = ModelSchema::new(
    "WithdrawalCreateRequest",
    &[
        FieldSchema::decimal("nonce").required(),
        FieldSchema::char("asset").required(),
        FieldSchema::char("key").required(),
        FieldSchema::char("address"),
        FieldSchema::char("amount").required(),
        FieldSchema::char("max_fee").required(),
    ],
);

static WITHDRAWAL_LIST: ModelSchema = ModelSchema::new(
    "WithdrawalListRequest",
    &[
        FieldSchema::decimal("nonce").required().location(Location::Header),
        FieldSchema::char("asset").location(Location::Query),
        FieldSchema::char("aclass")
            .default_text("currency")
            .location(Location::Query),
        FieldSchema::char("method").location(Location::Query),
        FieldSchema::char("start").location(Location::Query),
        FieldSchema::char("end").location(Location::Query),
        FieldSchema::bool("cursor").location(Location::Query),
        FieldSchema::decimal("limit")
            .default_decimal(DEFAULT_WITHDRAWAL_PAGE)
            .location(Location::Query),
    ],
);

request_model!(
    /// Deposit methods available for an asset
    DepositMethodListRequest,
    DEPOSIT_METHOD_LIST
);

impl Request for DepositMethodListRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Get)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/DepositMethods")
    }
}

request_model!(
    /// Withdraw funds to a pre-configured withdrawal key
    WithdrawalCreateRequest,
    WITHDRAWAL_CREATE
);

impl WithdrawalCreateRequest {
    /// Build a withdrawal of `amount` of `asset` to the withdrawal key `key`
    pub fn with_withdrawal(
        mut self,
        asset: &str,
        key: &str,
        amount: &str,
        max_fee: &str,
    ) -> ModelResult<Self> {
        self.model.set("asset", asset)?;
        self.model.set("key", key)?;
        self.model.set("amount", amount)?;
        self.model.set("max_fee", max_fee)?;
        Ok(self)
    }

    /// Confirm the address the key points to
    pub fn with_address(mut self, address: &str) -> ModelResult<Self> {
        self.model.set("address", address)?;
        Ok(self)
    }
}

impl Request for WithdrawalCreateRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Get)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/private/Withdraw")
    }

    fn factory_response(&self) -> Option<String> {
        Some(r#"{"error": [], "result": {"refid": "FTQcuak-V6Za8qrWnhzTx67yYHz8Tg"}}"#.to_string())
    }
}

request_model!(
    /// Recent withdrawals, optionally filtered
    WithdrawalListRequest,
    WITHDRAWAL_LIST
);

impl WithdrawalListRequest {
    pub fn with_asset(mut self, asset: &str) -> ModelResult<Self> {
        self.model.set("asset", asset)?;
        Ok(self)
    }

    /// Enable the paginated response
    pub fn with_cursor(mut self, cursor: bool) -> ModelResult<Self> {
        self.model.set("cursor", cursor)?;
        Ok(self)
    }
}

impl Request for WithdrawalListRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/private/Withdraw")
    }

    fn factory_response(&self) -> Option<String> {
        Some(
            r#"{
  "error": [],
  "result": [
    {
      "method": "Bitcoin",
      "aclass": "currency",
      "asset": "XXBT",
      "refid": "FTQcuak-V6Za8qrWnhzTx67yYHz8Tg",
      "txid": "29323ce235cee8dae22503caba7....8ad3a506879a03b1e87992923d80428",
      "info": "bc1qm32pq....3ewt0j37s2g",
      "amount": "0.72485000",
      "fee": "0.00020000",
      "time": 1688014586,
      "status": "Pending",
      "key": "btc-wallet-1"
    },
    {
      "method": "Bitcoin",
      "aclass": "currency",
      "asset": "XXBT",
      "refid": "FTQcuak-V6Za8qrPnhsTx47yYLz8Tg",
      "txid": "29323ce212ceb2daf81255cbea8a5...ad7a626471e05e1f82929501e82934",
      "info": "bc1qa35ls....3egf0872h3w",
      "amount": "0.72485000",
      "fee": "0.00020000",
      "time": 1688015423,
      "status": "Failure",
      "status-prop": "canceled",
      "key": "btc-wallet-2"
    }
  ]
}"#
            .to_string(),
        )
    }
}
