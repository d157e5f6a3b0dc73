//! Order endpoints
//!
//! All of these require authentication. Batch items and their close orders
//! are child requests: they only exist inside an [`OrderAddBatchRequest`].

use kraken_types::{FieldKind, FieldSchema, Location, ModelResult, ModelSchema, Value};

use crate::error::RestResult;
use crate::request::{gen_tx_id, verify_structure, Request};
use crate::transport::Method;

static ORDER_LIST: ModelSchema = ModelSchema::new(
    "OrderListRequest",
    &[
        FieldSchema::bool("include_trades")
            .required()
            .location(Location::Body)
            .default_bool(false)
            .alias("trades"),
        FieldSchema::decimal("userref").location(Location::Body),
        FieldSchema::decimal("start").location(Location::Body),
        FieldSchema::decimal("end").location(Location::Body),
        FieldSchema::decimal("ofs").location(Location::Body),
        FieldSchema::enumerated("close_time", &["open", "close", "both"])
            .location(Location::Body)
            .alias("closetime"),
        FieldSchema::bool("consolidate_taker")
            .location(Location::Body)
            .default_bool(true),
        FieldSchema::char("pair").required().location(Location::Body),
    ],
);

static ORDER_CANCEL: ModelSchema = ModelSchema::new(
    "OrderCancelRequest",
    &[FieldSchema::char("transaction_id").alias("txid")],
);

static ORDER_EDIT: ModelSchema = ModelSchema::new(
    "OrderEditRequest",
    &[FieldSchema::char("transaction_id").alias("txid")],
);

static ORDER_BATCH_ITEM_CLOSE: ModelSchema = ModelSchema::new(
    "OrderBatchItemCloseRequest",
    &[
        FieldSchema::char("order_type").alias("ordertype"),
        FieldSchema::char("price"),
    ],
);

static ORDER_ADD_BATCH_ITEM: ModelSchema = ModelSchema::new(
    "OrderAddBatchItemRequest",
    &[
        FieldSchema::char("userref").location(Location::Body),
        FieldSchema::char("ordertype").location(Location::Body),
        FieldSchema::char("type").location(Location::Body),
        FieldSchema::char("volume").location(Location::Body),
        FieldSchema::char("displayvol").location(Location::Body),
        FieldSchema::char("pair").location(Location::Body),
        FieldSchema::char("price").location(Location::Body),
        FieldSchema::char("price2").location(Location::Body),
        FieldSchema::char("trigger").location(Location::Body),
        FieldSchema::char("reduce_only").location(Location::Body),
        FieldSchema::char("stptype").location(Location::Body),
        FieldSchema::char("oflags").location(Location::Body),
        FieldSchema::char("timeinforce").location(Location::Body),
        FieldSchema::char("starttm").location(Location::Body),
        FieldSchema::char("expiretm").location(Location::Body),
        FieldSchema::char("deadline").location(Location::Body),
        FieldSchema::char("validate").location(Location::Body),
        FieldSchema::model("close", &ORDER_BATCH_ITEM_CLOSE).location(Location::Body),
    ],
);

static BATCH_ITEM_KIND: FieldKind = FieldKind::Model(&ORDER_ADD_BATCH_ITEM);

static ORDER_ADD_BATCH: ModelSchema = ModelSchema::new(
    "OrderAddBatchRequest",
    &[
        FieldSchema::char("pair").location(Location::Body),
        FieldSchema::list("orders", &BATCH_ITEM_KIND).location(Location::Body),
    ],
);

const CLOSED_ORDERS_TEMPLATE: &str = r#"{
  "error": [],
  "result": {
    "closed": {
      "{first}": {
        "refid": "None",
        "userref": 1,
        "status": "canceled",
        "reason": "User requested",
        "opentm": 1688148493.7708,
        "closetm": 1688148610.0482,
        "starttm": 0,
        "expiretm": 0,
        "descr": {
          "pair": "XBTGBP",
          "type": "buy",
          "ordertype": "stop-loss-limit",
          "price": "23667.0",
          "price2": "0",
          "leverage": "none",
          "order": "buy 0.00100000 XBTGBP @ limit 23667.0",
          "close": ""
        },
        "vol": "0.00100000",
        "vol_exec": "0.00000000",
        "cost": "0.00000",
        "fee": "0.00000",
        "price": "0.00000",
        "stopprice": "0.00000",
        "limitprice": "0.00000",
        "misc": "",
        "oflags": "fciq",
        "trigger": "index"
      },
      "{second}": {
        "refid": "None",
        "userref": 36493663,
        "status": "canceled",
        "reason": "User requested",
        "opentm": 1688148493.7708,
        "closetm": 1688148610.0477,
        "starttm": 0,
        "expiretm": 0,
        "descr": {
          "pair": "XBTEUR",
          "type": "buy",
          "ordertype": "take-profit-limit",
          "price": "27743.0",
          "price2": "0",
          "leverage": "none",
          "order": "buy 0.00100000 XBTEUR @ limit 27743.0",
          "close": ""
        },
        "vol": "0.00100000",
        "vol_exec": "0.00000000",
        "cost": "0.00000",
        "fee": "0.00000",
        "price": "0.00000",
        "stopprice": "0.00000",
        "limitprice": "0.00000",
        "misc": "",
        "oflags": "fciq",
        "trigger": "index"
      }
    },
    "count": 2
  }
}"#;

request_model!(
    /// Closed orders, optionally with their trades
    OrderListRequest,
    ORDER_LIST
);

impl OrderListRequest {
    pub fn with_pair(mut self, pair: &str) -> ModelResult<Self> {
        self.model.set("pair", pair)?;
        Ok(self)
    }

    pub fn with_trades(mut self, include: bool) -> ModelResult<Self> {
        self.model.set("include_trades", include)?;
        Ok(self)
    }
}

impl Request for OrderListRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/ClosedOrders")
    }

    fn factory_response(&self) -> Option<String> {
        Some(
            CLOSED_ORDERS_TEMPLATE
                .replace("{first}", &gen_tx_id())
                .replace("{second}", &gen_tx_id()),
        )
    }
}

request_model!(
    /// Cancel an open order
    OrderCancelRequest,
    ORDER_CANCEL
);

impl OrderCancelRequest {
    pub fn with_txid(mut self, txid: &str) -> ModelResult<Self> {
        self.model.set("transaction_id", txid)?;
        Ok(self)
    }
}

impl Request for OrderCancelRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/CancelOrder")
    }
}

request_model!(
    /// Edit an open order
    OrderEditRequest,
    ORDER_EDIT
);

impl OrderEditRequest {
    pub fn with_txid(mut self, txid: &str) -> ModelResult<Self> {
        self.model.set("transaction_id", txid)?;
        Ok(self)
    }
}

impl Request for OrderEditRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/EditOrder")
    }
}

request_model!(
    /// Close order attached to a batch item
    OrderBatchItemCloseRequest,
    ORDER_BATCH_ITEM_CLOSE
);

impl Request for OrderBatchItemCloseRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(true)
    }
}

request_model!(
    /// One order inside an [`OrderAddBatchRequest`]
    OrderAddBatchItemRequest,
    ORDER_ADD_BATCH_ITEM
);

impl OrderAddBatchItemRequest {
    /// Attach a close order
    pub fn with_close(mut self, close: OrderBatchItemCloseRequest) -> RestResult<Self> {
        verify_structure(&close)?;
        self.model.set("close", close.into_model())?;
        Ok(self)
    }
}

impl Request for OrderAddBatchItemRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(true)
    }
}

request_model!(
    /// Place several orders for one pair at once
    OrderAddBatchRequest,
    ORDER_ADD_BATCH
);

impl OrderAddBatchRequest {
    pub fn with_pair(mut self, pair: &str) -> ModelResult<Self> {
        self.model.set("pair", pair)?;
        Ok(self)
    }

    /// Set the batch items, verifying each child once
    pub fn with_orders(mut self, orders: Vec<OrderAddBatchItemRequest>) -> RestResult<Self> {
        let mut items = Vec::with_capacity(orders.len());
        for order in orders {
            verify_structure(&order)?;
            items.push(Value::from(order.into_model()));
        }
        self.model.set("orders", Value::List(items))?;
        Ok(self)
    }
}

impl Request for OrderAddBatchRequest {
    model_accessors!();

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/AddOrderBatch")
    }
}
