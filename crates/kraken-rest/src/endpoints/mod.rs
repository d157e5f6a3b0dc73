//! Endpoint definitions
//!
//! Each endpoint is a static [`ModelSchema`](kraken_types::ModelSchema) plus a
//! [`Request`](crate::Request) impl naming its method, path and whether it
//! authenticates.

/// Declare a request struct wrapping a [`Model`](kraken_types::Model) of `$schema`
macro_rules! request_model {
    ($(#[$meta:meta])* $name:ident, $schema:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            model: kraken_types::Model,
        }

        impl $name {
            /// Create an instance with every field at its default
            pub fn new() -> Self {
                Self {
                    model: kraken_types::Model::new(&$schema),
                }
            }

            /// Create an instance from raw field values
            pub fn from_values<I, K>(raw: I) -> kraken_types::ModelResult<Self>
            where
                I: IntoIterator<Item = (K, kraken_types::Value)>,
                K: Into<String>,
            {
                Ok(Self {
                    model: kraken_types::Model::with_values(&$schema, raw)?,
                })
            }

            pub fn into_model(self) -> kraken_types::Model {
                self.model
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// `model`/`model_mut` for a struct declared with `request_model!`
macro_rules! model_accessors {
    () => {
        fn model(&self) -> &kraken_types::Model {
            &self.model
        }

        fn model_mut(&mut self) -> &mut kraken_types::Model {
            &mut self.model
        }
    };
}

pub mod funding;
pub mod market;
pub mod order;
pub mod trade;

pub use funding::{DepositMethodListRequest, WithdrawalCreateRequest, WithdrawalListRequest};
pub use market::{SpreadListRequest, TickerShowRequest};
pub use order::{
    OrderAddBatchItemRequest, OrderAddBatchRequest, OrderBatchItemCloseRequest,
    OrderCancelRequest, OrderEditRequest, OrderListRequest,
};
pub use trade::TradeListRequest;
