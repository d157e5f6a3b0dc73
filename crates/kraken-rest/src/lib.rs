//! REST API client for Kraken cryptocurrency exchange
//!
//! Every endpoint is declared as a schema-bound request model (see
//! [`kraken_types`]); [`ApiClient`] turns such a model into an HTTP call with
//! Kraken's `API-Key`/`API-Sign` authentication and interprets the
//! `{"error": [...], "result": ...}` envelope.
//!
//! # Features
//!
//! - **Pipeline**: field partitioning by location, nonce injection, signing
//! - **Hooks**: observe every request before it is signed and every response
//! - **Mock mode**: answer requests from their built-in example responses
//! - **Errors**: exchange error strings classified into [`ApiErrorKind`]
//!
//! # Example
//!
//! ```no_run
//! use kraken_rest::{ApiClient, Credentials};
//! use kraken_rest::endpoints::OrderListRequest;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = Credentials::from_env()?;
//!     let client = ApiClient::with_credentials(creds)?;
//!
//!     let request = OrderListRequest::new().with_pair("XBTUSD")?;
//!     let closed = client.execute(&request)?;
//!     println!("Closed orders: {}", closed);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod hooks;
pub mod query;
pub mod request;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::{interpret_response, ApiClient, ClientConfig, DEFAULT_BASE_URL};
pub use error::{RestError, RestResult, StructureError};
pub use hooks::{Hooks, RequestContext};
pub use request::{check, gen_tx_id, verify_structure, Request};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, MockTransport, Transport};
pub use types::{TickerInfo, WithdrawalInfo, WithdrawalRef};

pub use kraken_auth::Credentials;
pub use kraken_types::{ApiError, ApiErrorKind};
