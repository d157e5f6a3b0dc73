//! Common test utilities and fixtures for pipeline tests

#![allow(dead_code)]

use std::sync::Arc;

use kraken_rest::{ApiClient, ClientConfig, MockTransport};
use tracing_subscriber::EnvFilter;

/// Secret decoding to the bytes `nonce`
pub const SECRET: &str = "bm9uY2U=";

pub const API_KEY: &str = "test-api-key";

pub const NONCE: &str = "1616492376594";

/// Envelope reporting insufficient funds
pub const INSUFFICIENT_FUNDS: &str = r#"{"error": ["EOrder:Insufficient funds"], "result": {}}"#;

/// Successful balance envelope
pub const BALANCE_RESPONSE: &str = r#"{
    "error": [],
    "result": {
        "ZUSD": "171288.6158",
        "XXBT": "0.0000005000"
    }
}"#;

/// Client over a shared mock transport
pub fn mock_client() -> (ApiClient, Arc<MockTransport>) {
    mock_client_with(ClientConfig::default())
}

pub fn mock_client_with(config: ClientConfig) -> (ApiClient, Arc<MockTransport>) {
    init_tracing();
    let transport = Arc::new(MockTransport::new());
    let client = ApiClient::with_transport(config, transport.clone());
    (client, transport)
}

/// Route pipeline logs to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
