//! Integration tests for the request pipeline
//!
//! Drives full submissions through a mock transport: field partitioning,
//! nonce injection, signing, hooks, mock mode and response interpretation.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::*;
use kraken_rest::endpoints::{
    DepositMethodListRequest, OrderCancelRequest, TickerShowRequest, TradeListRequest,
    WithdrawalListRequest,
};
use kraken_rest::transport::TransportError;
use kraken_rest::{
    ApiErrorKind, ClientConfig, Credentials, HttpResponse, Method, Request, RestError,
    StructureError, TickerInfo,
};
use kraken_types::{FieldSchema, Location, Model, ModelSchema};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use serde_json::{json, Value as JsonValue};

// =============================================================================
// Test request types
// =============================================================================

static KEYED_BALANCE: ModelSchema = ModelSchema::new(
    "KeyedBalanceRequest",
    &[FieldSchema::char("api_key")
        .alias("API-Key")
        .location(Location::Header)],
);

/// Balance request that carries its own `API-Key` header
struct KeyedBalanceRequest {
    model: Model,
}

impl Request for KeyedBalanceRequest {
    fn model(&self) -> &Model {
        &self.model
    }

    fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    fn is_child(&self) -> Option<bool> {
        Some(false)
    }

    fn method(&self) -> Option<Method> {
        Some(Method::Post)
    }

    fn path(&self) -> Option<&'static str> {
        Some("/0/private/Balance")
    }
}

static INCOMPLETE: ModelSchema = ModelSchema::new("IncompleteRequest", &[]);

/// Declares neither child-ness nor method nor path
struct IncompleteRequest {
    model: Model,
}

impl Request for IncompleteRequest {
    fn model(&self) -> &Model {
        &self.model
    }

    fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }
}

// =============================================================================
// Mock Mode
// =============================================================================

#[test]
fn test_mock_mode_returns_factory_result() {
    let (client, transport) = mock_client();
    let request = TradeListRequest::new().with_pair("XBTUSD").unwrap();

    let result = client
        .submit(&request, NONCE, API_KEY, SECRET, true)
        .unwrap();

    let factory: JsonValue = serde_json::from_str(&request.factory_response().unwrap()).unwrap();
    assert_eq!(result, factory["result"]);
    assert_eq!(result["XXBTZUSD"][0][2].to_string(), "1688669597.8277369");
    assert!(transport.requests().is_empty());
}

#[test]
fn test_mock_mode_without_factory_fails() {
    let (client, transport) = mock_client();
    let request = OrderCancelRequest::new().with_txid("OUF4EM-FRGI2-MQMWZD").unwrap();

    let err = client
        .submit(&request, NONCE, API_KEY, SECRET, true)
        .unwrap_err();
    assert!(matches!(
        err,
        RestError::Structure(StructureError::FactoryResponseNotImplemented("OrderCancelRequest"))
    ));
    assert!(transport.requests().is_empty());
}

#[test]
fn test_configured_mock_mode_with_typed_result() {
    let (client, _) = mock_client_with(ClientConfig::default().with_mock(true));
    let request = TickerShowRequest::new().with_pair("XBTUSD").unwrap();

    let tickers: HashMap<String, TickerInfo> = client.submit_as(&request).unwrap();
    let ticker = &tickers["XXBTZUSD"];
    assert_eq!(ticker.ask_price(), Some(dec!(30300.10000)));
    assert_eq!(ticker.trade_count, vec![34619, 38907]);
}

// =============================================================================
// Response Interpretation
// =============================================================================

#[test]
fn test_insufficient_funds_is_classified() {
    let (client, transport) = mock_client();
    transport.push_response(200, INSUFFICIENT_FUNDS);

    let request = OrderCancelRequest::new().with_txid("OUF4EM-FRGI2-MQMWZD").unwrap();
    let err = client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap_err();

    let api = err.api_error().expect("expected an exchange error");
    assert_eq!(api.kind(), ApiErrorKind::AccountBalanceLow);
    assert_eq!(api.category(), "Order");
    assert!(!matches!(err, RestError::RequestFailed { .. }));
}

#[test]
fn test_result_is_returned() {
    let (client, transport) = mock_client();
    transport.push_response(200, BALANCE_RESPONSE);

    let request = DepositMethodListRequest::new();
    let result = client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap();
    assert_eq!(result["ZUSD"], json!("171288.6158"));
}

#[test]
fn test_failed_status_is_request_failure() {
    let (client, transport) = mock_client();
    transport.push_response(503, "<html>unavailable</html>");

    let request = DepositMethodListRequest::new();
    match client.submit(&request, NONCE, API_KEY, SECRET, false) {
        Err(RestError::RequestFailed {
            method,
            path,
            status,
            body,
            ..
        }) => {
            assert_eq!(method, "GET");
            assert_eq!(path, "/0/private/DepositMethods");
            assert_eq!(status, 503);
            assert_eq!(body, "nonce=1616492376594");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_transport_error_response_is_interpreted() {
    let (client, transport) = mock_client();
    transport.push_error(TransportError::Request {
        message: "connection reset".into(),
        response: Some(HttpResponse::new(
            520,
            r#"{"error":["EService:Unavailable"]}"#,
        )),
    });

    let request = DepositMethodListRequest::new();
    let err = client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap_err();
    assert_eq!(
        err.api_error().map(|e| e.kind()),
        Some(ApiErrorKind::ServiceUnavailable)
    );
}

#[test]
fn test_transport_error_without_response() {
    let (client, transport) = mock_client();
    transport.push_error(TransportError::Request {
        message: "dns failure".into(),
        response: None,
    });

    let request = DepositMethodListRequest::new();
    let err = client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap_err();
    assert!(matches!(err, RestError::Transport(_)));
}

#[test]
fn test_non_json_success_body_is_an_error() {
    let (client, transport) = mock_client();
    transport.push_error(TransportError::Request {
        message: "body read interrupted".into(),
        response: Some(HttpResponse::new(200, "")),
    });
    transport.push_response(200, "<html>gateway error</html>");

    let request = OrderCancelRequest::new().with_txid("OUF4EM-FRGI2-MQMWZD").unwrap();
    for _ in 0..2 {
        let err = client
            .submit(&request, NONCE, API_KEY, SECRET, false)
            .unwrap_err();
        assert!(matches!(err, RestError::Parse(_)), "{:?}", err);
    }
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn test_pre_hook_runs_when_transport_fails() {
    let (mut client, transport) = mock_client();
    transport.push_error(TransportError::Request {
        message: "connection refused".into(),
        response: None,
    });

    let pre_calls = Arc::new(Mutex::new(0));
    let post_calls = Arc::new(Mutex::new(0));
    let pre = pre_calls.clone();
    let post = post_calls.clone();
    client.add_pre_request_hook(move |_| *pre.lock() += 1);
    client.add_post_request_hook(move |_, _| *post.lock() += 1);

    let err = client
        .submit(&DepositMethodListRequest::new(), NONCE, API_KEY, SECRET, false)
        .unwrap_err();

    assert!(matches!(err, RestError::Transport(_)));
    assert_eq!(*pre_calls.lock(), 1);
    assert_eq!(*post_calls.lock(), 0);
}

// =============================================================================
// Request Construction
// =============================================================================

#[test]
fn test_post_body_nonce_and_signature() {
    let (client, transport) = mock_client();
    transport.push_response(200, r#"{"error":[],"result":{"count":1}}"#);

    let request = OrderCancelRequest::new().with_txid("OUF4EM-FRGI2-MQMWZD").unwrap();
    client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.url, "https://api.kraken.com/0/private/CancelOrder");
    assert_eq!(
        sent.body.as_deref(),
        Some("txid=OUF4EM-FRGI2-MQMWZD&nonce=1616492376594")
    );

    let expected = kraken_auth::sign(
        Some(SECRET),
        "/0/private/CancelOrder",
        NONCE,
        &[
            ("txid".to_string(), "OUF4EM-FRGI2-MQMWZD".to_string()),
            ("nonce".to_string(), NONCE.to_string()),
        ],
    )
    .unwrap();
    assert_eq!(sent.header("API-Key"), Some(API_KEY));
    assert_eq!(sent.header("API-Sign"), Some(expected.as_str()));
}

#[test]
fn test_get_sends_no_body() {
    let (client, transport) = mock_client();
    transport.push_response(200, BALANCE_RESPONSE);

    client
        .submit(&DepositMethodListRequest::new(), NONCE, API_KEY, SECRET, false)
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.method, Method::Get);
    assert!(sent.body.is_none());
    assert!(sent.header("API-Sign").is_some());
}

#[test]
fn test_withdrawal_path_keeps_missing_version_prefix() {
    let (client, transport) = mock_client();
    transport.push_response(200, r#"{"error":[],"result":[]}"#);

    let request = WithdrawalListRequest::new().with_asset("XBT").unwrap();
    client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(
        sent.url,
        "https://api.kraken.com/private/Withdraw?asset=XBT&aclass=currency&limit=500"
    );
}

#[test]
fn test_public_request_is_not_signed() {
    let (client, transport) = mock_client();
    transport.push_response(200, r#"{"error":[],"result":{}}"#);

    let request = TickerShowRequest::new().with_pair("XBTUSD").unwrap();
    client.execute(&request).unwrap();

    let sent = transport.last_request().unwrap();
    assert!(sent.header("API-Key").is_none());
    assert!(sent.header("API-Sign").is_none());
    assert!(sent.body.as_deref().unwrap().starts_with("pair=XBTUSD&nonce="));
}

#[test]
fn test_existing_api_key_header_is_kept() {
    let (client, transport) = mock_client();
    transport.push_response(200, BALANCE_RESPONSE);

    let mut request = KeyedBalanceRequest {
        model: Model::new(&KEYED_BALANCE),
    };
    request.set("api_key", "preset-key").unwrap();

    client
        .submit(&request, NONCE, API_KEY, SECRET, false)
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.header("api-key"), Some("preset-key"));
    assert!(sent.header("API-Sign").is_none());
}

#[test]
fn test_execute_signs_with_configured_credentials() {
    let creds = Credentials::new(API_KEY, SECRET).unwrap();
    let (client, transport) = mock_client_with(ClientConfig::default().with_credentials(creds));
    transport.push_response(200, BALANCE_RESPONSE);

    client.execute(&DepositMethodListRequest::new()).unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.header("API-Key"), Some(API_KEY));
    assert!(sent.header("API-Sign").is_some());
}

// =============================================================================
// Pre-flight Validation
// =============================================================================

#[test]
fn test_secret_length_rejected_before_hooks() {
    let (mut client, transport) = mock_client();
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    client.add_pre_request_hook(move |_| *counter.lock() += 1);

    let err = client
        .submit(&DepositMethodListRequest::new(), NONCE, API_KEY, "abc", false)
        .unwrap_err();

    assert!(matches!(err, RestError::InvalidArgument(_)));
    assert_eq!(*calls.lock(), 0);
    assert!(transport.requests().is_empty());
}

#[test]
fn test_execute_private_without_credentials() {
    let (client, transport) = mock_client();
    let err = client.execute(&DepositMethodListRequest::new()).unwrap_err();
    assert!(matches!(err, RestError::Auth(_)));
    assert!(transport.requests().is_empty());
}

#[test]
fn test_incomplete_request_is_rejected() {
    let (client, _) = mock_client();
    let request = IncompleteRequest {
        model: Model::new(&INCOMPLETE),
    };

    let err = client
        .submit(&request, NONCE, API_KEY, SECRET, true)
        .unwrap_err();
    assert!(matches!(
        err,
        RestError::Structure(StructureError::IsChildNotImplemented("IncompleteRequest"))
    ));
}

// =============================================================================
// Hooks
// =============================================================================

#[test]
fn test_hooks_wrap_the_request() {
    let (mut client, transport) = mock_client();
    transport.push_response(200, INSUFFICIENT_FUNDS);

    let events = Arc::new(Mutex::new(Vec::new()));

    let pre_events = events.clone();
    let pre_transport = transport.clone();
    client.add_pre_request_hook(move |ctx| {
        assert!(ctx.authenticate);
        assert_eq!(ctx.body["nonce"], json!(NONCE));
        assert!(ctx.headers.iter().all(|(k, _)| k != "API-Sign"));
        pre_events
            .lock()
            .push(format!("pre:{}:{}", ctx.path, pre_transport.requests().len()));
    });

    let post_events = events.clone();
    client.add_post_request_hook(move |response, ctx| {
        assert!(ctx.headers.iter().any(|(k, _)| k == "API-Sign"));
        post_events
            .lock()
            .push(format!("post:{}:{}", ctx.path, response.status));
    });

    let request = OrderCancelRequest::new().with_txid("OUF4EM-FRGI2-MQMWZD").unwrap();
    let result = client.submit(&request, NONCE, API_KEY, SECRET, false);

    assert!(result.is_err());
    assert_eq!(
        *events.lock(),
        vec![
            "pre:/0/private/CancelOrder:0".to_string(),
            "post:/0/private/CancelOrder:200".to_string(),
        ]
    );
}

#[test]
fn test_hooks_run_in_mock_mode() {
    let (mut client, _) = mock_client();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.add_post_request_hook(move |response, _| sink.lock().push(response.status));

    client
        .submit(&TickerShowRequest::new(), NONCE, API_KEY, SECRET, true)
        .unwrap();
    assert_eq!(*seen.lock(), vec![200]);
}

// =============================================================================
// Endpoint Catalogue
// =============================================================================

#[test]
fn test_every_endpoint_is_well_formed() {
    use kraken_rest::check;
    use kraken_rest::endpoints::*;

    check::<SpreadListRequest>().unwrap();
    check::<TickerShowRequest>().unwrap();
    check::<OrderListRequest>().unwrap();
    check::<OrderCancelRequest>().unwrap();
    check::<OrderEditRequest>().unwrap();
    check::<OrderBatchItemCloseRequest>().unwrap();
    check::<OrderAddBatchItemRequest>().unwrap();
    check::<OrderAddBatchRequest>().unwrap();
    check::<TradeListRequest>().unwrap();
    check::<DepositMethodListRequest>().unwrap();
    check::<WithdrawalCreateRequest>().unwrap();
    check::<WithdrawalListRequest>().unwrap();
}
