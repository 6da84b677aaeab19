//! Receipt polling against a mock JSON-RPC node.

use std::time::Duration;

use canvas_mint::{
    JsonRpcClient, MintError, PollConfig, ReceiptPoller, ReceiptSource, ReceiptStatus,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TX: &str = "0x5eed";

// ============================================================================
// Helpers
// ============================================================================

fn client(server: &MockServer) -> JsonRpcClient {
    JsonRpcClient::new(format!("{}/rpc", server.uri()), Duration::from_secs(5)).expect("client")
}

fn fast_poll() -> PollConfig {
    PollConfig {
        max_attempts: 4,
        delay: Duration::from_millis(5),
        explorer_url: "https://explorer.test".into(),
    }
}

fn receipt_body(status: &str) -> serde_json::Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "transactionHash": TX,
            "status": status,
            "blockNumber": "0x2a",
            "contractAddress": "0xc0ffee"
        }
    })
}

fn pending_body() -> serde_json::Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": null })
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn lookup_sends_receipt_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "eth_getTransactionReceipt",
            "params": [TX]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(receipt_body("0x1")))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client(&server)
        .transaction_receipt(TX)
        .await
        .expect("lookup")
        .expect("receipt");
    assert_eq!(receipt.status, ReceiptStatus::Success);
    assert_eq!(receipt.contract_address.as_deref(), Some("0xc0ffee"));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn null_result_is_pending() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .mount(&server)
        .await;

    let found = client(&server).transaction_receipt(TX).await.expect("lookup");
    assert!(found.is_none());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn rpc_error_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "invalid hash" }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .transaction_receipt("nope")
        .await
        .expect_err("rpc error");
    match err {
        MintError::Rpc { code, message } => {
            assert_eq!(code, -32602);
            assert_eq!(message, "invalid hash");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_url_is_rejected() {
    let err = JsonRpcClient::new("not a url", Duration::from_secs(1)).expect_err("invalid");
    assert!(matches!(err, MintError::InvalidUrl(_)));
}

// ============================================================================
// Poller
// ============================================================================

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn poller_waits_for_mined_receipt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(receipt_body("0x1")))
        .mount(&server)
        .await;

    let poller = ReceiptPoller::new(client(&server), fast_poll());
    let receipt = poller.wait_for(TX).await.expect("receipt");
    assert_eq!(receipt.transaction_hash, TX);

    let requests = server.received_requests().await.expect("recording");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn poller_reports_revert() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(receipt_body("0x0")))
        .mount(&server)
        .await;

    let poller = ReceiptPoller::new(client(&server), fast_poll());
    let err = poller.wait_for(TX).await.expect_err("reverted");
    assert_eq!(err.to_string(), "Mint transaction reverted.");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn poller_gives_up_with_explorer_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .expect(4)
        .mount(&server)
        .await;

    let poller = ReceiptPoller::new(client(&server), fast_poll());
    let err = poller.wait_for(TX).await.expect_err("timeout");
    assert_eq!(
        err.to_string(),
        "Mint transaction receipt not found after 4 retries. Check: https://explorer.test/tx/0x5eed"
    );
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn poller_retries_through_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(receipt_body("0x1")))
        .mount(&server)
        .await;

    let poller = ReceiptPoller::new(client(&server), fast_poll());
    assert!(poller.wait_for(TX).await.is_ok());
}
