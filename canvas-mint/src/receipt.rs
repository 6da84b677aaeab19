//! Transaction receipt polling over JSON-RPC.
//!
//! After a mint transaction is submitted the receipt is polled a fixed
//! number of times with a fixed delay. A missing receipt after the last
//! attempt is an error carrying the explorer link; a reverted receipt is an
//! error too.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::error::{MintError, MintResult};

const JSONRPC_VERSION: &str = "2.0";

/// Outcome recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReceiptStatus {
    /// `0x1`
    Success,
    /// `0x0`
    Reverted,
}

impl TryFrom<String> for ReceiptStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "0x1" | "success" => Ok(Self::Success),
            "0x0" | "reverted" => Ok(Self::Reverted),
            other => Err(format!("unknown receipt status {other}")),
        }
    }
}

impl From<ReceiptStatus> for String {
    fn from(status: ReceiptStatus) -> Self {
        match status {
            ReceiptStatus::Success => "0x1".to_string(),
            ReceiptStatus::Reverted => "0x0".to_string(),
        }
    }
}

/// The fields of `eth_getTransactionReceipt` the mint flow needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub transaction_hash: String,
    /// Execution status.
    pub status: ReceiptStatus,
    /// Block number (hex).
    #[serde(default)]
    pub block_number: Option<String>,
    /// Address of a contract created by the transaction.
    #[serde(default)]
    pub contract_address: Option<String>,
}

/// Something that can look up transaction receipts.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// `Ok(None)` while the transaction is still pending.
    async fn transaction_receipt(&self, tx_hash: &str) -> MintResult<Option<TransactionReceipt>>;
}

/// Minimal JSON-RPC 2.0 client for an Ethereum-style node.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: Client,
    endpoint: Url,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`MintError::InvalidUrl`] if the URL is malformed.
    /// Returns [`MintError::Http`] if the HTTP client fails to build.
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> MintResult<Self> {
        let endpoint =
            Url::parse(endpoint.as_ref()).map_err(|e| MintError::InvalidUrl(e.to_string()))?;
        let http = Client::builder()
            .user_agent(concat!("meme-canvas/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            request_id: AtomicU64::new(1),
        })
    }

    /// Call `method`; a `null` result reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns HTTP, JSON or RPC errors.
    pub async fn call<T>(&self, method: &str, params: Value) -> MintResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        };

        let rpc: JsonRpcResponse = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = rpc.error {
            return Err(MintError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        match rpc.result {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }
}

#[async_trait]
impl ReceiptSource for JsonRpcClient {
    async fn transaction_receipt(&self, tx_hash: &str) -> MintResult<Option<TransactionReceipt>> {
        self.call("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Fixed retry budget for receipt polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum lookups.
    pub max_attempts: u32,
    /// Pause between lookups.
    pub delay: Duration,
    /// Block explorer base URL used in the timeout message.
    pub explorer_url: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(3000),
            explorer_url: "https://explorer.testnet.monad.xyz".to_string(),
        }
    }
}

impl PollConfig {
    /// Explorer link for a transaction.
    #[must_use]
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url.trim_end_matches('/'))
    }
}

/// Polls a [`ReceiptSource`] until the receipt appears.
#[derive(Debug)]
pub struct ReceiptPoller<S> {
    source: S,
    config: PollConfig,
}

impl<S: ReceiptSource> ReceiptPoller<S> {
    /// Create a poller.
    #[must_use]
    pub fn new(source: S, config: PollConfig) -> Self {
        Self { source, config }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Wait for a successful receipt.
    ///
    /// Lookup failures count as attempts and are retried.
    ///
    /// # Errors
    ///
    /// [`MintError::ReceiptNotFound`] when the budget runs out,
    /// [`MintError::Reverted`] when the transaction reverted.
    pub async fn wait_for(&self, tx_hash: &str) -> MintResult<TransactionReceipt> {
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            match self.source.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if receipt.status == ReceiptStatus::Reverted {
                        return Err(MintError::Reverted {
                            tx_hash: tx_hash.to_string(),
                        });
                    }
                    tracing::info!("Receipt for {tx_hash} found on attempt {attempt}");
                    return Ok(receipt);
                }
                Ok(None) => {
                    tracing::debug!("Receipt not found, retrying ({attempt}/{attempts})");
                }
                Err(e) => {
                    tracing::warn!("Receipt lookup {attempt}/{attempts} failed: {e}");
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        Err(MintError::ReceiptNotFound {
            attempts,
            explorer_url: self.config.tx_url(tx_hash),
        })
    }
}

/// Minted versus total supply of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStatus {
    /// Tokens minted so far.
    pub minted: u64,
    /// Total supply.
    pub total: u64,
}

impl SupplyStatus {
    /// Whether no more tokens can be minted.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.minted >= self.total
    }

    /// Status after one more successful mint.
    #[must_use]
    pub fn after_mint(self) -> Self {
        Self {
            minted: self.minted.saturating_add(1),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed sequence of lookups.
    struct Scripted {
        responses: Mutex<Vec<MintResult<Option<TransactionReceipt>>>>,
        calls: AtomicU64,
    }

    impl Scripted {
        fn new(mut responses: Vec<MintResult<Option<TransactionReceipt>>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl ReceiptSource for Scripted {
        async fn transaction_receipt(
            &self,
            _tx_hash: &str,
        ) -> MintResult<Option<TransactionReceipt>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.responses
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or(Ok(None))
        }
    }

    fn receipt(status: ReceiptStatus) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: "0xfeed".into(),
            status,
            block_number: Some("0x10".into()),
            contract_address: None,
        }
    }

    fn fast() -> PollConfig {
        PollConfig {
            delay: Duration::from_millis(1),
            explorer_url: "https://explorer.example/".into(),
            ..PollConfig::default()
        }
    }

    #[test]
    fn test_default_budget() {
        let config = PollConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.delay, Duration::from_secs(3));
    }

    #[test]
    fn test_sold_out() {
        assert!(!SupplyStatus { minted: 1, total: 2 }.is_sold_out());
        assert!(SupplyStatus { minted: 1, total: 2 }.after_mint().is_sold_out());
        assert!(SupplyStatus { minted: 5, total: 2 }.is_sold_out());
    }

    #[test]
    fn test_status_parsing() {
        let parsed: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0x1",
            "status": "0x0",
            "blockNumber": "0x2",
            "gasUsed": "0x5208"
        }))
        .expect("receipt");
        assert_eq!(parsed.status, ReceiptStatus::Reverted);
    }

    #[tokio::test]
    async fn test_found_after_retries() {
        let source = Scripted::new(vec![
            Ok(None),
            Err(MintError::UnexpectedResponse("flaky".into())),
            Ok(Some(receipt(ReceiptStatus::Success))),
        ]);
        let poller = ReceiptPoller::new(source, fast());

        let found = poller.wait_for("0xfeed").await.expect("receipt");
        assert_eq!(found.status, ReceiptStatus::Success);
        assert_eq!(poller.source.calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted_names_explorer() {
        let poller = ReceiptPoller::new(Scripted::new(Vec::new()), fast());

        let err = poller.wait_for("0xdead").await.expect_err("timeout");
        match err {
            MintError::ReceiptNotFound {
                attempts,
                explorer_url,
            } => {
                assert_eq!(attempts, 10);
                assert_eq!(explorer_url, "https://explorer.example/tx/0xdead");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(poller.source.calls.load(Ordering::Relaxed), 10);
    }

    #[tokio::test]
    async fn test_reverted_is_error() {
        let source = Scripted::new(vec![Ok(Some(receipt(ReceiptStatus::Reverted)))]);
        let poller = ReceiptPoller::new(source, fast());

        assert!(matches!(
            poller.wait_for("0xfeed").await,
            Err(MintError::Reverted { .. })
        ));
    }
}
