//! Solana JSON-RPC client for transaction retrieval.

use std::time::Duration;

use async_trait::async_trait;
use mev_lens_source::{RawTransactionRecord, SourceError, SourceResult, TransactionSource};
use mev_lens_telemetry::Metrics;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::retry::{with_retry, RetryPolicy};

const HELIUS_MAINNET_URL: &str = "https://mainnet.helius-rpc.com/";

/// Connection settings for [`SolanaRpcClient`].
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// HTTP/HTTPS JSON-RPC endpoint URL.
    pub endpoint: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl RpcConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Helius mainnet endpoint for an API key.
    pub fn helius(api_key: &str) -> Self {
        Self::new(format!("{}?api-key={}", HELIUS_MAINNET_URL, api_key))
    }
}

/// One row of `getSignaturesForAddress`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// Solana RPC client wrapper.
pub struct SolanaRpcClient {
    client: Client,
    config: RpcConfig,
    metrics: Metrics,
}

impl SolanaRpcClient {
    /// Create a new RPC client.
    ///
    /// # Arguments
    /// * `config` - Endpoint, timeout and retry settings
    /// * `metrics` - Metrics collector
    pub fn new(config: RpcConfig, metrics: Metrics) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        info!("Initialized RPC client for {}", redact_endpoint(&config.endpoint));

        Ok(Self {
            client,
            config,
            metrics,
        })
    }

    /// One JSON-RPC round trip, without retries.
    async fn send_once(&self, payload: &Value) -> SourceResult<Value> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!(
                "RPC request failed with status: {}",
                status
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                SourceError::Malformed(e.to_string())
            } else {
                SourceError::Transport(e.to_string())
            }
        })?;

        parse_rpc_body(body)
    }

    async fn call_rpc(&self, method: &str, params: Value) -> SourceResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let start = Instant::now();
        let result = with_retry(&self.config.retry, method, || self.send_once(&payload)).await;
        self.metrics
            .observe_rpc_latency(method, start.elapsed().as_secs_f64());

        if result.is_err() {
            self.metrics.inc_rpc_errors();
        }
        result
    }

    /// Most recent signatures involving an address, newest first.
    ///
    /// # Arguments
    /// * `address` - Account or program address
    /// * `limit` - Maximum number of signatures to return
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> SourceResult<Vec<SignatureInfo>> {
        let result = self
            .call_rpc("getSignaturesForAddress", json!([address, {"limit": limit}]))
            .await?;

        if result.is_null() {
            return Ok(Vec::new());
        }

        let signatures: Vec<SignatureInfo> =
            serde_json::from_value(result).map_err(|e| SourceError::Malformed(e.to_string()))?;
        debug!("Fetched {} signatures for {}", signatures.len(), address);
        Ok(signatures)
    }
}

#[async_trait]
impl TransactionSource for SolanaRpcClient {
    async fn get_transaction(&self, signature: &str) -> SourceResult<Option<RawTransactionRecord>> {
        let result = self
            .call_rpc(
                "getTransaction",
                json!([
                    signature,
                    {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}
                ]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let mut record: RawTransactionRecord =
            serde_json::from_value(result).map_err(|e| SourceError::Malformed(e.to_string()))?;
        record.signature = signature.to_string();
        debug!("Fetched transaction {}", signature);
        Ok(Some(record))
    }
}

/// Extract `result` from a JSON-RPC response body.
///
/// A missing `result` reads as `null` (nothing found).
fn parse_rpc_body(mut body: Value) -> SourceResult<Value> {
    if let Some(error) = body.get("error") {
        return Err(SourceError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        });
    }

    Ok(body.get_mut("result").map(Value::take).unwrap_or(Value::Null))
}

/// Endpoint with its query string removed, so API keys stay out of the logs.
fn redact_endpoint(endpoint: &str) -> &str {
    endpoint.split('?').next().unwrap_or(endpoint)
}
