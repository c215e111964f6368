use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::connection::{ExecuteResult, QueryClient};
use crate::error::{ClientError, Result};

/// Read-only client for a Cosmos SDK REST (LCD) endpoint.
pub struct RestQueryClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SmartQueryResponse {
    data: Value,
}

/// gRPC-gateway error body: `{"code": 2, "message": "...", "details": []}`.
#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GetTxResponse {
    tx_response: TxResponse,
}

/// Subset of a Cosmos SDK `TxResponse`. Integer fields arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct TxResponse {
    #[serde(default)]
    pub height: String,
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default)]
    pub gas_used: String,
    #[serde(default)]
    pub gas_wanted: String,
}

impl TxResponse {
    /// Non-zero `code` means the chain or contract rejected the transaction.
    pub fn into_result(self) -> Result<ExecuteResult> {
        if self.code != 0 {
            return Err(ClientError::Contract(self.raw_log));
        }
        Ok(ExecuteResult {
            transaction_hash: self.txhash,
            height: self.height.parse().unwrap_or(0),
            gas_used: self.gas_used.parse().unwrap_or(0),
            gas_wanted: self.gas_wanted.parse().unwrap_or(0),
            raw_log: self.raw_log,
        })
    }
}

impl RestQueryClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent("CosmosChess/1.0")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid REST URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("REST URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn smart_query_url(&self, contract: &str, msg: &Value) -> Result<Url> {
        let encoded = STANDARD.encode(serde_json::to_vec(msg)?);
        self.endpoint(&["cosmwasm", "wasm", "v1", "contract", contract, "smart", encoded.as_str()])
    }

    /// Look up a transaction by hash. `Ok(None)` while it is not yet indexed.
    pub async fn get_tx(&self, hash: &str) -> Result<Option<TxResponse>> {
        let url = self.endpoint(&["cosmos", "tx", "v1beta1", "txs", hash])?;
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return match tx_lookup_failure(status, &body) {
                Some(err) => Err(err),
                None => Ok(None),
            };
        }

        let parsed: GetTxResponse = resp.json().await?;
        Ok(Some(parsed.tx_response))
    }
}

/// Contract errors come back as a gateway error with the message verbatim.
fn query_failure(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<GatewayError>(body) {
        Ok(err) if !err.message.is_empty() => ClientError::Contract(err.message),
        _ => ClientError::Transport(format!("HTTP {status}")),
    }
}

/// `None` when the failure only means the hash is not indexed yet.
fn tx_lookup_failure(status: StatusCode, body: &str) -> Option<ClientError> {
    if status == StatusCode::NOT_FOUND {
        return None;
    }
    match serde_json::from_str::<GatewayError>(body) {
        // Older gateways answer 400 with code 5 (NotFound) for unknown hashes.
        Ok(err) if err.code == 5 || err.message.contains("not found") => None,
        Ok(err) => Some(ClientError::Transport(format!("HTTP {status}: {}", err.message))),
        Err(_) => Some(ClientError::Transport(format!("HTTP {status}"))),
    }
}

#[async_trait]
impl QueryClient for RestQueryClient {
    async fn query_contract_smart(&self, contract: &str, msg: &Value) -> Result<Value> {
        let url = self.smart_query_url(contract, msg)?;
        debug!(contract, query = %msg, "Smart query");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(query_failure(status, &body));
        }

        let parsed: SmartQueryResponse = serde_json::from_str(&body)?;
        Ok(parsed.data)
    }
}
