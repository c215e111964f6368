//! Chain connection: signed execution plus read-only smart queries.
//!
//! The connection is an explicit handle passed to whoever needs it. A signing
//! identity is attached with [`Connection::connect`] and removed with
//! [`Connection::disconnect`]; queries keep working without one through a
//! lazily created REST fallback.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::rest::RestQueryClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
}

impl StdFee {
    /// Gas-only fee; the signer prices it at the chain's gas price.
    pub fn gas(gas: u64) -> Self {
        Self {
            amount: Vec::new(),
            gas: gas.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fee {
    /// Simulate and apply the configured gas adjustment.
    Auto,
    /// Simulate and apply this gas adjustment.
    Multiplier(f64),
    Std(StdFee),
}

impl Default for Fee {
    fn default() -> Self {
        Fee::Std(StdFee::gas(200_000))
    }
}

/// Outcome of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub transaction_hash: String,
    pub height: u64,
    pub gas_used: u64,
    pub gas_wanted: u64,
    #[serde(default)]
    pub raw_log: String,
}

/// Read-only contract access.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn query_contract_smart(&self, contract: &str, msg: &Value) -> Result<Value>;
}

/// A connected signing identity. Implementations sign, broadcast and wait
/// for inclusion; they never retry a failed transaction.
#[async_trait]
pub trait SigningClient: QueryClient {
    fn address(&self) -> &str;

    /// Human-readable wallet or key name.
    fn name(&self) -> &str;

    async fn execute(
        &self,
        sender: &str,
        contract: &str,
        msg: &Value,
        fee: &Fee,
        memo: Option<&str>,
        funds: &[Coin],
    ) -> Result<ExecuteResult>;
}

pub struct Connection {
    rest_url: String,
    default_fee: Fee,
    signer: Option<Arc<dyn SigningClient>>,
    fallback: OnceLock<Arc<dyn QueryClient>>,
}

impl Connection {
    pub fn new(rest_url: impl Into<String>) -> Self {
        Self {
            rest_url: rest_url.into(),
            default_fee: Fee::default(),
            signer: None,
            fallback: OnceLock::new(),
        }
    }

    /// Use `client` for queries instead of the REST fallback.
    pub fn with_query_client(self, client: Arc<dyn QueryClient>) -> Self {
        let _ = self.fallback.set(client);
        self
    }

    pub fn with_default_fee(mut self, fee: Fee) -> Self {
        self.default_fee = fee;
        self
    }

    pub fn connect(&mut self, signer: Arc<dyn SigningClient>) {
        debug!(address = signer.address(), name = signer.name(), "Signer connected");
        self.signer = Some(signer);
    }

    pub fn disconnect(&mut self) -> Option<Arc<dyn SigningClient>> {
        let signer = self.signer.take();
        if let Some(s) = &signer {
            debug!(address = s.address(), "Signer disconnected");
        }
        signer
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    pub fn address(&self) -> Option<&str> {
        self.signer.as_deref().map(|s| s.address())
    }

    pub fn name(&self) -> Option<&str> {
        self.signer.as_deref().map(|s| s.name())
    }

    /// Sign and submit `msg`. Fails with `NotConnected` without an identity.
    pub async fn execute(
        &self,
        contract: &str,
        msg: &Value,
        fee: Option<Fee>,
        memo: Option<&str>,
        funds: &[Coin],
    ) -> Result<ExecuteResult> {
        let signer = self.signer.as_deref().ok_or(ClientError::NotConnected)?;
        let fee = fee.unwrap_or_else(|| self.default_fee.clone());
        signer
            .execute(signer.address(), contract, msg, &fee, memo, funds)
            .await
    }

    /// Smart query through the signer when connected, else the read-only fallback.
    pub async fn query(&self, contract: &str, msg: &Value) -> Result<Value> {
        if let Some(signer) = self.signer.as_deref() {
            return signer.query_contract_smart(contract, msg).await;
        }
        let fallback = self.fallback.get_or_init(|| {
            debug!(rest = %self.rest_url, "Opening read-only query client");
            let client: Arc<dyn QueryClient> = Arc::new(RestQueryClient::new(&self.rest_url));
            client
        });
        fallback.query_contract_smart(contract, msg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct EchoQuery;

    #[async_trait]
    impl QueryClient for EchoQuery {
        async fn query_contract_smart(&self, _contract: &str, msg: &Value) -> Result<Value> {
            Ok(json!({"via": "fallback", "msg": msg}))
        }
    }

    #[derive(Default)]
    struct RecordingSigner {
        fees: Mutex<Vec<Fee>>,
    }

    #[async_trait]
    impl QueryClient for RecordingSigner {
        async fn query_contract_smart(&self, _contract: &str, _msg: &Value) -> Result<Value> {
            Ok(json!({"via": "signer"}))
        }
    }

    #[async_trait]
    impl SigningClient for RecordingSigner {
        fn address(&self) -> &str {
            "juno1signer"
        }

        fn name(&self) -> &str {
            "tester1"
        }

        async fn execute(
            &self,
            sender: &str,
            _contract: &str,
            _msg: &Value,
            fee: &Fee,
            _memo: Option<&str>,
            _funds: &[Coin],
        ) -> Result<ExecuteResult> {
            assert_eq!(sender, "juno1signer");
            self.fees.lock().unwrap().push(fee.clone());
            Ok(ExecuteResult {
                transaction_hash: "ABC".into(),
                height: 10,
                gas_used: 1,
                gas_wanted: 2,
                raw_log: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_execute_requires_identity() {
        let conn = Connection::new("http://unused").with_query_client(Arc::new(EchoQuery));
        let err = conn.execute("c", &json!({}), None, None, &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[tokio::test]
    async fn test_query_routes_by_connection_state() {
        let mut conn = Connection::new("http://unused").with_query_client(Arc::new(EchoQuery));
        let before = conn.query("c", &json!({"get_ratings": {}})).await.unwrap();
        assert_eq!(before["via"], "fallback");

        conn.connect(Arc::new(RecordingSigner::default()));
        assert_eq!(conn.address(), Some("juno1signer"));
        let during = conn.query("c", &json!({})).await.unwrap();
        assert_eq!(during["via"], "signer");

        assert!(conn.disconnect().is_some());
        assert!(!conn.is_connected());
        let after = conn.query("c", &json!({})).await.unwrap();
        assert_eq!(after["via"], "fallback");
    }

    #[tokio::test]
    async fn test_default_fee_applied() {
        let signer = Arc::new(RecordingSigner::default());
        let mut conn = Connection::new("http://unused");
        conn.connect(signer.clone());

        conn.execute("c", &json!({}), None, None, &[]).await.unwrap();
        conn.execute("c", &json!({}), Some(Fee::Auto), None, &[]).await.unwrap();

        let fees = signer.fees.lock().unwrap();
        assert_eq!(fees[0], Fee::Std(StdFee::gas(200_000)));
        assert_eq!(fees[1], Fee::Auto);
    }
}
