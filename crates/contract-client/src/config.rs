//! Chain and contract selection from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::ClientError;

/// Contract deployed on the local `testing` chain.
pub const TESTING_CONTRACT: &str =
    "juno14hj2tavq8fpesdwxxcu44rty3hh90vhujrvcmstl4zr3txmfvw9skjuwg8";

/// Contract 0.4.1 on Juno mainnet.
pub const JUNO_CONTRACT: &str =
    "juno19jrfw6y7ljxnh389cl9eewrs4rfgf0w92g0m59lp0llvdsf8a0csunfq3p";

#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub chain_id: String,
    pub rpc_url: String,
    /// LCD/REST endpoint used for smart queries and tx lookups
    pub rest_url: String,
    /// Bech32 prefix of account addresses
    pub bech32_prefix: String,
    pub fee_denom: String,
    /// Average gas price in `fee_denom`
    pub gas_price: f64,
    /// Applied when the fee is `Fee::Auto`
    pub gas_adjustment: f64,
    pub contract_address: String,
    /// Chain CLI used to sign and broadcast (`junod`)
    pub chain_binary: String,
    pub key_name: Option<String>,
    pub keyring_backend: String,
    /// Lookups of a broadcast tx before giving up on inclusion
    pub tx_confirm_attempts: u32,
    pub tx_confirm_interval: Duration,
}

impl ChainConfig {
    /// Local single-node chain, the default for development.
    pub fn testing() -> Self {
        Self {
            chain_id: "testing".to_string(),
            rpc_url: "http://127.0.0.1:26657".to_string(),
            rest_url: "http://127.0.0.1:1317".to_string(),
            bech32_prefix: "juno".to_string(),
            fee_denom: "ujunox".to_string(),
            gas_price: 0.025,
            gas_adjustment: 1.3,
            contract_address: TESTING_CONTRACT.to_string(),
            chain_binary: "junod".to_string(),
            key_name: None,
            keyring_backend: "test".to_string(),
            tx_confirm_attempts: 20,
            tx_confirm_interval: Duration::from_millis(1500),
        }
    }

    pub fn juno() -> Self {
        Self {
            chain_id: "juno-1".to_string(),
            rpc_url: "https://juno-rpc.stakeandrelax.net".to_string(),
            rest_url: "https://juno-api.stakeandrelax.net".to_string(),
            fee_denom: "ujuno".to_string(),
            contract_address: JUNO_CONTRACT.to_string(),
            keyring_backend: "os".to_string(),
            ..Self::testing()
        }
    }

    /// Start from the preset named by `CHAIN_PRESET` (`testing` or `juno`)
    /// and apply any individual overrides.
    pub fn from_env() -> Result<Self, ClientError> {
        let preset = env::var("CHAIN_PRESET").unwrap_or_else(|_| "testing".to_string());
        let mut config = match preset.as_str() {
            "testing" => Self::testing(),
            "juno" => Self::juno(),
            other => {
                return Err(ClientError::Config(format!("Unknown CHAIN_PRESET '{other}'")));
            }
        };

        override_string("CHAIN_ID", &mut config.chain_id);
        override_string("RPC_URL", &mut config.rpc_url);
        override_string("REST_URL", &mut config.rest_url);
        override_string("BECH32_PREFIX", &mut config.bech32_prefix);
        override_string("FEE_DENOM", &mut config.fee_denom);
        override_string("CONTRACT_ADDRESS", &mut config.contract_address);
        override_string("CHAIN_BINARY", &mut config.chain_binary);
        override_string("KEYRING_BACKEND", &mut config.keyring_backend);
        config.key_name = env::var("KEY_NAME").ok().or(config.key_name);

        config.gas_price = parse_env("GAS_PRICE", config.gas_price)?;
        config.gas_adjustment = parse_env("GAS_ADJUSTMENT", config.gas_adjustment)?;
        config.tx_confirm_attempts = parse_env("TX_CONFIRM_ATTEMPTS", config.tx_confirm_attempts)?;
        config.tx_confirm_interval = Duration::from_millis(parse_env(
            "TX_CONFIRM_INTERVAL_MS",
            config.tx_confirm_interval.as_millis() as u64,
        )?);

        info!(
            chain_id = %config.chain_id,
            rest = %config.rest_url,
            contract = %config.contract_address,
            "Chain config loaded"
        );
        Ok(config)
    }

    /// Cheap shape check for an account address on this chain.
    pub fn is_account_address(&self, address: &str) -> bool {
        address
            .strip_prefix(&self.bech32_prefix)
            .and_then(|rest| rest.strip_prefix('1'))
            .is_some_and(|data| {
                data.len() >= 6 && data.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
    }
}

fn override_string(key: &str, slot: &mut String) {
    if let Ok(value) = env::var(key) {
        *slot = value;
    }
}

/// Parse an optional env var, falling back to `default` when unset.
pub fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, ClientError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}
