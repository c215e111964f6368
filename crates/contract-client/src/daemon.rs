//! Signing through the chain daemon's CLI (`junod`).
//!
//! Keys stay in the daemon's keyring. Each execute spawns
//! `{binary} tx wasm execute ... --output json -y`, then looks the broadcast
//! hash up over REST until the transaction is included.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ChainConfig;
use crate::connection::{Coin, ExecuteResult, Fee, QueryClient, SigningClient, StdFee};
use crate::error::{ClientError, Result};
use crate::rest::{RestQueryClient, TxResponse};

pub struct DaemonSigner {
    address: String,
    key_name: String,
    config: ChainConfig,
    rest: RestQueryClient,
}

impl DaemonSigner {
    /// Resolve the key's address from the keyring. Fails when no key is configured
    /// or the daemon cannot be run.
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let key_name = config
            .key_name
            .clone()
            .ok_or_else(|| ClientError::Config("KEY_NAME not set".to_string()))?;

        let args = vec![
            "keys".to_string(),
            "show".to_string(),
            key_name.clone(),
            "-a".to_string(),
            "--keyring-backend".to_string(),
            config.keyring_backend.clone(),
        ];
        let address = run_daemon(&config.chain_binary, &args).await?.trim().to_string();

        if !config.is_account_address(&address) {
            return Err(ClientError::Signer(format!(
                "Key '{key_name}' resolved to '{address}', not a {} account address",
                config.bech32_prefix
            )));
        }

        info!(key = %key_name, %address, "Connected daemon signer");
        Ok(Self {
            address,
            key_name,
            config: config.clone(),
            rest: RestQueryClient::new(&config.rest_url),
        })
    }

    fn execute_args(
        &self,
        contract: &str,
        msg: &Value,
        fee: &Fee,
        memo: Option<&str>,
        funds: &[Coin],
    ) -> Vec<String> {
        let mut args = vec![
            "tx".to_string(),
            "wasm".to_string(),
            "execute".to_string(),
            contract.to_string(),
            msg.to_string(),
            "--from".to_string(),
            self.key_name.clone(),
            "--chain-id".to_string(),
            self.config.chain_id.clone(),
            "--node".to_string(),
            self.config.rpc_url.clone(),
            "--keyring-backend".to_string(),
            self.config.keyring_backend.clone(),
            "--broadcast-mode".to_string(),
            "sync".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--yes".to_string(),
        ];
        args.extend(fee_args(fee, &self.config));
        if let Some(memo) = memo {
            args.push("--note".to_string());
            args.push(memo.to_string());
        }
        if !funds.is_empty() {
            args.push("--amount".to_string());
            args.push(join_coins(funds));
        }
        args
    }

    /// Wait for the broadcast tx to show up in a block.
    async fn confirm(&self, hash: &str) -> Result<ExecuteResult> {
        await_inclusion(
            hash,
            self.config.tx_confirm_attempts,
            self.config.tx_confirm_interval,
            || self.rest.get_tx(hash),
        )
        .await
    }
}

/// Poll `lookup` up to `attempts` times. The first indexed response decides the
/// outcome; running out of attempts is [`ClientError::TxNotFound`].
async fn await_inclusion<F, Fut>(hash: &str, attempts: u32, interval: Duration, mut lookup: F) -> Result<ExecuteResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<TxResponse>>>,
{
    for attempt in 1..=attempts {
        tokio::time::sleep(interval).await;
        match lookup().await? {
            Some(tx) => return tx.into_result(),
            None => debug!(hash, attempt, "Transaction not yet included"),
        }
    }
    warn!(hash, "Transaction not found after confirmation window");
    Err(ClientError::TxNotFound(hash.to_string()))
}

#[async_trait]
impl QueryClient for DaemonSigner {
    async fn query_contract_smart(&self, contract: &str, msg: &Value) -> Result<Value> {
        self.rest.query_contract_smart(contract, msg).await
    }
}

#[async_trait]
impl SigningClient for DaemonSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> &str {
        &self.key_name
    }

    async fn execute(
        &self,
        sender: &str,
        contract: &str,
        msg: &Value,
        fee: &Fee,
        memo: Option<&str>,
        funds: &[Coin],
    ) -> Result<ExecuteResult> {
        if sender != self.address {
            return Err(ClientError::Signer(format!(
                "Sender {sender} does not match key {}",
                self.address
            )));
        }

        let args = self.execute_args(contract, msg, fee, memo, funds);
        info!(contract, msg = %msg, "Broadcasting execute");

        let stdout = run_daemon(&self.config.chain_binary, &args).await?;
        let broadcast: TxResponse = serde_json::from_str(stdout.trim())?;
        if broadcast.code != 0 {
            // CheckTx rejection: nothing was included.
            return Err(ClientError::Contract(broadcast.raw_log));
        }

        info!(hash = %broadcast.txhash, "Broadcast accepted, waiting for inclusion");
        self.confirm(&broadcast.txhash).await
    }
}

/// Gas and pricing flags for a fee choice.
pub fn fee_args(fee: &Fee, config: &ChainConfig) -> Vec<String> {
    let gas_prices = format!("{}{}", config.gas_price, config.fee_denom);
    match fee {
        Fee::Auto => vec![
            "--gas".to_string(),
            "auto".to_string(),
            "--gas-adjustment".to_string(),
            config.gas_adjustment.to_string(),
            "--gas-prices".to_string(),
            gas_prices,
        ],
        Fee::Multiplier(multiplier) => vec![
            "--gas".to_string(),
            "auto".to_string(),
            "--gas-adjustment".to_string(),
            multiplier.to_string(),
            "--gas-prices".to_string(),
            gas_prices,
        ],
        Fee::Std(StdFee { amount, gas }) if amount.is_empty() => vec![
            "--gas".to_string(),
            gas.clone(),
            "--gas-prices".to_string(),
            gas_prices,
        ],
        Fee::Std(StdFee { amount, gas }) => vec![
            "--gas".to_string(),
            gas.clone(),
            "--fees".to_string(),
            join_coins(amount),
        ],
    }
}

fn join_coins(coins: &[Coin]) -> String {
    coins.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",")
}

/// Run the daemon and return stdout. A non-zero exit carries the daemon's
/// message verbatim, which is where simulation-time contract errors land.
async fn run_daemon(binary: &str, args: &[String]) -> Result<String> {
    debug!(binary, ?args, "Running chain daemon");
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ClientError::Signer(format!("Failed to run {binary}: {e}")))?;

    if !output.status.success() {
        return Err(daemon_failure(&output.stderr, &output.stdout));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| ClientError::Signer(format!("{binary} wrote non-UTF-8 output: {e}")))
}

/// Prefer stderr; some daemon versions print the rejection on stdout instead.
fn daemon_failure(stderr: &[u8], stdout: &[u8]) -> ClientError {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    let message = if stderr.is_empty() {
        String::from_utf8_lossy(stdout).trim().to_string()
    } else {
        stderr
    };
    ClientError::Contract(message)
}
