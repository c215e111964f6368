//! Client configuration from environment variables

use std::time::Duration;

use chess_core::block_time::DEFAULT_SECONDS_PER_BLOCK;
use contract_client::config::parse_env;
use contract_client::{ChainConfig, GasTiers};
use tracing::info;

use crate::error::ConfigError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chain: ChainConfig,

    /// Full game reload interval
    pub game_poll: Duration,

    /// `get_turn` check interval
    pub turn_poll: Duration,

    /// Used to show block limits as wall-clock time
    pub seconds_per_block: f64,

    pub gas: GasTiers,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::testing(),
            game_poll: Duration::from_secs(6),
            turn_poll: Duration::from_secs(2),
            seconds_per_block: DEFAULT_SECONDS_PER_BLOCK,
            gas: GasTiers::default(),
        }
    }
}

impl AppConfig {
    /// Load from the environment. Call after `dotenvy::dotenv()`.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let chain = ChainConfig::from_env()?;

        let game_poll = Duration::from_secs(parse_env("GAME_POLL_SECS", defaults.game_poll.as_secs())?);
        let turn_poll = Duration::from_secs(parse_env("TURN_POLL_SECS", defaults.turn_poll.as_secs())?);
        if game_poll.is_zero() || turn_poll.is_zero() {
            return Err(ConfigError::Invalid("Poll intervals must be at least one second".into()));
        }

        let seconds_per_block = parse_env("SECONDS_PER_BLOCK", defaults.seconds_per_block)?;
        if seconds_per_block <= 0.0 {
            return Err(ConfigError::Invalid("SECONDS_PER_BLOCK must be positive".into()));
        }

        let gas = GasTiers {
            low: parse_env("GAS_LOW", defaults.gas.low)?,
            medium: parse_env("GAS_MEDIUM", defaults.gas.medium)?,
            high: parse_env("GAS_HIGH", defaults.gas.high)?,
            medium_from: parse_env("GAS_MEDIUM_FROM", defaults.gas.medium_from)?,
            high_from: parse_env("GAS_HIGH_FROM", defaults.gas.high_from)?,
        };
        gas.validate()?;

        info!(
            game_poll_secs = game_poll.as_secs(),
            turn_poll_secs = turn_poll.as_secs(),
            ?gas,
            "App config loaded"
        );

        Ok(Self {
            chain,
            game_poll,
            turn_poll,
            seconds_per_block,
            gas,
        })
    }
}
