//! Terminal client error types

use chess_core::ReplayError;
use contract_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error(transparent)]
    Chain(#[from] ClientError),
}

/// Why a game session action did not happen. Each is reported once and
/// leaves the last loaded snapshot in place.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Game not loaded")]
    NotLoaded,

    #[error("Not your turn")]
    NotInteractive,

    #[error("No pending move")]
    NoPendingMove,

    #[error("A move is already pending")]
    MovePending,

    #[error("No draw has been offered")]
    NoDrawOffer,

    #[error("A draw offer is already pending")]
    DrawAlreadyOffered,

    #[error("Only players can do that")]
    NotAPlayer,

    #[error("Game has no block limit")]
    NoBlockLimit,

    #[error("Game has not started")]
    NotStarted,

    #[error("Game over")]
    GameOver,

    #[error("Move {0} rejected by the contract")]
    Rejected(String),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
