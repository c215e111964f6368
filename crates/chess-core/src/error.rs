use thiserror::Error;

/// Failures while rebuilding a game from its recorded actions.
///
/// A recorded history that cannot be replayed means the client and contract
/// disagree about encoding, so none of these are recoverable for that game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("Unparseable SAN '{san}' at move {index}: {reason}")]
    InvalidSan {
        index: usize,
        san: String,
        reason: String,
    },

    #[error("Illegal move '{san}' at move {index}: {reason}")]
    IllegalMove {
        index: usize,
        san: String,
        reason: String,
    },

    #[error("Action recorded at move {index} after the game ended")]
    MovesAfterEnd { index: usize },

    #[error("Replayed position '{replayed}' does not match contract position '{reported}'")]
    BoardMismatch { replayed: String, reported: String },

    #[error("Game is over")]
    GameOver,
}
