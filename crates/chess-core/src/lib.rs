//! Domain types and game reconstruction for the on-chain chess contract.
//!
//! Everything here is pure: records mirror the contract's JSON, `replay`
//! rebuilds a position from the recorded action list with shakmaty, and the
//! formatting helpers turn records into display strings.

pub mod block_time;
pub mod error;
pub mod game_data;
pub mod pgn;
pub mod replay;
pub mod san;
pub mod summary;

pub use error::ReplayError;
pub use game_data::{
    Action, Challenge, ChessGame, ChessGameSummary, ChessRatingSummary, GameMove, PlayAs,
};
pub use replay::{replay, HistoryEntry, ReplayedGame, Terminal, TerminalKind};
