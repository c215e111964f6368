//! Execute and query message shapes accepted by the chess contract.

use chess_core::{Action, PlayAs};
use serde::{Deserialize, Serialize};

/// Turn actions reuse the recorded action encoding:
/// `"accept_draw"`, `"resign"`, `{"move": san}`, `{"offer_draw": san}`.
pub type TurnAction = Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    AcceptChallenge {
        challenge_id: u64,
    },
    CancelChallenge {
        challenge_id: u64,
    },
    CreateChallenge {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opponent: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        play_as: Option<PlayAs>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_limit: Option<u64>,
    },
    Turn {
        game_id: u64,
        action: TurnAction,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    GetChallenges {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
    },
    GetGames {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<u64>,
        game_over: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
    },
    GetGame {
        game_id: u64,
    },
    GetTurn {
        game_id: u64,
        player: String,
    },
    ValidMove {
        game_id: u64,
        player: String,
        #[serde(rename = "move")]
        san: String,
    },
    GetRatings {},
}
