use serde::{Deserialize, Serialize};

/// Color a challenge creator asks to play, or whose turn a summary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayAs {
    White,
    Black,
}

impl PlayAs {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayAs::White => "white",
            PlayAs::Black => "black",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            PlayAs::White => PlayAs::Black,
            PlayAs::Black => PlayAs::White,
        }
    }
}

impl From<shakmaty::Color> for PlayAs {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => PlayAs::White,
            shakmaty::Color::Black => PlayAs::Black,
        }
    }
}

impl std::str::FromStr for PlayAs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(PlayAs::White),
            "black" | "b" => Ok(PlayAs::Black),
            other => Err(format!("Unknown color '{other}'")),
        }
    }
}

impl std::fmt::Display for PlayAs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded turn action.
///
/// Wire shapes: `"accept_draw"`, `"resign"`, `{"move": san}`,
/// `{"offer_draw": san}`. A draw offer always carries the offering
/// player's move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move(String),
    OfferDraw(String),
    AcceptDraw,
    Resign,
}

impl Action {
    /// SAN carried by the action, if it moves a piece.
    pub fn san(&self) -> Option<&str> {
        match self {
            Action::Move(san) | Action::OfferDraw(san) => Some(san),
            Action::AcceptDraw | Action::Resign => None,
        }
    }

    pub fn is_offer_draw(&self) -> bool {
        matches!(self, Action::OfferDraw(_))
    }
}

/// `[block, action]` pair as recorded by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMove(pub u64, pub Action);

impl GameMove {
    pub fn block(&self) -> u64 {
        self.0
    }

    pub fn action(&self) -> &Action {
        &self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_id: u64,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_as: Option<PlayAs>,
    pub block_created: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_limit: Option<u64>,
}

/// Full game record. `player1` plays white, `player2` plays black.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChessGame {
    pub game_id: u64,
    pub player1: String,
    pub player2: String,
    pub block_start: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_limit: Option<u64>,
    #[serde(default)]
    pub moves: Vec<GameMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
}

impl ChessGame {
    pub fn is_player(&self, address: &str) -> bool {
        self.player1 == address || self.player2 == address
    }

    /// Color played by `address`, if it is one of the two players.
    pub fn color_of(&self, address: &str) -> Option<PlayAs> {
        if self.player1 == address {
            Some(PlayAs::White)
        } else if self.player2 == address {
            Some(PlayAs::Black)
        } else {
            None
        }
    }

    pub fn is_over(&self) -> bool {
        self.status.is_some()
    }
}

/// List-view projection of a game, without the move list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChessGameSummary {
    pub game_id: u64,
    pub player1: String,
    pub player2: String,
    pub block_start: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_color: Option<PlayAs>,
}

impl ChessGameSummary {
    pub fn is_player(&self, address: &str) -> bool {
        self.player1 == address || self.player2 == address
    }

    /// True when the game is live and `address` holds the side to move.
    pub fn is_your_move(&self, address: &str) -> bool {
        if self.status.is_some() {
            return false;
        }
        match self.turn_color {
            Some(PlayAs::White) => self.player1 == address,
            Some(PlayAs::Black) => self.player2 == address,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChessRatingSummary {
    pub player: String,
    pub rating: f64,
}
