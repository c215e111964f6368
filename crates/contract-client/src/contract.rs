use chess_core::san::to_contract_san;
use chess_core::{Action, Challenge, ChessGame, ChessGameSummary, ChessRatingSummary, PlayAs};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::connection::{Connection, ExecuteResult, Fee};
use crate::error::Result;
use crate::msg::{ExecuteMsg, QueryMsg};

/// Options for a new challenge. All fields are passed through unvalidated;
/// the contract rejects anything it does not accept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateChallenge {
    /// `None` leaves the challenge open to anyone
    pub opponent: Option<String>,
    /// `None` lets the contract pick a color
    pub play_as: Option<PlayAs>,
    pub block_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamesFilter {
    /// Largest game id of the previous page
    pub after: Option<u64>,
    /// Defaults to `player.is_some()` when unset
    pub game_over: Option<bool>,
    pub player: Option<String>,
}

/// Typed wrapper around the chess contract.
pub struct ChessContract {
    connection: Connection,
    contract: String,
}

impl ChessContract {
    pub fn new(connection: Connection, contract: impl Into<String>) -> Self {
        Self {
            connection,
            contract: contract.into(),
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract
    }

    /// Address of the connected identity, if any.
    pub fn address(&self) -> Option<&str> {
        self.connection.address()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    async fn execute(&self, msg: ExecuteMsg, fee: Option<Fee>) -> Result<ExecuteResult> {
        let value = serde_json::to_value(&msg)?;
        info!(contract = %self.contract, msg = %value, "Executing");
        let result = self
            .connection
            .execute(&self.contract, &value, fee, None, &[])
            .await?;
        info!(hash = %result.transaction_hash, height = result.height, "Executed");
        Ok(result)
    }

    async fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> Result<T> {
        let value = serde_json::to_value(&msg)?;
        debug!(contract = %self.contract, query = %value, "Querying");
        let response = self.connection.query(&self.contract, &value).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Every execute takes an optional fee; `None` uses the connection default.
    pub async fn create_challenge(&self, options: CreateChallenge, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.execute(
            ExecuteMsg::CreateChallenge {
                opponent: options.opponent,
                play_as: options.play_as,
                block_limit: options.block_limit,
            },
            fee,
        )
        .await
    }

    pub async fn accept_challenge(&self, challenge_id: u64, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.execute(ExecuteMsg::AcceptChallenge { challenge_id }, fee).await
    }

    /// Only the creator can cancel; the contract enforces it.
    pub async fn cancel_challenge(&self, challenge_id: u64, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.execute(ExecuteMsg::CancelChallenge { challenge_id }, fee).await
    }

    async fn turn(&self, game_id: u64, action: Action, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.execute(ExecuteMsg::Turn { game_id, action }, fee).await
    }

    /// Submit a move. Castling is rewritten to the contract's `0-0` spelling.
    pub async fn make_move(&self, game_id: u64, san: &str, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.turn(game_id, Action::Move(to_contract_san(san)), fee).await
    }

    /// Submit a move together with a draw offer.
    pub async fn offer_draw(&self, game_id: u64, san: &str, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.turn(game_id, Action::OfferDraw(to_contract_san(san)), fee).await
    }

    pub async fn accept_draw(&self, game_id: u64, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.turn(game_id, Action::AcceptDraw, fee).await
    }

    pub async fn resign(&self, game_id: u64, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.turn(game_id, Action::Resign, fee).await
    }

    /// Claim that the opponent ran out of blocks.
    pub async fn declare_timeout(&self, game_id: u64, fee: Option<Fee>) -> Result<ExecuteResult> {
        self.turn(
            game_id,
            Action::Move(chess_core::san::TIMEOUT_CLAIM.to_string()),
            fee,
        )
        .await
    }

    pub async fn get_challenges(&self, after: Option<u64>, player: Option<&str>) -> Result<Vec<Challenge>> {
        self.query(QueryMsg::GetChallenges {
            after,
            player: player.map(String::from),
        })
        .await
    }

    pub async fn get_games(&self, filter: GamesFilter) -> Result<Vec<ChessGameSummary>> {
        let game_over = filter.game_over.unwrap_or(filter.player.is_some());
        self.query(QueryMsg::GetGames {
            after: filter.after,
            game_over,
            player: filter.player,
        })
        .await
    }

    pub async fn get_game(&self, game_id: u64) -> Result<ChessGame> {
        self.query(QueryMsg::GetGame { game_id }).await
    }

    /// Whether it is `player`'s turn. Cheaper than reloading the game.
    pub async fn get_turn(&self, game_id: u64, player: &str) -> Result<bool> {
        self.query(QueryMsg::GetTurn {
            game_id,
            player: player.to_string(),
        })
        .await
    }

    /// The contract's verdict on a move. This, not the local rules engine,
    /// decides whether a move may be staged.
    pub async fn valid_move(&self, game_id: u64, player: &str, san: &str) -> Result<bool> {
        self.query(QueryMsg::ValidMove {
            game_id,
            player: player.to_string(),
            san: to_contract_san(san),
        })
        .await
    }

    pub async fn get_ratings(&self) -> Result<Vec<ChessRatingSummary>> {
        self.query(QueryMsg::GetRatings {}).await
    }
}
