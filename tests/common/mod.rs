#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chess_core::san::{from_contract_san, is_timeout_claim};
use chess_core::{replay, Action, ChessGame, ChessGameSummary, GameMove, PlayAs};
use contract_client::connection::{Coin, ExecuteResult, Fee, QueryClient, SigningClient};
use contract_client::msg::{ExecuteMsg, QueryMsg};
use contract_client::{ChessContract, ClientError, Connection, PAGE_SIZE};
use serde_json::{json, Value};

pub const WHITE: &str = "juno1white0000";
pub const BLACK: &str = "juno1black0000";
pub const SPECTATOR: &str = "juno1watcher00";
pub const CONTRACT: &str = "juno1chesscontract";

#[derive(Default)]
struct State {
    games: BTreeMap<u64, ChessGame>,
    block: u64,
    executed: Vec<Value>,
    fees: Vec<Fee>,
    queried: Vec<Value>,
    reject_moves: bool,
}

/// In-memory stand-in for the chess contract behind a signing identity.
///
/// Turns are checked with the local rules engine, which is good enough to
/// drive the client through realistic flows.
#[derive(Clone)]
pub struct MockChain {
    address: String,
    state: Arc<Mutex<State>>,
}

impl MockChain {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            state: Arc::new(Mutex::new(State {
                block: 100,
                ..Default::default()
            })),
        }
    }

    /// Same chain, different signing identity.
    pub fn as_identity(&self, address: &str) -> Self {
        Self {
            address: address.to_string(),
            state: self.state.clone(),
        }
    }

    pub fn contract(&self) -> ChessContract {
        let mut connection = Connection::new("http://unused");
        connection.connect(Arc::new(self.clone()));
        ChessContract::new(connection, CONTRACT)
    }

    /// Contract handle with no signing identity.
    pub fn read_only_contract(&self) -> ChessContract {
        let connection = Connection::new("http://unused").with_query_client(Arc::new(self.clone()));
        ChessContract::new(connection, CONTRACT)
    }

    pub fn add_game(&self, game_id: u64, moves: &[&str], block_limit: Option<u64>) {
        let moves = moves
            .iter()
            .enumerate()
            .map(|(i, san)| GameMove(10 + i as u64, Action::Move(san.to_string())))
            .collect();
        self.insert_game(ChessGame {
            game_id,
            player1: WHITE.to_string(),
            player2: BLACK.to_string(),
            block_start: 1,
            block_limit,
            moves,
            status: None,
            fen: None,
        });
    }

    pub fn insert_game(&self, game: ChessGame) {
        self.state.lock().unwrap().games.insert(game.game_id, game);
    }

    pub fn remove_game(&self, game_id: u64) {
        self.state.lock().unwrap().games.remove(&game_id);
    }

    pub fn game(&self, game_id: u64) -> ChessGame {
        self.state.lock().unwrap().games[&game_id].clone()
    }

    pub fn executed(&self) -> Vec<Value> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn fees(&self) -> Vec<Fee> {
        self.state.lock().unwrap().fees.clone()
    }

    pub fn queried(&self) -> Vec<Value> {
        self.state.lock().unwrap().queried.clone()
    }

    /// Make `valid_move` answer false for everything.
    pub fn reject_moves(&self) {
        self.state.lock().unwrap().reject_moves = true;
    }

    fn summary(game: &ChessGame) -> ChessGameSummary {
        let turn_color = replay(&game.moves).ok().map(|r| PlayAs::from(r.turn()));
        ChessGameSummary {
            game_id: game.game_id,
            player1: game.player1.clone(),
            player2: game.player2.clone(),
            block_start: game.block_start,
            block_limit: game.block_limit,
            status: game.status.clone(),
            turn_color,
        }
    }

    fn side_to_move(game: &ChessGame) -> Option<PlayAs> {
        if game.status.is_some() {
            return None;
        }
        replay(&game.moves).ok().map(|r| PlayAs::from(r.turn()))
    }

    fn handle_query(state: &State, msg: QueryMsg) -> Result<Value, ClientError> {
        let not_found = || ClientError::Contract("Game not found".to_string());
        match msg {
            QueryMsg::GetGame { game_id } => {
                let game = state.games.get(&game_id).ok_or_else(not_found)?;
                Ok(serde_json::to_value(game)?)
            }
            QueryMsg::GetGames { after, game_over, player } => {
                let page: Vec<ChessGameSummary> = state
                    .games
                    .values()
                    .filter(|g| after.map_or(true, |a| g.game_id > a))
                    .filter(|g| g.is_over() == game_over)
                    .filter(|g| player.as_deref().map_or(true, |p| g.is_player(p)))
                    .take(PAGE_SIZE)
                    .map(Self::summary)
                    .collect();
                Ok(serde_json::to_value(page)?)
            }
            QueryMsg::GetTurn { game_id, player } => {
                let game = state.games.get(&game_id).ok_or_else(not_found)?;
                let turn = Self::side_to_move(game).is_some_and(|c| game.color_of(&player) == Some(c));
                Ok(json!(turn))
            }
            QueryMsg::ValidMove { game_id, player, san } => {
                let game = state.games.get(&game_id).ok_or_else(not_found)?;
                let to_move = Self::side_to_move(game).is_some_and(|c| game.color_of(&player) == Some(c));
                let legal = replay(&game.moves)
                    .and_then(|r| r.with_pending(&from_contract_san(&san)))
                    .is_ok();
                Ok(json!(!state.reject_moves && to_move && legal))
            }
            QueryMsg::GetChallenges { .. } => Ok(json!([])),
            QueryMsg::GetRatings {} => Ok(json!([
                {"player": WHITE, "rating": 1500.0},
                {"player": BLACK, "rating": 1620.5}
            ])),
        }
    }

    fn handle_turn(&self, state: &mut State, game_id: u64, action: Action) -> Result<(), ClientError> {
        state.block += 1;
        let block = state.block;
        let game = state
            .games
            .get_mut(&game_id)
            .ok_or_else(|| ClientError::Contract("Game not found".to_string()))?;
        if game.status.is_some() {
            return Err(ClientError::Contract("Game is over".to_string()));
        }
        let color = game
            .color_of(&self.address)
            .ok_or_else(|| ClientError::Contract("Not a player".to_string()))?;

        let status = match &action {
            Action::Move(san) if is_timeout_claim(san) => Some("timeout".to_string()),
            Action::Move(_) | Action::OfferDraw(_) => {
                if Self::side_to_move(game) != Some(color) {
                    return Err(ClientError::Contract("Not your turn".to_string()));
                }
                None
            }
            Action::AcceptDraw => Some("draw".to_string()),
            Action::Resign => Some(format!("{color}_resigned")),
        };

        game.moves.push(GameMove(block, action));
        if replay(&game.moves).is_err() {
            game.moves.pop();
            return Err(ClientError::Contract("Invalid move".to_string()));
        }
        game.status = status;
        Ok(())
    }
}

#[async_trait]
impl QueryClient for MockChain {
    async fn query_contract_smart(&self, contract: &str, msg: &Value) -> Result<Value, ClientError> {
        assert_eq!(contract, CONTRACT);
        let mut state = self.state.lock().unwrap();
        state.queried.push(msg.clone());
        let parsed: QueryMsg = serde_json::from_value(msg.clone())?;
        Self::handle_query(&state, parsed)
    }
}

#[async_trait]
impl SigningClient for MockChain {
    fn address(&self) -> &str {
        &self.address
    }

    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(
        &self,
        sender: &str,
        contract: &str,
        msg: &Value,
        fee: &Fee,
        _memo: Option<&str>,
        _funds: &[Coin],
    ) -> Result<ExecuteResult, ClientError> {
        assert_eq!(sender, self.address);
        assert_eq!(contract, CONTRACT);
        let mut state = self.state.lock().unwrap();
        state.executed.push(msg.clone());
        state.fees.push(fee.clone());

        if let ExecuteMsg::Turn { game_id, action } = serde_json::from_value(msg.clone())? {
            self.handle_turn(&mut state, game_id, action)?;
        }

        Ok(ExecuteResult {
            transaction_hash: format!("TX{}", state.executed.len()),
            height: state.block,
            gas_used: 150_000,
            gas_wanted: 200_000,
            raw_log: String::new(),
        })
    }
}
