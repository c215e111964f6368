//! One watched game: the last loaded snapshot plus the local pending-move slot.
//!
//! Every value here is re-derivable from the contract. A failed action leaves
//! the previous snapshot untouched and records the error for display.

use std::sync::Arc;

use chess_core::pgn::to_pgn;
use chess_core::replay::replay_game;
use chess_core::{ChessGame, PlayAs, ReplayedGame};
use contract_client::{ChessContract, Fee, GasTiers};
use tracing::{debug, info, warn};

use crate::error::SessionError;

/// Contract state as of the last successful load.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub game: ChessGame,
    pub replayed: ReplayedGame,
    pub fee: Fee,
}

/// A move checked by the contract but not yet submitted.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub san: String,
    /// Snapshot board with the move applied
    pub board: ReplayedGame,
}

pub struct GameSession {
    contract: Arc<ChessContract>,
    game_id: u64,
    gas: GasTiers,
    snapshot: Option<Snapshot>,
    pending: Option<PendingMove>,
    status: Option<String>,
    error: Option<String>,
    turn: bool,
}

impl GameSession {
    pub fn new(contract: Arc<ChessContract>, game_id: u64, gas: GasTiers) -> Self {
        Self {
            contract,
            game_id,
            gas,
            snapshot: None,
            pending: None,
            status: None,
            error: None,
            turn: false,
        }
    }

    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    pub fn address(&self) -> Option<&str> {
        self.contract.address()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn pending_move(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last `get_turn` answer.
    pub fn is_turn(&self) -> bool {
        self.turn
    }

    /// Board to display: the pending move's board when one is staged.
    pub fn board(&self) -> Option<&ReplayedGame> {
        match (&self.pending, &self.snapshot) {
            (Some(pending), _) => Some(&pending.board),
            (None, Some(snapshot)) => Some(&snapshot.replayed),
            (None, None) => None,
        }
    }

    pub fn draw_offered(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.replayed.draw_offered())
    }

    pub fn is_interactive(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| {
            is_interactive(&s.game, &s.replayed, self.address(), self.pending.is_some())
        })
    }

    pub fn orientation(&self) -> PlayAs {
        match &self.snapshot {
            Some(s) => orientation(&s.game, self.address()),
            None => PlayAs::White,
        }
    }

    pub fn pgn(&self) -> Option<String> {
        self.snapshot.as_ref().map(|s| to_pgn(&s.game, &s.replayed))
    }

    /// Fetch and replay the game. Clears any pending move on success.
    ///
    /// A history that does not replay drops the snapshot, since the last good
    /// position no longer matches the contract. Other failures keep it.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        self.set_status("Loading game");
        let result = self.fetch().await;
        match result {
            Ok(snapshot) => {
                debug!(
                    game_id = self.game_id,
                    moves = snapshot.game.moves.len(),
                    "Game loaded"
                );
                self.snapshot = Some(snapshot);
                self.pending = None;
                self.status = None;
                Ok(())
            }
            Err(e @ SessionError::Replay(_)) => {
                self.snapshot = None;
                self.pending = None;
                self.fail(e)
            }
            Err(e) => self.fail(e),
        }
    }

    async fn fetch(&self) -> Result<Snapshot, SessionError> {
        let game = self.contract.get_game(self.game_id).await?;
        let replayed = replay_game(&game)?;
        let fee = self.gas.estimate(game.moves.len());
        Ok(Snapshot { game, replayed, fee })
    }

    /// Cheap turn check. Reloads the game when the flag flips and reports
    /// whether it did.
    pub async fn poll_turn(&mut self) -> bool {
        let Some(address) = self.address().map(String::from) else {
            return false;
        };

        let turn = match self.contract.get_turn(self.game_id, &address).await {
            Ok(turn) => turn,
            Err(e) => {
                debug!(game_id = self.game_id, error = %e, "Turn check failed");
                false
            }
        };

        if turn == self.turn {
            return false;
        }
        self.turn = turn;
        info!(game_id = self.game_id, turn, "Turn changed");
        // Load failures are recorded on the session.
        let _ = self.load().await;
        true
    }

    /// Stage a move. The local rules engine only decides what can be shown;
    /// the move is staged only when the contract says it is valid.
    pub async fn propose_move(&mut self, san: &str) -> Result<(), SessionError> {
        let result = self.check_move(san).await;
        match result {
            Ok(pending) => {
                info!(game_id = self.game_id, san = %pending.san, "Move staged");
                self.set_status(&format!("Pending move {}", pending.san));
                self.pending = Some(pending);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    async fn check_move(&self, san: &str) -> Result<PendingMove, SessionError> {
        let snapshot = self.snapshot.as_ref().ok_or(SessionError::NotLoaded)?;
        if self.pending.is_some() {
            return Err(SessionError::MovePending);
        }
        if !self.is_interactive() {
            return Err(SessionError::NotInteractive);
        }
        let address = self.address().ok_or(SessionError::NotAPlayer)?;

        let board = snapshot.replayed.with_pending(san)?;
        let canonical = board
            .history()
            .last()
            .map(|entry| entry.san.clone())
            .unwrap_or_else(|| san.to_string());

        if !self.contract.valid_move(self.game_id, address, &canonical).await? {
            return Err(SessionError::Rejected(canonical));
        }
        Ok(PendingMove { san: canonical, board })
    }

    /// Drop the pending move and show the snapshot board again.
    pub fn cancel_move(&mut self) -> Result<(), SessionError> {
        match self.pending.take() {
            Some(pending) => {
                debug!(game_id = self.game_id, san = %pending.san, "Pending move cancelled");
                self.status = None;
                self.error = None;
                Ok(())
            }
            None => self.fail(SessionError::NoPendingMove),
        }
    }

    pub async fn submit_move(&mut self) -> Result<(), SessionError> {
        let (san, fee) = match self.staged() {
            Ok(staged) => staged,
            Err(e) => return self.fail(e),
        };
        self.set_status(&format!("Executing move ({san})"));
        let result = self.contract.make_move(self.game_id, &san, Some(fee)).await;
        self.after_execute(result).await
    }

    /// Submit the pending move together with a draw offer.
    pub async fn offer_draw(&mut self) -> Result<(), SessionError> {
        if self.draw_offered() {
            return self.fail(SessionError::DrawAlreadyOffered);
        }
        let (san, fee) = match self.staged() {
            Ok(staged) => staged,
            Err(e) => return self.fail(e),
        };
        self.set_status(&format!("Executing offer draw ({san})"));
        let result = self.contract.offer_draw(self.game_id, &san, Some(fee)).await;
        self.after_execute(result).await
    }

    pub async fn accept_draw(&mut self) -> Result<(), SessionError> {
        let fee = match self.live_fee_if(self.draw_offered(), SessionError::NoDrawOffer) {
            Ok(fee) => fee,
            Err(e) => return self.fail(e),
        };
        self.set_status("Executing accept draw");
        let result = self.contract.accept_draw(self.game_id, Some(fee)).await;
        self.after_execute(result).await
    }

    pub async fn resign(&mut self) -> Result<(), SessionError> {
        let fee = match self.live_fee_if(self.is_interactive(), SessionError::NotInteractive) {
            Ok(fee) => fee,
            Err(e) => return self.fail(e),
        };
        self.set_status("Executing resign");
        let result = self.contract.resign(self.game_id, Some(fee)).await;
        self.after_execute(result).await
    }

    /// Claim the opponent ran out of blocks. Needs a block limit, at least one
    /// recorded move, and a player identity.
    pub async fn declare_timeout(&mut self) -> Result<(), SessionError> {
        let fee = match self.timeout_fee() {
            Ok(fee) => fee,
            Err(e) => return self.fail(e),
        };
        self.set_status("Declaring timeout");
        let result = self.contract.declare_timeout(self.game_id, Some(fee)).await;
        self.after_execute(result).await
    }

    fn timeout_fee(&self) -> Result<Fee, SessionError> {
        let fee = self.live_fee()?;
        let game = &self.loaded()?.game;
        if game.block_limit.is_none() {
            return Err(SessionError::NoBlockLimit);
        }
        if game.moves.is_empty() {
            return Err(SessionError::NotStarted);
        }
        if !self.address().is_some_and(|a| game.is_player(a)) {
            return Err(SessionError::NotAPlayer);
        }
        Ok(fee)
    }

    fn loaded(&self) -> Result<&Snapshot, SessionError> {
        self.snapshot.as_ref().ok_or(SessionError::NotLoaded)
    }

    /// Fee estimate for a game that is still in progress.
    fn live_fee(&self) -> Result<Fee, SessionError> {
        let snapshot = self.loaded()?;
        if snapshot.game.is_over() || snapshot.replayed.ended_by().is_some() {
            return Err(SessionError::GameOver);
        }
        Ok(snapshot.fee.clone())
    }

    fn live_fee_if(&self, allowed: bool, otherwise: SessionError) -> Result<Fee, SessionError> {
        let fee = self.live_fee()?;
        if !allowed {
            return Err(otherwise);
        }
        Ok(fee)
    }

    fn staged(&self) -> Result<(String, Fee), SessionError> {
        let fee = self.live_fee()?;
        let pending = self.pending.as_ref().ok_or(SessionError::NoPendingMove)?;
        Ok((pending.san.clone(), fee))
    }

    async fn after_execute<T>(
        &mut self,
        result: Result<T, contract_client::ClientError>,
    ) -> Result<(), SessionError> {
        match result {
            Ok(_) => self.load().await,
            Err(e) => self.fail(e.into()),
        }
    }

    fn set_status(&mut self, status: &str) {
        self.status = Some(status.to_string());
        self.error = None;
    }

    fn fail(&mut self, error: SessionError) -> Result<(), SessionError> {
        warn!(game_id = self.game_id, error = %error, "Game action failed");
        self.error = Some(error.to_string());
        self.status = None;
        Err(error)
    }
}

/// A player may act when it holds the side to move, the game is live and no
/// move is pending.
pub fn is_interactive(
    game: &ChessGame,
    replayed: &ReplayedGame,
    address: Option<&str>,
    has_pending: bool,
) -> bool {
    if game.is_over() || replayed.ended_by().is_some() || has_pending {
        return false;
    }
    let Some(address) = address else {
        return false;
    };
    game.color_of(address) == Some(PlayAs::from(replayed.turn()))
}

/// Black at the bottom only for `player2`; everyone else sees white at the bottom.
pub fn orientation(game: &ChessGame, address: Option<&str>) -> PlayAs {
    if address == Some(game.player2.as_str()) {
        PlayAs::Black
    } else {
        PlayAs::White
    }
}
