//! Game State Reconstructor.
//!
//! Replays the contract's recorded action list from the standard starting
//! position. The result is only ever a display cache: legality of new moves is
//! decided by the contract, never by this replay.

use shakmaty::san::{San, SanPlus};
use shakmaty::{Chess, Color, File, Move, Position, Role, Square};

use crate::error::ReplayError;
use crate::game_data::{Action, ChessGame, GameMove};
use crate::san::{from_contract_san, is_timeout_claim};

/// One half-move in the verbose history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 0-indexed half-move number.
    pub ply: usize,
    pub color: Color,
    /// SAN as the rules engine writes it, with `+`/`#` suffix.
    pub san: String,
    pub from: Option<Square>,
    /// King destination for castling, not the rook square.
    pub to: Square,
    pub role: Role,
    pub capture: Option<Role>,
    pub promotion: Option<Role>,
    /// Block the move was recorded at; `None` for a staged local move.
    pub block: Option<u64>,
    pub draw_offer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    DrawAccepted,
    Resigned,
    TimeoutClaimed,
}

/// Action that ended interpretation of the move list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminal {
    pub kind: TerminalKind,
    pub block: u64,
    /// Side to move when the action was recorded.
    pub side_to_move: Color,
}

/// Numbered row of the move list: white's move and black's reply, if any.
#[derive(Debug, Clone, Copy)]
pub struct MovePair<'a> {
    pub number: usize,
    pub white: &'a HistoryEntry,
    pub black: Option<&'a HistoryEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayedGame {
    position: Chess,
    history: Vec<HistoryEntry>,
    draw_offered: bool,
    ended_by: Option<Terminal>,
}

/// Replay a recorded move list.
///
/// Unparseable or illegal SAN is a hard error. So is any action recorded after
/// an accept-draw, resign or timeout claim.
pub fn replay(moves: &[GameMove]) -> Result<ReplayedGame, ReplayError> {
    let mut game = ReplayedGame::default();

    for (index, GameMove(block, action)) in moves.iter().enumerate() {
        if game.ended_by.is_some() {
            return Err(ReplayError::MovesAfterEnd { index });
        }
        match action {
            Action::Move(san) if is_timeout_claim(san) => {
                game.end(TerminalKind::TimeoutClaimed, *block);
            }
            Action::Move(san) => game.play(index, san, Some(*block), false)?,
            Action::OfferDraw(san) => game.play(index, san, Some(*block), true)?,
            Action::AcceptDraw => game.end(TerminalKind::DrawAccepted, *block),
            Action::Resign => game.end(TerminalKind::Resigned, *block),
        }
    }

    // Only one offer can be outstanding: it is pending iff it is the last action.
    game.draw_offered = moves.last().is_some_and(|m| m.action().is_offer_draw());

    Ok(game)
}

/// Replay a full game record and check it against the contract's own FEN when present.
pub fn replay_game(game: &ChessGame) -> Result<ReplayedGame, ReplayError> {
    let replayed = replay(&game.moves)?;
    if let Some(fen) = game.fen.as_deref() {
        replayed.verify_against_fen(fen)?;
    }
    Ok(replayed)
}

impl ReplayedGame {
    fn play(
        &mut self,
        index: usize,
        recorded: &str,
        block: Option<u64>,
        draw_offer: bool,
    ) -> Result<(), ReplayError> {
        let normalized = from_contract_san(recorded);
        let san_plus: SanPlus = normalized.parse().map_err(|e| ReplayError::InvalidSan {
            index,
            san: recorded.to_string(),
            reason: format!("{e}"),
        })?;

        let mv = san_plus
            .san
            .to_move(&self.position)
            .map_err(|e| ReplayError::IllegalMove {
                index,
                san: recorded.to_string(),
                reason: format!("{e}"),
            })?;

        self.push(&mv, block, draw_offer);
        Ok(())
    }

    fn push(&mut self, mv: &Move, block: Option<u64>, draw_offer: bool) {
        let color = self.position.turn();
        let mut san = San::from_move(&self.position, *mv).to_string();
        self.position.play_unchecked(*mv);

        if self.position.is_checkmate() {
            san.push('#');
        } else if self.position.is_check() {
            san.push('+');
        }

        self.history.push(HistoryEntry {
            ply: self.history.len(),
            color,
            san,
            from: mv.from(),
            to: display_to(mv),
            role: mv.role(),
            capture: mv.capture(),
            promotion: mv.promotion(),
            block,
            draw_offer,
        });
    }

    fn end(&mut self, kind: TerminalKind, block: u64) {
        self.ended_by = Some(Terminal {
            kind,
            block,
            side_to_move: self.position.turn(),
        });
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Side to move. Alternates strictly with the number of half-moves played.
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn draw_offered(&self) -> bool {
        self.draw_offered
    }

    pub fn ended_by(&self) -> Option<&Terminal> {
        self.ended_by.as_ref()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    /// Piece placement field of the FEN, e.g. `rnbqkbnr/pppppppp/8/...`.
    pub fn board_fen(&self) -> String {
        self.position.board().to_string()
    }

    /// SAN of every move the rules engine allows here. Display only.
    pub fn legal_sans(&self) -> Vec<String> {
        if self.ended_by.is_some() {
            return Vec::new();
        }
        self.position
            .legal_moves()
            .iter()
            .map(|m| San::from_move(&self.position, *m).to_string())
            .collect()
    }

    /// Squares the piece on `from` may move to. Used to decide which squares are selectable.
    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        if self.ended_by.is_some() {
            return Vec::new();
        }
        self.position
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(from))
            .map(display_to)
            .collect()
    }

    /// Copy of this game with one unsubmitted move applied on top.
    ///
    /// Fails when the local rules engine rejects the move. Success says
    /// nothing about whether the contract will accept it.
    pub fn with_pending(&self, san: &str) -> Result<ReplayedGame, ReplayError> {
        if self.ended_by.is_some() {
            return Err(ReplayError::GameOver);
        }
        let mut next = self.clone();
        next.play(self.history.len(), san, None, false)?;
        next.draw_offered = false;
        Ok(next)
    }

    /// Compare against a FEN reported by the contract. Only the piece placement
    /// and side-to-move fields are checked.
    pub fn verify_against_fen(&self, fen: &str) -> Result<(), ReplayError> {
        let mut fields = fen.split_whitespace();
        let board = fields.next().unwrap_or_default();
        let turn = fields.next().unwrap_or("w");
        let ours = self.board_fen();
        let our_turn = if self.turn() == Color::White { "w" } else { "b" };

        if board != ours || turn != our_turn {
            return Err(ReplayError::BoardMismatch {
                replayed: format!("{ours} {our_turn}"),
                reported: fen.to_string(),
            });
        }
        Ok(())
    }

    pub fn move_pairs(&self) -> Vec<MovePair<'_>> {
        self.history
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| MovePair {
                number: i + 1,
                white: &pair[0],
                black: pair.get(1),
            })
            .collect()
    }
}

/// Destination square as a player sees it. shakmaty encodes castling as king-takes-rook.
fn display_to(mv: &Move) -> Square {
    match mv {
        Move::Castle { king, rook } => {
            let to_file = if rook.file() > king.file() { 6u32 } else { 2u32 };
            Square::from_coords(File::new(to_file), king.rank())
        }
        other => other.to(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(block: u64, san: &str) -> GameMove {
        GameMove(block, Action::Move(san.to_string()))
    }

    #[test]
    fn test_empty_history_is_start_position() {
        let game = replay(&[]).unwrap();
        assert_eq!(game.turn(), Color::White);
        assert!(!game.draw_offered());
        assert!(game.history().is_empty());
        assert_eq!(game.board_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    }

    #[test]
    fn test_two_moves_white_to_play() {
        let game = replay(&[mv(10, "e4"), mv(12, "e5")]).unwrap();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.history()[1].block, Some(12));
        assert_eq!(game.history()[1].color, Color::Black);
        assert_eq!(game.history()[0].from, Some(Square::E2));
        assert_eq!(game.history()[0].to, Square::E4);
    }

    #[test]
    fn test_offer_draw_applies_its_move() {
        let moves = vec![mv(10, "e4"), mv(11, "e5"), GameMove(50, Action::OfferDraw("Qh5".into()))];
        let game = replay(&moves).unwrap();
        assert!(game.draw_offered());
        assert_eq!(game.history().len(), 3);
        assert!(game.history()[2].draw_offer);
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn test_accept_draw_clears_offer_and_ends() {
        let moves = vec![
            mv(10, "e4"),
            GameMove(50, Action::OfferDraw("e5".into())),
            GameMove(51, Action::AcceptDraw),
        ];
        let game = replay(&moves).unwrap();
        assert!(!game.draw_offered());
        let terminal = game.ended_by().unwrap();
        assert_eq!(terminal.kind, TerminalKind::DrawAccepted);
        assert_eq!(terminal.block, 51);
        assert!(game.legal_sans().is_empty());
    }

    #[test]
    fn test_recorded_castling_with_zeros() {
        let moves: Vec<GameMove> = ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "0-0"]
            .iter()
            .enumerate()
            .map(|(i, san)| mv(i as u64, san))
            .collect();
        let game = replay(&moves).unwrap();
        let last = game.history().last().unwrap();
        assert_eq!(last.san, "O-O");
        assert_eq!(last.to, Square::G1);
        assert_eq!(last.role, Role::King);
    }

    #[test]
    fn test_illegal_move_is_hard_error() {
        let err = replay(&[mv(1, "e4"), mv(2, "e4")]).unwrap_err();
        assert!(matches!(err, ReplayError::IllegalMove { index: 1, .. }));
    }

    #[test]
    fn test_garbage_san_is_hard_error() {
        let err = replay(&[mv(1, "zz9")]).unwrap_err();
        assert!(matches!(err, ReplayError::InvalidSan { index: 0, .. }));
    }

    #[test]
    fn test_actions_after_resign_rejected() {
        let err = replay(&[mv(1, "e4"), GameMove(2, Action::Resign), mv(3, "e5")]).unwrap_err();
        assert_eq!(err, ReplayError::MovesAfterEnd { index: 2 });
    }

    #[test]
    fn test_timeout_claim_ends_without_board_change() {
        let game = replay(&[mv(1, "e4"), mv(900, "timeout")]).unwrap();
        assert_eq!(game.history().len(), 1);
        let terminal = game.ended_by().unwrap();
        assert_eq!(terminal.kind, TerminalKind::TimeoutClaimed);
        assert_eq!(terminal.side_to_move, Color::Black);
    }

    #[test]
    fn test_check_and_mate_suffixes() {
        let moves: Vec<GameMove> = ["f3", "e5", "g4", "Qh4"]
            .iter()
            .enumerate()
            .map(|(i, san)| mv(i as u64, san))
            .collect();
        let game = replay(&moves).unwrap();
        assert_eq!(game.history()[3].san, "Qh4#");
        assert!(game.is_checkmate());
    }

    #[test]
    fn test_pending_move_does_not_touch_original() {
        let game = replay(&[mv(1, "e4")]).unwrap();
        let pending = game.with_pending("c5").unwrap();
        assert_eq!(pending.history().len(), 2);
        assert_eq!(pending.history()[1].block, None);
        assert_eq!(game.history().len(), 1);
        assert!(game.with_pending("Ke3").is_err());
    }

    #[test]
    fn test_legal_targets_from_knight() {
        let game = replay(&[]).unwrap();
        let mut targets = game.legal_targets(Square::G1);
        targets.sort();
        assert_eq!(targets, vec![Square::F3, Square::H3]);
        assert_eq!(game.legal_sans().len(), 20);
    }

    #[test]
    fn test_fen_mismatch_detected() {
        let game = replay(&[mv(1, "e4")]).unwrap();
        assert!(game
            .verify_against_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
            .is_ok());
        let err = game
            .verify_against_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap_err();
        assert!(matches!(err, ReplayError::BoardMismatch { .. }));
    }

    #[test]
    fn test_move_pairs_numbering() {
        let game = replay(&[mv(1, "d4"), mv(2, "d5"), mv(3, "c4")]).unwrap();
        let pairs = game.move_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].number, 2);
        assert_eq!(pairs[1].white.san, "c4");
        assert!(pairs[1].black.is_none());
    }
}
