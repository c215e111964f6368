//! PGN export of a reconstructed game.

use shakmaty::Color;

use crate::game_data::ChessGame;
use crate::replay::{ReplayedGame, TerminalKind};

/// Result tag derived from the replayed position and terminating action.
///
/// Contract status strings are free-form, so anything the replay cannot
/// establish on its own is reported as `*`.
pub fn result_tag(replayed: &ReplayedGame) -> &'static str {
    if replayed.is_checkmate() {
        // Side to move is the side that got mated.
        return loser_to_result(replayed.turn());
    }
    if replayed.is_stalemate() {
        return "1/2-1/2";
    }
    match replayed.ended_by() {
        Some(t) if t.kind == TerminalKind::DrawAccepted => "1/2-1/2",
        Some(t) => loser_to_result(t.side_to_move),
        None => "*",
    }
}

fn loser_to_result(loser: Color) -> &'static str {
    match loser {
        Color::White => "0-1",
        Color::Black => "1-0",
    }
}

/// Render a game as PGN with the seven-tag roster cut down to what the contract knows.
pub fn to_pgn(game: &ChessGame, replayed: &ReplayedGame) -> String {
    let result = result_tag(replayed);
    let mut out = String::new();

    out.push_str(&format!("[Event \"Cosmos Chess Game #{}\"]\n", game.game_id));
    out.push_str(&format!("[White \"{}\"]\n", game.player1));
    out.push_str(&format!("[Black \"{}\"]\n", game.player2));
    out.push_str(&format!("[Result \"{result}\"]\n"));
    if let Some(status) = &game.status {
        out.push_str(&format!("[Termination \"{status}\"]\n"));
    }
    out.push('\n');

    let mut line = String::new();
    for pair in replayed.move_pairs() {
        let mut token = format!("{}. {}", pair.number, pair.white.san);
        if let Some(black) = pair.black {
            token.push(' ');
            token.push_str(&black.san);
        }
        if !line.is_empty() && line.len() + token.len() + 1 > 80 {
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&token);
    }
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(result);
    out.push_str(&line);
    out.push('\n');

    out
}
