//! Plain-text views.

use std::fmt::Write;

use chess_core::block_time::format_block_time;
use chess_core::replay::MovePair;
use chess_core::summary::{format_game_status, player_label, ChallengeView};
use chess_core::{Challenge, ChessGameSummary, ChessRatingSummary, PlayAs, ReplayedGame};
use shakmaty::{File, Position, Rank, Square};

use crate::session::GameSession;

/// ASCII board, white pieces upper case. `orientation` is the side at the bottom.
pub fn render_board(board: &ReplayedGame, orientation: PlayAs) -> String {
    let pieces = board.position().board();
    let mut ranks: Vec<u32> = (0..8).collect();
    let mut files: Vec<u32> = (0..8).collect();
    match orientation {
        PlayAs::White => ranks.reverse(),
        PlayAs::Black => files.reverse(),
    }

    let mut out = String::new();
    for &rank in &ranks {
        let _ = write!(out, "{} ", rank + 1);
        for &file in &files {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let c = pieces.piece_at(square).map_or('.', |piece| piece.char());
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &files {
        out.push(' ');
        out.push(File::new(file).char());
    }
    out.push('\n');
    out
}

fn render_pair(pair: &MovePair<'_>) -> String {
    let mut line = format!("{:>3}. {:<8}", pair.number, pair.white.san);
    if let Some(black) = pair.black {
        line.push_str(&black.san);
    }
    line.trim_end().to_string()
}

pub fn render_moves(board: &ReplayedGame) -> String {
    let pairs = board.move_pairs();
    if pairs.is_empty() {
        return "no moves yet\n".to_string();
    }
    pairs.iter().map(|p| render_pair(p) + "\n").collect()
}

/// Full game view: header, messages, board, actions available, details and moves.
pub fn render_game(session: &GameSession, seconds_per_block: f64) -> String {
    let mut out = String::new();
    let me = session.address();

    let Some(snapshot) = session.snapshot() else {
        let _ = writeln!(out, "Game {}", session.game_id());
        if let Some(error) = session.error() {
            let _ = writeln!(out, "error: {error}");
        }
        return out;
    };
    let game = &snapshot.game;
    let turn = PlayAs::from(snapshot.replayed.turn());

    let _ = writeln!(
        out,
        "Game {} ({})",
        game.game_id,
        format_game_status(game.status.as_deref(), Some(turn))
    );
    if let Some(error) = session.error() {
        let _ = writeln!(out, "error: {error}");
    }
    if let Some(status) = session.status() {
        let _ = writeln!(out, "{status}");
    }
    out.push('\n');

    if let Some(board) = session.board() {
        out.push_str(&render_board(board, session.orientation()));
        out.push('\n');
    }

    if game.status.is_some() {
        out.push_str("Game over\n");
    } else {
        if let Some(pending) = session.pending_move() {
            let _ = writeln!(out, "Pending: {} (submit | offer-draw | cancel)", pending.san);
        }
        if session.draw_offered() {
            out.push_str("Draw offered (accept-draw)\n");
        }
        if session.is_interactive() {
            out.push_str("Your move\n");
        }
    }
    out.push('\n');

    let _ = writeln!(out, "White       {}", player_label(&game.player1, me));
    let _ = writeln!(out, "Black       {}", player_label(&game.player2, me));
    let _ = writeln!(
        out,
        "Block limit {} (entire game, per player)",
        format_block_time(game.block_limit, seconds_per_block)
    );
    out.push('\n');

    out.push_str("Moves\n");
    out.push_str(&render_moves(&snapshot.replayed));
    out
}

pub fn render_game_summary(game: &ChessGameSummary, me: Option<&str>, seconds_per_block: f64) -> String {
    let your_move = if me.is_some_and(|a| game.is_your_move(a)) {
        " (Your Move)"
    } else {
        ""
    };
    let mut line = format!(
        "#{:<5} {} vs {}  {}{}",
        game.game_id,
        player_label(&game.player1, me),
        player_label(&game.player2, me),
        format_game_status(game.status.as_deref(), game.turn_color),
        your_move
    );
    if game.block_limit.is_some() {
        let _ = write!(line, "  limit {}", format_block_time(game.block_limit, seconds_per_block));
    }
    line
}

pub fn render_games(games: &[ChessGameSummary], me: Option<&str>, seconds_per_block: f64) -> String {
    if games.is_empty() {
        return "no games\n".to_string();
    }
    games
        .iter()
        .map(|g| render_game_summary(g, me, seconds_per_block) + "\n")
        .collect()
}

pub fn render_challenge(challenge: &Challenge, me: Option<&str>, seconds_per_block: f64) -> String {
    let view = ChallengeView::new(challenge, me);
    let opponent = match challenge.opponent.as_deref() {
        Some(opponent) => player_label(opponent, me),
        None => "open",
    };
    let action = if view.can_cancel {
        "  [cancel]"
    } else if view.can_accept {
        "  [accept]"
    } else {
        ""
    };
    let mut line = format!(
        "#{:<5} {} ({}) vs {} ({})",
        challenge.challenge_id,
        player_label(&challenge.created_by, me),
        view.creator_color,
        opponent,
        view.opponent_color,
    );
    if challenge.block_limit.is_some() {
        let _ = write!(
            line,
            "  limit {}",
            format_block_time(challenge.block_limit, seconds_per_block)
        );
    }
    line.push_str(action);
    line
}

pub fn render_challenges(challenges: &[Challenge], me: Option<&str>, seconds_per_block: f64) -> String {
    if challenges.is_empty() {
        return "no challenges\n".to_string();
    }
    challenges
        .iter()
        .map(|c| render_challenge(c, me, seconds_per_block) + "\n")
        .collect()
}

pub fn render_ratings(ratings: &[ChessRatingSummary], me: Option<&str>) -> String {
    if ratings.is_empty() {
        return "no ratings\n".to_string();
    }
    ratings
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{:>3}. {:>7.1}  {}\n", i + 1, r.rating, player_label(&r.player, me)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{replay, Action, GameMove};

    #[test]
    fn test_start_board_white_bottom() {
        let board = replay(&[]).unwrap();
        let text = render_board(&board, PlayAs::White);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn test_board_black_bottom() {
        let board = replay(&[GameMove(1, Action::Move("e4".into()))]).unwrap();
        let text = render_board(&board, PlayAs::Black);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1  R N B K Q B N R");
        assert_eq!(lines[3], "4  . . . P . . . .");
        assert_eq!(lines[8], "   h g f e d c b a");
    }

    #[test]
    fn test_move_list() {
        assert_eq!(render_moves(&replay(&[]).unwrap()), "no moves yet\n");

        let moves: Vec<GameMove> = ["e4", "e5", "Nf3"]
            .iter()
            .map(|san| GameMove(1, Action::Move(san.to_string())))
            .collect();
        let text = render_moves(&replay(&moves).unwrap());
        assert_eq!(text, "  1. e4      e5\n  2. Nf3\n");
    }

    #[test]
    fn test_game_summary_line() {
        let game = ChessGameSummary {
            game_id: 12,
            player1: "juno1me".into(),
            player2: "juno1them".into(),
            block_start: 5,
            block_limit: Some(100),
            status: None,
            turn_color: Some(PlayAs::White),
        };
        assert_eq!(
            render_game_summary(&game, Some("juno1me"), 6.0),
            "#12    you vs juno1them  White to play (Your Move)  limit 100 (~10m)"
        );
    }

    #[test]
    fn test_open_challenge_line() {
        let challenge = Challenge {
            challenge_id: 3,
            created_by: "juno1them".into(),
            opponent: None,
            play_as: Some(PlayAs::White),
            block_created: 1,
            block_limit: None,
        };
        assert_eq!(
            render_challenge(&challenge, Some("juno1me"), 6.0),
            "#3     juno1them (white) vs open (black)  [accept]"
        );
    }

    #[test]
    fn test_ratings() {
        let ratings = vec![ChessRatingSummary { player: "juno1me".into(), rating: 1532.4 }];
        assert_eq!(render_ratings(&ratings, Some("juno1me")), "  1.  1532.4  you\n");
    }
}
