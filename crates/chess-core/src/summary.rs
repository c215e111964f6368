//! Display helpers and list ordering for games, challenges and ratings.

use std::cmp::Ordering;

use crate::game_data::{Challenge, ChessGameSummary, ChessRatingSummary, PlayAs};

/// `"White resigned"` from `"white_resigned"`, or `"Black to play"` for a live game.
///
/// Only the first underscore is replaced, matching how the contract's status
/// strings have always been shown.
pub fn format_game_status(status: Option<&str>, turn_color: Option<PlayAs>) -> String {
    let text = match status {
        Some(status) => status.replacen('_', " ", 1),
        None => format!("{} to play", turn_color.unwrap_or(PlayAs::White)),
    };
    capitalize(&text)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"you"` for the active identity, the address otherwise.
pub fn player_label<'a>(address: &'a str, me: Option<&str>) -> &'a str {
    if me == Some(address) {
        "you"
    } else {
        address
    }
}

/// Player's own games first, then newest first.
pub fn sort_games_for(address: Option<&str>, games: &mut [ChessGameSummary]) {
    let address = address.unwrap_or("none");
    games.sort_by(|a, b| {
        involved_first(a.is_player(address), b.is_player(address))
            .then_with(|| b.game_id.cmp(&a.game_id))
    });
}

/// Challenges created by or addressed to the player first, then newest first.
pub fn sort_challenges_for(address: Option<&str>, challenges: &mut [Challenge]) {
    let address = address.unwrap_or("none");
    let involves = |c: &Challenge| {
        c.created_by == address || c.opponent.as_deref() == Some(address)
    };
    challenges.sort_by(|a, b| {
        involved_first(involves(a), involves(b)).then_with(|| b.challenge_id.cmp(&a.challenge_id))
    });
}

/// Highest rating first; ties broken by address so the order is stable across polls.
pub fn sort_ratings(ratings: &mut [ChessRatingSummary]) {
    ratings.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player.cmp(&b.player))
    });
}

fn involved_first(a: bool, b: bool) -> Ordering {
    match (a, b) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// How a challenge reads from one identity's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeView {
    pub creator_color: String,
    pub opponent_color: String,
    pub can_accept: bool,
    pub can_cancel: bool,
}

impl ChallengeView {
    pub fn new(challenge: &Challenge, address: Option<&str>) -> Self {
        let (creator_color, opponent_color) = match challenge.play_as {
            Some(color) => (color.to_string(), color.opposite().to_string()),
            None => ("random color".to_string(), "random color".to_string()),
        };

        let is_creator = address.is_some_and(|a| a == challenge.created_by);
        let open_to = match (address, challenge.opponent.as_deref()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(a), Some(opponent)) => a == opponent,
        };

        Self {
            creator_color,
            opponent_color,
            can_accept: !is_creator && open_to,
            can_cancel: is_creator,
        }
    }
}
