//! Watch loop for one game.
//!
//! A single task owns the session and selects over the coarse reload tick,
//! the turn tick, user commands and shutdown. When the task ends its
//! in-flight requests are dropped with it, so late results never reach state.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::session::GameSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Propose(String),
    Cancel,
    Submit,
    OfferDraw,
    AcceptDraw,
    Resign,
    DeclareTimeout,
    Reload,
    Pgn,
}

impl std::str::FromStr for Command {
    type Err = String;

    /// Parse one line of user input, e.g. `move e4` or `offer-draw`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or_else(|| "Empty command".to_string())?;
        let command = match command {
            "move" | "m" => {
                let san = words.next().ok_or_else(|| "Usage: move <san>".to_string())?;
                Command::Propose(san.to_string())
            }
            "cancel" => Command::Cancel,
            "submit" => Command::Submit,
            "offer-draw" => Command::OfferDraw,
            "accept-draw" => Command::AcceptDraw,
            "resign" => Command::Resign,
            "timeout" => Command::DeclareTimeout,
            "reload" => Command::Reload,
            "pgn" => Command::Pgn,
            other => return Err(format!("Unknown command '{other}'")),
        };
        if words.next().is_some() {
            return Err(format!("Unexpected arguments to '{command:?}'"));
        }
        Ok(command)
    }
}

/// What caused a state change handed to the observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Reloaded,
    TurnChanged,
    Command(Command),
}

#[derive(Debug, Clone, Copy)]
pub struct PollIntervals {
    pub game: Duration,
    pub turn: Duration,
}

/// Run until shutdown is signalled or the command channel closes, calling
/// `on_change` after every state change. Returns the session for inspection.
pub async fn run<F>(
    mut session: GameSession,
    intervals: PollIntervals,
    mut commands: mpsc::Receiver<Command>,
    mut shutdown: watch::Receiver<bool>,
    mut on_change: F,
) -> GameSession
where
    F: FnMut(&GameSession, Event),
{
    let mut game_tick = tokio::time::interval(intervals.game);
    game_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut turn_tick = tokio::time::interval(intervals.turn);
    turn_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(game_id = session.game_id(), "Watching game");

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                // Failures are recorded on the session and shown by the observer.
                let _ = apply(&mut session, &command).await;
                on_change(&session, Event::Command(command));
            }
            _ = game_tick.tick() => {
                // A reload would discard the staged move.
                if session.pending_move().is_some() {
                    debug!(game_id = session.game_id(), "Skipping reload while a move is pending");
                    continue;
                }
                let _ = session.load().await;
                on_change(&session, Event::Reloaded);
            }
            _ = turn_tick.tick() => {
                if session.poll_turn().await {
                    on_change(&session, Event::TurnChanged);
                }
            }
        }
    }

    info!(game_id = session.game_id(), "Stopped watching game");
    session
}

async fn apply(session: &mut GameSession, command: &Command) -> Result<(), crate::error::SessionError> {
    match command {
        Command::Propose(san) => session.propose_move(san).await,
        Command::Cancel => session.cancel_move(),
        Command::Submit => session.submit_move().await,
        Command::OfferDraw => session.offer_draw().await,
        Command::AcceptDraw => session.accept_draw().await,
        Command::Resign => session.resign().await,
        Command::DeclareTimeout => session.declare_timeout().await,
        Command::Reload => session.load().await,
        Command::Pgn => Ok(()),
    }
}
