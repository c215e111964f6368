//! cosmos-chess: play chess against a CosmWasm contract from the terminal.

use std::sync::Arc;

use anyhow::Context;
use chess_core::summary::{sort_challenges_for, sort_games_for, sort_ratings};
use chess_core::PlayAs;
use chess_terminal::poller::{self, Command, Event, PollIntervals};
use chess_terminal::render::{render_challenges, render_game, render_games, render_ratings};
use chess_terminal::{AppConfig, GameSession};
use clap::{Parser, Subcommand};
use contract_client::daemon::DaemonSigner;
use contract_client::pagination::fetch_all_games;
use contract_client::{ChessContract, Connection, CreateChallenge, GamesFilter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cosmos-chess", version, about = "Chess on a CosmWasm contract")]
struct Cli {
    /// Keyring key to sign with. Overrides KEY_NAME.
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List games, newest first
    Games {
        /// Largest game id of the previous page
        #[arg(long)]
        after: Option<u64>,
        /// `true` for finished games, `false` for live ones. Defaults to
        /// finished with --mine and live otherwise.
        #[arg(long)]
        game_over: Option<bool>,
        /// Only games you play in
        #[arg(long)]
        mine: bool,
        /// Fetch every page
        #[arg(long)]
        all: bool,
    },
    /// List open challenges
    Challenges {
        #[arg(long)]
        after: Option<u64>,
        /// Only challenges created by or addressed to you
        #[arg(long)]
        mine: bool,
    },
    /// Player ratings
    Ratings,
    /// Show one game
    Game {
        id: u64,
        /// Print PGN instead of the board
        #[arg(long)]
        pgn: bool,
    },
    /// Follow a game and play moves interactively
    Watch { id: u64 },
    CreateChallenge {
        /// Restrict the challenge to one address
        #[arg(long)]
        opponent: Option<String>,
        #[arg(long)]
        play_as: Option<PlayAs>,
        /// Blocks each player may use over the whole game
        #[arg(long)]
        block_limit: Option<u64>,
    },
    AcceptChallenge { id: u64 },
    CancelChallenge { id: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if cli.key.is_some() {
        config.chain.key_name = cli.key.clone();
    }

    let mut connection = Connection::new(config.chain.rest_url.clone());
    if config.chain.key_name.is_some() {
        let signer = DaemonSigner::connect(&config.chain)
            .await
            .context("Failed to connect signer")?;
        connection.connect(Arc::new(signer));
    }
    let contract = Arc::new(ChessContract::new(
        connection,
        config.chain.contract_address.clone(),
    ));
    let me = contract.address().map(String::from);
    let me = me.as_deref();
    let spb = config.seconds_per_block;

    match cli.command {
        Commands::Games { after, game_over, mine, all } => {
            let filter = games_filter(after, game_over, mine, me);
            let mut games = if all {
                fetch_all_games(&contract, filter).await?
            } else {
                contract.get_games(filter).await?
            };
            sort_games_for(me, &mut games);
            print!("{}", render_games(&games, me, spb));
        }
        Commands::Challenges { after, mine } => {
            let player = if mine { me } else { None };
            let mut challenges = contract.get_challenges(after, player).await?;
            sort_challenges_for(me, &mut challenges);
            print!("{}", render_challenges(&challenges, me, spb));
        }
        Commands::Ratings => {
            let mut ratings = contract.get_ratings().await?;
            sort_ratings(&mut ratings);
            print!("{}", render_ratings(&ratings, me));
        }
        Commands::Game { id, pgn } => {
            let mut session = GameSession::new(contract.clone(), id, config.gas.clone());
            session.load().await?;
            match session.pgn() {
                Some(text) if pgn => println!("{text}"),
                _ => print!("{}", render_game(&session, spb)),
            }
        }
        Commands::Watch { id } => watch_game(contract.clone(), id, &config).await?,
        Commands::CreateChallenge { opponent, play_as, block_limit } => {
            let result = contract
                .create_challenge(CreateChallenge { opponent, play_as, block_limit }, None)
                .await?;
            println!("Challenge created in tx {}", result.transaction_hash);
        }
        Commands::AcceptChallenge { id } => {
            let result = contract.accept_challenge(id, None).await?;
            println!("Challenge {id} accepted in tx {}", result.transaction_hash);
        }
        Commands::CancelChallenge { id } => {
            let result = contract.cancel_challenge(id, None).await?;
            println!("Challenge {id} cancelled in tx {}", result.transaction_hash);
        }
    }

    Ok(())
}

async fn watch_game(contract: Arc<ChessContract>, id: u64, config: &AppConfig) -> anyhow::Result<()> {
    let (command_tx, command_rx) = mpsc::channel::<Command>(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let spb = config.seconds_per_block;

    let session = GameSession::new(contract, id, config.gas.clone());
    let intervals = PollIntervals {
        game: config.game_poll,
        turn: config.turn_poll,
    };
    let task = tokio::spawn(poller::run(
        session,
        intervals,
        command_rx,
        shutdown_rx,
        move |session, event| match event {
            Event::Command(Command::Pgn) => match session.pgn() {
                Some(pgn) => println!("{pgn}"),
                None => println!("Game not loaded"),
            },
            _ => print!("{}", render_game(session, spb)),
        },
    ));

    println!("Commands: move <san> | cancel | submit | offer-draw | accept-draw | resign | timeout | reload | pgn | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "q" {
                    break;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if command_tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{e}"),
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    task.await.context("Watch task failed")?;
    Ok(())
}

/// `--mine` without an identity lists everyone's games.
fn games_filter(after: Option<u64>, game_over: Option<bool>, mine: bool, me: Option<&str>) -> GamesFilter {
    GamesFilter {
        after,
        game_over,
        player: if mine { me.map(String::from) } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_games(args: &[&str]) -> GamesFilter {
        let cli = Cli::try_parse_from(["cosmos-chess", "games"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Games { after, game_over, mine, .. } => games_filter(after, game_over, mine, Some("juno1me")),
            _ => panic!("expected games"),
        }
    }

    #[test]
    fn test_games_filter_game_over_both_ways() {
        let mine = parse_games(&["--mine"]);
        assert_eq!(mine.game_over, None);
        assert_eq!(mine.player.as_deref(), Some("juno1me"));

        let live = parse_games(&["--mine", "--game-over", "false"]);
        assert_eq!(live.game_over, Some(false));
        assert_eq!(live.player.as_deref(), Some("juno1me"));

        let finished = parse_games(&["--game-over", "true", "--after", "25"]);
        assert_eq!(finished.game_over, Some(true));
        assert_eq!(finished.after, Some(25));
        assert_eq!(finished.player, None);
    }
}
