//! Terminal front end for the chess contract: game sessions, the watch loop
//! and plain-text rendering. The `cosmos-chess` binary wires them to a CLI.

pub mod config;
pub mod error;
pub mod poller;
pub mod render;
pub mod session;

pub use config::AppConfig;
pub use error::{ConfigError, SessionError};
pub use poller::{Command, Event, PollIntervals};
pub use session::GameSession;
