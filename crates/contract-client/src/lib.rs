//! Typed client for the chess CosmWasm contract.
//!
//! `ChessContract` turns each chess action and query into the contract's
//! JSON message shape and sends it through an injected [`Connection`].
//! The connection owns the two primitive capabilities: signed execution and
//! read-only smart queries.

pub mod config;
pub mod connection;
pub mod contract;
pub mod daemon;
pub mod error;
pub mod fee;
pub mod msg;
pub mod pagination;
pub mod rest;

pub use config::ChainConfig;
pub use connection::{Coin, Connection, ExecuteResult, Fee, QueryClient, SigningClient, StdFee};
pub use contract::{ChessContract, CreateChallenge, GamesFilter};
pub use error::ClientError;
pub use fee::GasTiers;
pub use pagination::{PageCursor, PAGE_SIZE};
