//! Quiz ledger server.
//!
//! Hosts a [`QuizContract`](crate::contract::QuizContract) over WebSocket.

mod server;
mod state;

pub use server::{run, seed_contract, serve, shutdown, ServerConfig, SharedState};
pub use state::{ServerState, Session};
