//! # near-quiz
//!
//! A quiz ledger with prizes and limited tries, served over WebSocket, and a
//! terminal client for answering its quizzes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use near_quiz::server::{self, ServerConfig};
//! use near_quiz::QuizError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     server::run(ServerConfig {
//!         port: near_quiz::protocol::DEFAULT_PORT,
//!         owner_id: "owner.near".to_string(),
//!         quizzes_path: Some("quizzes.json".into()),
//!     })
//!     .await
//! }
//! ```

pub mod client;
pub mod contract;
mod data;
mod models;
pub mod protocol;
pub mod server;
pub mod terminal;

use std::io;

pub use client::{ConnectError, ContractApi, QuizView, SubmitFailure};
pub use contract::{CallError, ContractError, QuizContract};
pub use data::{load_quiz_definitions, LoadError};
pub use models::{JsonQuiz, PublishedQuizzes, Quiz, QuizDefinition, QuizStatus};

/// Error type for running the server or the client.
#[derive(Debug)]
pub enum QuizError {
    /// Error loading quiz definitions from file.
    Load(LoadError),
    /// The ledger refused a quiz definition.
    Contract(ContractError),
    /// Could not connect to or join the server.
    Connect(ConnectError),
    /// Invalid command-line settings.
    Config(String),
    /// IO error while serving or drawing.
    Io(io::Error),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Load(e) => write!(f, "Failed to load quizzes: {}", e),
            QuizError::Contract(e) => write!(f, "Contract error: {}", e),
            QuizError::Connect(e) => write!(f, "{}", e),
            QuizError::Config(msg) => write!(f, "{}", msg),
            QuizError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Load(e) => Some(e),
            QuizError::Contract(e) => Some(e),
            QuizError::Connect(e) => Some(e),
            QuizError::Config(_) => None,
            QuizError::Io(e) => Some(e),
        }
    }
}

impl From<LoadError> for QuizError {
    fn from(err: LoadError) -> Self {
        QuizError::Load(err)
    }
}

impl From<ContractError> for QuizError {
    fn from(err: ContractError) -> Self {
        QuizError::Contract(err)
    }
}

impl From<ConnectError> for QuizError {
    fn from(err: ConnectError) -> Self {
        QuizError::Connect(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Io(err)
    }
}
