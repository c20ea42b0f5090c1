//! Quiz client module.
//!
//! Lists published quizzes and submits answers to the ledger.

pub mod api;
mod client;
mod state;
mod ui;
pub mod view;
pub mod ws;

pub use api::{ContractApi, LocalContractApi, SubmitAnswerRequest};
pub use client::{handle_input, run};
pub use state::{ClientApp, Screen};
pub use view::{QuizView, SubmissionOutcome, SubmitFailure, OUT_OF_TRIES_ALERT};
pub use ws::{ConnectError, WsContractApi};
