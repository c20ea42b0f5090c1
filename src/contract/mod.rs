//! The quiz ledger: quiz storage, answer checking, retries and prizes.

mod dispatch;
mod error;
mod ledger;

pub use dispatch::dispatch;
pub use error::{CallError, CallErrorKind, ContractError, ContractErrorCode, PANIC_PREFIX};
pub use ledger::{Payout, QuizContract, MAX_TRIES};
