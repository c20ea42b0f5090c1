//! Ledger failures and their wire representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix the execution environment puts in front of every contract panic.
pub const PANIC_PREFIX: &str = "Smart contract panicked: ";

/// A call rejected by the quiz ledger. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    NoSuchQuiz,
    Unpublished,
    AlreadySolved,
    OutOfTries,
    NotOwner,
    DuplicateQuiz,
    InvalidPrizeAmount(String),
    InvalidQuiz(&'static str),
}

/// Machine-readable tag attached to execution errors on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractErrorCode {
    NoSuchQuiz,
    Unpublished,
    AlreadySolved,
    OutOfTries,
    NotOwner,
    DuplicateQuiz,
    InvalidPrizeAmount,
    InvalidQuiz,
}

impl ContractError {
    pub fn code(&self) -> ContractErrorCode {
        match self {
            ContractError::NoSuchQuiz => ContractErrorCode::NoSuchQuiz,
            ContractError::Unpublished => ContractErrorCode::Unpublished,
            ContractError::AlreadySolved => ContractErrorCode::AlreadySolved,
            ContractError::OutOfTries => ContractErrorCode::OutOfTries,
            ContractError::NotOwner => ContractErrorCode::NotOwner,
            ContractError::DuplicateQuiz => ContractErrorCode::DuplicateQuiz,
            ContractError::InvalidPrizeAmount(_) => ContractErrorCode::InvalidPrizeAmount,
            ContractError::InvalidQuiz(_) => ContractErrorCode::InvalidQuiz,
        }
    }

    /// The reason as the caller sees it, e.g.
    /// `Smart contract panicked: No such quiz found`.
    pub fn panic_message(&self) -> String {
        format!("{}{}", PANIC_PREFIX, self)
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::NoSuchQuiz => write!(f, "No such quiz found"),
            ContractError::Unpublished => {
                write!(f, "Cannot submit an answer to unpublished quiz")
            }
            ContractError::AlreadySolved => write!(f, "This quiz is already solved by you"),
            ContractError::OutOfTries => {
                write!(f, "You can no longer solve this quiz. You are out of tries.")
            }
            ContractError::NotOwner => write!(f, "This method can only be called by owner"),
            ContractError::DuplicateQuiz => write!(f, "Quiz with the same hash already exists"),
            ContractError::InvalidPrizeAmount(amount) => {
                write!(f, "Invalid prize amount `{}`", amount)
            }
            ContractError::InvalidQuiz(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for ContractError {}

/// What went wrong with a call, as delivered to the caller.
///
/// Serializes as `{"kind":{"ExecutionError":"..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallErrorKind {
    /// The contract ran and panicked with the given reason.
    ExecutionError(String),
    /// The call never reached the contract or its reply was lost.
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallError {
    pub kind: CallErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ContractErrorCode>,
}

impl CallError {
    /// Execution error carrying only the reason string, without a code.
    pub fn execution(reason: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::ExecutionError(reason.into()),
            code: None,
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::Transport(reason.into()),
            code: None,
        }
    }

    /// The execution error reason, if the contract actually ran.
    pub fn execution_error(&self) -> Option<&str> {
        match &self.kind {
            CallErrorKind::ExecutionError(reason) => Some(reason),
            CallErrorKind::Transport(_) => None,
        }
    }
}

impl From<ContractError> for CallError {
    fn from(err: ContractError) -> Self {
        Self {
            kind: CallErrorKind::ExecutionError(err.panic_message()),
            code: Some(err.code()),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CallErrorKind::ExecutionError(reason) => write!(f, "{}", reason),
            CallErrorKind::Transport(reason) => write!(f, "transport error: {}", reason),
        }
    }
}

impl std::error::Error for CallError {}
