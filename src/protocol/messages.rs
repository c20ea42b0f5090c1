//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket.

use serde::{Deserialize, Serialize};

use crate::contract::CallError;
use crate::models::{PublishedQuizzes, QuizStatus};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Client identifies itself with the account it calls the ledger as.
    Join { account_id: String },

    /// Client invokes a ledger method. `id` is echoed back in the result.
    Call { id: u64, call: ContractCall },
}

/// Ledger methods callable over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ContractCall {
    SubmitAnswer {
        hash: String,
        index: usize,
    },
    GetPublishedQuizzes,
    GetQuizStatus {
        hash: String,
    },
    CreateQuiz {
        hash: String,
        question: String,
        answers: Vec<String>,
        correct_index: usize,
        max_prize_amount: String,
        publish: bool,
    },
    PublishQuiz {
        hash: String,
    },
}

impl ContractCall {
    pub fn method_name(&self) -> &'static str {
        match self {
            ContractCall::SubmitAnswer { .. } => "submit_answer",
            ContractCall::GetPublishedQuizzes => "get_published_quizzes",
            ContractCall::GetQuizStatus { .. } => "get_quiz_status",
            ContractCall::CreateQuiz { .. } => "create_quiz",
            ContractCall::PublishQuiz { .. } => "publish_quiz",
        }
    }
}

/// Successful return value of a ledger method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallResponse {
    Message(String),
    PublishedQuizzes(PublishedQuizzes),
    QuizStatus(Option<QuizStatus>),
    Unit,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted, waiting for Join message.
    ConnectionAck,

    /// Account accepted, calls may now be made.
    JoinAccepted { account_id: String, is_owner: bool },

    /// Account id rejected.
    JoinRejected { reason: String },

    /// Outcome of the call with the matching id.
    CallResult {
        id: u64,
        result: Result<CallResponse, CallError>,
    },

    /// Server is shutting down.
    ServerClosing,
}

/// Account id validation constants.
pub const ACCOUNT_ID_MIN_LENGTH: usize = 2;
pub const ACCOUNT_ID_MAX_LENGTH: usize = 64;

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;

/// Validates an account id such as `alice.near` or `quiz-master_1.testnet`.
///
/// Parts are lowercase alphanumerics separated by a single `.`, `-` or `_`.
pub fn validate_account_id(account_id: &str) -> Result<(), &'static str> {
    if account_id.len() < ACCOUNT_ID_MIN_LENGTH {
        return Err("Account id must be at least 2 characters");
    }

    if account_id.len() > ACCOUNT_ID_MAX_LENGTH {
        return Err("Account id must be at most 64 characters");
    }

    let mut last_was_separator = true;
    for c in account_id.chars() {
        match c {
            'a'..='z' | '0'..='9' => last_was_separator = false,
            '.' | '-' | '_' => {
                if last_was_separator {
                    return Err("Account id separators must sit between alphanumerics");
                }
                last_was_separator = true;
            }
            _ => return Err("Account id may only contain a-z, 0-9, '.', '-' and '_'"),
        }
    }

    if last_was_separator {
        return Err("Account id separators must sit between alphanumerics");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_id() {
        assert!(validate_account_id("alice.near").is_ok());
        assert!(validate_account_id("quiz-master_1.testnet").is_ok());
        assert!(validate_account_id("ab").is_ok());
        assert!(validate_account_id("a").is_err());
        assert!(validate_account_id(&"a".repeat(65)).is_err());
        assert!(validate_account_id("Alice.near").is_err());
        assert!(validate_account_id(".alice").is_err());
        assert!(validate_account_id("alice.").is_err());
        assert!(validate_account_id("alice..near").is_err());
        assert!(validate_account_id("alice near").is_err());
    }

    #[test]
    fn test_message_serialization() {
        let msg = ClientMessage::Join {
            account_id: "alice.near".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"Join\""));

        let msg = ClientMessage::Call {
            id: 7,
            call: ContractCall::SubmitAnswer {
                hash: "abc".to_string(),
                index: 2,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Call",
                "id": 7,
                "call": { "method": "submit_answer", "hash": "abc", "index": 2 }
            })
        );
    }

    #[test]
    fn test_call_result_error_shape() {
        let msg = ServerMessage::CallResult {
            id: 3,
            result: Err(CallError::execution("Smart contract panicked: Invalid hash")),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json["result"]["Err"]["kind"]["ExecutionError"],
            "Smart contract panicked: Invalid hash"
        );

        let parsed: ServerMessage = serde_json::from_value(json).unwrap();
        assert!(matches!(parsed, ServerMessage::CallResult { id: 3, result: Err(_) }));
    }

    #[test]
    fn test_unit_call_parses() {
        let call: ContractCall =
            serde_json::from_str(r#"{"method":"get_published_quizzes"}"#).unwrap();
        assert_eq!(call, ContractCall::GetPublishedQuizzes);
        assert_eq!(call.method_name(), "get_published_quizzes");
    }
}
