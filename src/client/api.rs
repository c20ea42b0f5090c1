//! The capability a quiz client uses to reach the ledger.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::contract::{dispatch, CallError, QuizContract};
use crate::models::Quiz;
use crate::protocol::{CallResponse, ContractCall};

/// Payload of a `submit_answer` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub hash: String,
    pub index: usize,
}

impl From<SubmitAnswerRequest> for ContractCall {
    fn from(request: SubmitAnswerRequest) -> Self {
        ContractCall::SubmitAnswer {
            hash: request.hash,
            index: request.index,
        }
    }
}

/// Ledger methods a player needs.
///
/// Implementations are shared between the UI task and the tasks spawned
/// for each submission, hence `Send + Sync + 'static`.
pub trait ContractApi: Send + Sync + 'static {
    fn submit_answer(
        &self,
        request: SubmitAnswerRequest,
    ) -> impl Future<Output = Result<String, CallError>> + Send;

    fn get_published_quizzes(&self) -> impl Future<Output = Result<Vec<Quiz>, CallError>> + Send;
}

/// Talks to a ledger living in the same process.
#[derive(Clone)]
pub struct LocalContractApi {
    contract: Arc<Mutex<QuizContract>>,
    account_id: String,
}

impl LocalContractApi {
    pub fn new(contract: Arc<Mutex<QuizContract>>, account_id: impl Into<String>) -> Self {
        Self {
            contract,
            account_id: account_id.into(),
        }
    }

    async fn call(&self, call: ContractCall) -> Result<CallResponse, CallError> {
        let mut contract = self.contract.lock().await;
        dispatch(&mut contract, &self.account_id, call)
    }
}

impl ContractApi for LocalContractApi {
    fn submit_answer(
        &self,
        request: SubmitAnswerRequest,
    ) -> impl Future<Output = Result<String, CallError>> + Send {
        async move {
            match self.call(request.into()).await? {
                CallResponse::Message(message) => Ok(message),
                other => Err(unexpected_response("submit_answer", &other)),
            }
        }
    }

    fn get_published_quizzes(&self) -> impl Future<Output = Result<Vec<Quiz>, CallError>> + Send {
        async move {
            match self.call(ContractCall::GetPublishedQuizzes).await? {
                CallResponse::PublishedQuizzes(published) => {
                    Ok(published.quizzes.into_iter().map(Quiz::from).collect())
                }
                other => Err(unexpected_response("get_published_quizzes", &other)),
            }
        }
    }
}

/// Error for a reply whose shape does not fit the method that was called.
pub(crate) fn unexpected_response(method: &str, response: &CallResponse) -> CallError {
    CallError::transport(format!("unexpected response to {}: {:?}", method, response))
}
