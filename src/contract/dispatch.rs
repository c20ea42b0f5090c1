use crate::protocol::{CallResponse, ContractCall};

use super::error::CallError;
use super::ledger::QuizContract;

/// Run a wire call against the ledger on behalf of `caller`.
pub fn dispatch(
    contract: &mut QuizContract,
    caller: &str,
    call: ContractCall,
) -> Result<CallResponse, CallError> {
    let method = call.method_name();

    let result = match call {
        ContractCall::SubmitAnswer { hash, index } => contract
            .submit_answer(caller, &hash, index)
            .map(CallResponse::Message),
        ContractCall::GetPublishedQuizzes => {
            Ok(CallResponse::PublishedQuizzes(contract.get_published_quizzes()))
        }
        ContractCall::GetQuizStatus { hash } => {
            Ok(CallResponse::QuizStatus(contract.get_quiz_status(&hash)))
        }
        ContractCall::CreateQuiz {
            hash,
            question,
            answers,
            correct_index,
            max_prize_amount,
            publish,
        } => contract
            .create_quiz(
                caller,
                hash,
                question,
                answers,
                correct_index,
                max_prize_amount,
                publish,
            )
            .map(|_| CallResponse::Unit),
        ContractCall::PublishQuiz { hash } => contract
            .publish_quiz(caller, &hash)
            .map(|_| CallResponse::Unit),
    };

    result.map_err(|err| {
        log::debug!("{} called by {} failed: {}", method, caller, err);
        CallError::from(err)
    })
}
