//! A single quiz question and its answers, wired to the ledger.
//!
//! Picking an answer sends exactly one `submit_answer` call. Calls run on
//! their own tasks so the UI keeps drawing; their outcomes come back over a
//! channel and are applied by [`QuizView::drain_outcomes`] or
//! [`QuizView::next_outcome`].

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::contract::{CallError, CallErrorKind, ContractError, ContractErrorCode};
use crate::models::Quiz;

use super::api::{ContractApi, SubmitAnswerRequest};

/// Text shown when an account has used up its tries.
pub const OUT_OF_TRIES_ALERT: &str = "You are out of tries. Try again later.";

/// Why a submission failed, as far as the player is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// The account has no tries left on this quiz.
    TriesExhausted,
    /// The ledger rejected the call for another reason.
    Other(String),
    /// The call never got a reply.
    Transport(String),
}

impl SubmitFailure {
    /// Classify a call error, trusting its code when the server sent one and
    /// otherwise matching the out-of-tries panic message exactly.
    pub fn classify(error: &CallError) -> Self {
        match (&error.kind, error.code) {
            (CallErrorKind::Transport(reason), _) => SubmitFailure::Transport(reason.clone()),
            (CallErrorKind::ExecutionError(_), Some(ContractErrorCode::OutOfTries)) => {
                SubmitFailure::TriesExhausted
            }
            (CallErrorKind::ExecutionError(reason), Some(_)) => {
                SubmitFailure::Other(reason.clone())
            }
            (CallErrorKind::ExecutionError(reason), None) => {
                if *reason == ContractError::OutOfTries.panic_message() {
                    SubmitFailure::TriesExhausted
                } else {
                    SubmitFailure::Other(reason.clone())
                }
            }
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub request: SubmitAnswerRequest,
    pub result: Result<String, SubmitFailure>,
}

/// Renders a [`Quiz`] and forwards the chosen answer to the ledger.
pub struct QuizView<A: ContractApi> {
    api: Arc<A>,
    quiz: Quiz,
    selected: usize,
    alerts: VecDeque<String>,
    outcome_tx: mpsc::UnboundedSender<SubmissionOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SubmissionOutcome>,
}

impl<A: ContractApi> QuizView<A> {
    pub fn new(api: Arc<A>, quiz: Quiz) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            api,
            quiz,
            selected: 0,
            alerts: VecDeque::new(),
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Show a different quiz. Nothing about the previous quiz carries over;
    /// submissions still in flight report their outcome as usual.
    pub fn set_quiz(&mut self, quiz: Quiz) {
        log::debug!("showing quiz {}", quiz.hash);
        self.quiz = quiz;
        self.selected = 0;
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        let count = self.quiz.answers.len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.quiz.answers.len();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    /// Submit the highlighted answer.
    pub fn submit_selected(&self) {
        self.submit_answer(self.selected);
    }

    /// Send `answer_index` for the current quiz. Repeated calls are not
    /// collapsed; each one reaches the ledger.
    pub fn submit_answer(&self, answer_index: usize) {
        let request = SubmitAnswerRequest {
            hash: self.quiz.hash.clone(),
            index: answer_index,
        };
        log::debug!("submitting answer {} to quiz {}", request.index, request.hash);

        let api = Arc::clone(&self.api);
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = api
                .submit_answer(request.clone())
                .await
                .map_err(|e| SubmitFailure::classify(&e));
            // the receiver lives as long as the view
            let _ = outcome_tx.send(SubmissionOutcome { request, result });
        });
    }

    /// Apply every outcome that has already arrived.
    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
        }
    }

    /// Wait for the next outcome and apply it.
    pub async fn next_outcome(&mut self) -> Option<SubmissionOutcome> {
        let outcome = self.outcome_rx.recv().await?;
        self.apply(outcome.clone());
        Some(outcome)
    }

    fn apply(&mut self, outcome: SubmissionOutcome) {
        let SubmissionOutcome { request, result } = outcome;
        match result {
            Ok(response) => {
                log::info!("quiz {} answer {}: {}", request.hash, request.index, response);
            }
            Err(SubmitFailure::TriesExhausted) => {
                log::info!("quiz {}: out of tries", request.hash);
                self.alerts.push_back(OUT_OF_TRIES_ALERT.to_string());
            }
            Err(SubmitFailure::Other(reason)) => {
                log::warn!("quiz {} answer {} rejected: {}", request.hash, request.index, reason);
            }
            Err(SubmitFailure::Transport(reason)) => {
                log::warn!(
                    "quiz {} answer {} not delivered: {}",
                    request.hash,
                    request.index,
                    reason
                );
            }
        }
    }

    /// The alert currently blocking the screen, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn pending_alerts(&self) -> usize {
        self.alerts.len()
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Mutex;

    use super::*;
    use crate::client::api::LocalContractApi;
    use crate::contract::QuizContract;

    const OUT_OF_TRIES_PANIC: &str =
        "Smart contract panicked: You can no longer solve this quiz. You are out of tries.";

    /// Records every request and answers with a canned reply.
    struct MockApi {
        calls: Mutex<Vec<SubmitAnswerRequest>>,
        reply: Result<String, CallError>,
    }

    impl MockApi {
        fn replying(reply: Result<String, CallError>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                reply,
            })
        }

        fn calls(&self) -> Vec<SubmitAnswerRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ContractApi for MockApi {
        fn submit_answer(
            &self,
            request: SubmitAnswerRequest,
        ) -> impl Future<Output = Result<String, CallError>> + Send {
            self.calls.lock().unwrap().push(request);
            let reply = self.reply.clone();
            async move { reply }
        }

        fn get_published_quizzes(
            &self,
        ) -> impl Future<Output = Result<Vec<Quiz>, CallError>> + Send {
            async move { Ok(Vec::new()) }
        }
    }

    fn capital_quiz() -> Quiz {
        Quiz {
            hash: "abc".to_string(),
            question: "What is the capital of France".to_string(),
            answers: vec![
                "Kyiv".to_string(),
                "Madrid".to_string(),
                "Paris".to_string(),
                "Berlin".to_string(),
            ],
        }
    }

    #[tokio::test]
    async fn test_submit_sends_hash_and_index_once() {
        let api = MockApi::replying(Ok("ok".to_string()));
        let mut view = QuizView::new(Arc::clone(&api), capital_quiz());

        view.submit_answer(2);
        let outcome = view.next_outcome().await.unwrap();

        assert_eq!(
            api.calls(),
            vec![SubmitAnswerRequest {
                hash: "abc".to_string(),
                index: 2,
            }]
        );
        assert_eq!(outcome.result, Ok("ok".to_string()));
        assert_eq!(view.alert(), None);
    }

    #[tokio::test]
    async fn test_out_of_tries_shows_one_alert() {
        let api = MockApi::replying(Err(CallError::execution(OUT_OF_TRIES_PANIC)));
        let mut view = QuizView::new(api, capital_quiz());

        view.submit_answer(0);
        view.next_outcome().await.unwrap();

        assert_eq!(view.alert(), Some(OUT_OF_TRIES_ALERT));
        assert_eq!(view.pending_alerts(), 1);

        view.dismiss_alert();
        assert_eq!(view.alert(), None);
    }

    #[tokio::test]
    async fn test_other_failures_stay_silent() {
        let failures = [
            CallError::execution("Smart contract panicked: Invalid hash"),
            CallError::transport("connection reset"),
        ];

        for failure in failures {
            let api = MockApi::replying(Err(failure));
            let mut view = QuizView::new(api, capital_quiz());

            view.submit_answer(1);
            let outcome = view.next_outcome().await.unwrap();

            assert!(outcome.result.is_err());
            assert_eq!(view.alert(), None);
        }
    }

    #[tokio::test]
    async fn test_repeated_clicks_are_not_collapsed() {
        let api = MockApi::replying(Ok("ok".to_string()));
        let mut view = QuizView::new(Arc::clone(&api), capital_quiz());

        view.submit_answer(1);
        view.submit_answer(1);
        view.submit_answer(3);
        for _ in 0..3 {
            view.next_outcome().await.unwrap();
        }

        let mut indices: Vec<_> = api.calls().into_iter().map(|r| r.index).collect();
        indices.sort();
        assert_eq!(indices, vec![1, 1, 3]);
    }

    #[tokio::test]
    async fn test_set_quiz_replaces_everything_shown() {
        let api = MockApi::replying(Ok("ok".to_string()));
        let mut view = QuizView::new(Arc::clone(&api), capital_quiz());
        view.select_next();
        view.select_next();
        assert_eq!(view.selected(), 2);

        let next = Quiz {
            hash: "def".to_string(),
            question: "2 + 2".to_string(),
            answers: vec!["4".to_string(), "5".to_string()],
        };
        view.set_quiz(next.clone());

        assert_eq!(view.quiz(), &next);
        assert_eq!(view.selected(), 0);

        view.submit_selected();
        view.next_outcome().await.unwrap();
        assert_eq!(api.calls()[0].hash, "def");
    }

    #[test]
    fn test_selection_wraps_around_answers() {
        let api = MockApi::replying(Ok("ok".to_string()));
        let mut view = QuizView::new(api, capital_quiz());

        view.select_previous();
        assert_eq!(view.selected(), 3);
        view.select_next();
        assert_eq!(view.selected(), 0);
    }

    #[test]
    fn test_classify_prefers_code() {
        let coded = CallError::from(ContractError::OutOfTries);
        assert_eq!(SubmitFailure::classify(&coded), SubmitFailure::TriesExhausted);

        let bare = CallError::execution(OUT_OF_TRIES_PANIC);
        assert_eq!(SubmitFailure::classify(&bare), SubmitFailure::TriesExhausted);

        // near misses do not count
        let near_miss =
            CallError::execution("You can no longer solve this quiz. You are out of tries.");
        assert!(matches!(SubmitFailure::classify(&near_miss), SubmitFailure::Other(_)));

        let solved = CallError::from(ContractError::AlreadySolved);
        assert!(matches!(SubmitFailure::classify(&solved), SubmitFailure::Other(_)));
    }

    #[tokio::test]
    async fn test_against_ledger_until_out_of_tries() {
        let mut contract = QuizContract::new("owner.near");
        contract
            .create_quiz(
                "owner.near",
                "abc".to_string(),
                "What is the capital of France".to_string(),
                capital_quiz().answers,
                2,
                "90".to_string(),
                true,
            )
            .unwrap();
        let api = Arc::new(LocalContractApi::new(
            Arc::new(tokio::sync::Mutex::new(contract)),
            "alice.near",
        ));
        let mut view = QuizView::new(api, capital_quiz());

        for wrong in [0, 1, 3] {
            view.submit_answer(wrong);
            let outcome = view.next_outcome().await.unwrap();
            assert!(outcome.result.is_ok());
        }
        assert_eq!(view.alert(), None);

        view.submit_answer(2);
        let outcome = view.next_outcome().await.unwrap();
        assert_eq!(outcome.result, Err(SubmitFailure::TriesExhausted));
        assert_eq!(view.alert(), Some(OUT_OF_TRIES_ALERT));
    }
}
