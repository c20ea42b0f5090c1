//! In-memory quiz ledger.
//!
//! Holds the quizzes, who solved what, how many tries each account has
//! left, and the prizes paid out. Every operation either succeeds or
//! returns a [`ContractError`] without touching state.

use std::collections::{HashMap, HashSet};

use crate::models::{JsonQuiz, PublishedQuizzes, QuizStatus};

use super::error::ContractError;

/// Tries every account starts with on every quiz.
pub const MAX_TRIES: usize = 3;

/// A quiz as stored in the ledger, answer key included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredQuiz {
    pub status: QuizStatus,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_index: usize,
    pub max_prize_amount: u128,
}

/// A prize sent to an account for a correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub account_id: String,
    pub hash: String,
    pub amount: u128,
}

/// Main ledger state.
#[derive(Debug)]
pub struct QuizContract {
    /// Account allowed to create and publish quizzes.
    owner_id: String,
    /// All quizzes by hash.
    quizzes: HashMap<String, StoredQuiz>,
    /// Published hashes in publication order.
    published_hashes: Vec<String>,
    /// Hashes each account has solved.
    solved_quizzes: HashMap<String, HashSet<String>>,
    /// Tries left per account per hash (absent = [`MAX_TRIES`]).
    retries_left: HashMap<String, HashMap<String, usize>>,
    /// Every prize paid so far.
    payouts: Vec<Payout>,
}

impl QuizContract {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            quizzes: HashMap::new(),
            published_hashes: Vec::new(),
            solved_quizzes: HashMap::new(),
            retries_left: HashMap::new(),
            payouts: Vec::new(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn is_owner(&self, account_id: &str) -> bool {
        self.owner_id == account_id
    }

    /// Submit `index` as `caller`'s answer to the quiz identified by `hash`.
    ///
    /// A correct answer pays `max_prize / (4 - tries_left)`, so the first try
    /// earns the full prize, the second half, the third a third. A wrong
    /// answer costs one try; an index outside the answer list is just wrong.
    pub fn submit_answer(
        &mut self,
        caller: &str,
        hash: &str,
        index: usize,
    ) -> Result<String, ContractError> {
        let quiz = self.quizzes.get(hash).ok_or(ContractError::NoSuchQuiz)?;
        if quiz.status != QuizStatus::Published {
            return Err(ContractError::Unpublished);
        }

        if self
            .solved_quizzes
            .get(caller)
            .is_some_and(|solved| solved.contains(hash))
        {
            return Err(ContractError::AlreadySolved);
        }

        let retries_left = self.retries_left(caller, hash);
        if retries_left == 0 {
            return Err(ContractError::OutOfTries);
        }

        if index == quiz.correct_index {
            let amount = quiz.max_prize_amount / (MAX_TRIES + 1 - retries_left) as u128;

            self.solved_quizzes
                .entry(caller.to_string())
                .or_default()
                .insert(hash.to_string());
            self.payouts.push(Payout {
                account_id: caller.to_string(),
                hash: hash.to_string(),
                amount,
            });

            log::info!("{} solved quiz {} and receives {} yoctoNEAR", caller, hash, amount);
            return Ok(format!("Your answer is correct. You've got {} yoctoNEAR", amount));
        }

        let correct_answer = quiz.answers[quiz.correct_index].clone();
        let retries_left = retries_left - 1;
        self.retries_left
            .entry(caller.to_string())
            .or_default()
            .insert(hash.to_string(), retries_left);

        log::debug!("{} answered quiz {} wrong, {} tries left", caller, hash, retries_left);
        if retries_left == 0 {
            return Ok(format!(
                "The answer is not right, you are out of tries. The correct answer is `{}`",
                correct_answer
            ));
        }

        Ok(format!(
            "The answer is not right. You have {} retries left",
            retries_left
        ))
    }

    /// Add a quiz. Only the owner may call this.
    #[allow(clippy::too_many_arguments)]
    pub fn create_quiz(
        &mut self,
        caller: &str,
        hash: String,
        question: String,
        answers: Vec<String>,
        correct_index: usize,
        max_prize_amount: String,
        publish: bool,
    ) -> Result<(), ContractError> {
        self.check_owner(caller)?;

        let max_prize_amount = max_prize_amount
            .parse::<u128>()
            .map_err(|_| ContractError::InvalidPrizeAmount(max_prize_amount.clone()))?;

        if answers.is_empty() {
            return Err(ContractError::InvalidQuiz("Quiz must have at least one answer"));
        }
        if correct_index >= answers.len() {
            return Err(ContractError::InvalidQuiz("Correct answer index is out of range"));
        }
        if self.quizzes.contains_key(&hash) {
            return Err(ContractError::DuplicateQuiz);
        }

        let status = if publish {
            QuizStatus::Published
        } else {
            QuizStatus::Unpublished
        };

        self.quizzes.insert(
            hash.clone(),
            StoredQuiz {
                status,
                question,
                answers,
                correct_index,
                max_prize_amount,
            },
        );

        if publish {
            self.published_hashes.push(hash.clone());
        }

        log::info!("created quiz {} ({:?})", hash, status);
        Ok(())
    }

    /// Publish a quiz. Publishing an already published quiz is a no-op.
    pub fn publish_quiz(&mut self, caller: &str, hash: &str) -> Result<(), ContractError> {
        self.check_owner(caller)?;

        let quiz = self.quizzes.get_mut(hash).ok_or(ContractError::NoSuchQuiz)?;
        if quiz.status == QuizStatus::Unpublished {
            quiz.status = QuizStatus::Published;
            self.published_hashes.push(hash.to_string());
            log::info!("published quiz {}", hash);
        }

        Ok(())
    }

    pub fn get_quiz_status(&self, hash: &str) -> Option<QuizStatus> {
        self.quizzes.get(hash).map(|quiz| quiz.status)
    }

    pub fn get_published_quizzes(&self) -> PublishedQuizzes {
        let quizzes = self
            .published_hashes
            .iter()
            .filter_map(|hash| {
                let quiz = self.quizzes.get(hash)?;
                Some(JsonQuiz {
                    hash: hash.clone(),
                    question: quiz.question.clone(),
                    answers: quiz.answers.clone(),
                    prize_amount: quiz.max_prize_amount.to_string(),
                })
            })
            .collect();

        PublishedQuizzes { quizzes }
    }

    /// Tries `account_id` has left on `hash`.
    pub fn retries_left(&self, account_id: &str, hash: &str) -> usize {
        self.retries_left
            .get(account_id)
            .and_then(|retries| retries.get(hash))
            .copied()
            .unwrap_or(MAX_TRIES)
    }

    pub fn has_solved(&self, account_id: &str, hash: &str) -> bool {
        self.solved_quizzes
            .get(account_id)
            .is_some_and(|solved| solved.contains(hash))
    }

    pub fn payouts(&self) -> &[Payout] {
        &self.payouts
    }

    fn check_owner(&self, caller: &str) -> Result<(), ContractError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(ContractError::NotOwner)
        }
    }
}
