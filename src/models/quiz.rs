use serde::{Deserialize, Serialize};

/// A quiz as shown to a player: the question, its ordered answers, and the
/// hash that ties it to the ledger.
///
/// Answers are identified by position only, so their order must not change
/// while the quiz is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub hash: String,
    pub question: String,
    pub answers: Vec<String>,
}

/// Publication state of a quiz stored in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizStatus {
    Published,
    Unpublished,
}

/// Public view of a published quiz, including its maximum prize in yoctoNEAR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonQuiz {
    pub hash: String,
    pub question: String,
    pub answers: Vec<String>,
    pub prize_amount: String,
}

impl From<JsonQuiz> for Quiz {
    fn from(quiz: JsonQuiz) -> Self {
        Self {
            hash: quiz.hash,
            question: quiz.question,
            answers: quiz.answers,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedQuizzes {
    pub quizzes: Vec<JsonQuiz>,
}

/// Full quiz definition as loaded by the ledger owner, answer key included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    pub hash: String,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_index: usize,
    pub max_prize_amount: String,
    #[serde(default = "default_publish")]
    pub publish: bool,
}

fn default_publish() -> bool {
    true
}
