mod quiz;

pub use quiz::{JsonQuiz, PublishedQuizzes, Quiz, QuizDefinition, QuizStatus};
