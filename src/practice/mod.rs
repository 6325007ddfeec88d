//! Session engine: quiz sampling and state, flashcard review, word builder.

pub mod builder;
pub mod quiz;
pub mod review;
pub mod sampler;

pub use builder::{BuilderError, WordBuilder};
pub use quiz::{AnswerOutcome, QuizPhase, QuizSession};
pub use review::{check_answer, CardInput, CheckStep, GradeOutcome, ReviewError, ReviewQueue, Tally};
pub use sampler::{generate_question, QuizError, QuizQuestion};
