//! Endless multiple-choice kana quiz.
//!
//! The session alternates between `AwaitingAnswer` and `Graded`. Grading
//! reports how long feedback should stay on screen; the caller schedules
//! [`QuizSession::advance`] after that delay. `advance` only acts in the
//! graded phase, so a superseded or duplicated timer is harmless.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use super::sampler::{generate_question, QuizError, QuizQuestion};
use crate::config;
use crate::content::KanaCatalog;
use crate::store::{LogOnError, Progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
  AwaitingAnswer,
  Graded { correct: bool },
}

/// Result of grading one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub correct_answer: String,
  /// Set when this answer raised the best score
  pub new_best: Option<u32>,
  /// How long to show feedback before calling `advance`
  pub advance_after: Duration,
}

pub struct QuizSession<R: Rng> {
  catalog: Arc<KanaCatalog>,
  rng: R,
  score: u32,
  streak: u32,
  best_score: u32,
  row_limit: usize,
  question: Option<QuizQuestion>,
  phase: QuizPhase,
}

impl<R: Rng> QuizSession<R> {
  /// Start with every row enabled and a fresh question
  pub fn new(catalog: Arc<KanaCatalog>, best_score: u32, rng: R) -> Self {
    let row_limit = catalog.last_row_index();
    let mut session = Self {
      catalog,
      rng,
      score: 0,
      streak: 0,
      best_score,
      row_limit,
      question: None,
      phase: QuizPhase::AwaitingAnswer,
    };
    session.regenerate().log_warn("Could not generate first quiz question");
    session
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn streak(&self) -> u32 {
    self.streak
  }

  pub fn best_score(&self) -> u32 {
    self.best_score
  }

  /// Raise the known best score to `stored`; never lowers it
  pub fn observe_best_score(&mut self, stored: u32) {
    self.best_score = self.best_score.max(stored);
  }

  pub fn row_limit(&self) -> usize {
    self.row_limit
  }

  pub fn question(&self) -> Option<&QuizQuestion> {
    self.question.as_ref()
  }

  pub fn phase(&self) -> QuizPhase {
    self.phase
  }

  pub fn catalog(&self) -> &KanaCatalog {
    &self.catalog
  }

  fn regenerate(&mut self) -> Result<(), QuizError> {
    self.phase = QuizPhase::AwaitingAnswer;
    match generate_question(&self.catalog, self.row_limit, &mut self.rng) {
      Ok(question) => {
        self.question = Some(question);
        Ok(())
      }
      Err(e) => {
        self.question = None;
        Err(e)
      }
    }
  }

  /// Grade a choice. Returns `None` (and changes nothing) if the current
  /// question was already graded or there is no question.
  pub fn submit_answer(&mut self, choice: &str, progress: &Progress) -> Option<AnswerOutcome> {
    if self.phase != QuizPhase::AwaitingAnswer {
      tracing::debug!("Ignoring quiz answer while feedback is showing");
      return None;
    }
    let question = self.question.as_ref()?;
    let correct = question.is_correct(choice);
    let correct_answer = question.answer().to_string();

    // Other sessions may have raised the stored best since this one started
    self.observe_best_score(progress.high_score());

    let mut new_best = None;
    let advance_after = if correct {
      self.score += config::POINTS_PER_CORRECT;
      self.streak += 1;
      if self.score > self.best_score {
        let written = progress
          .record_score(self.score)
          .log_warn("Failed to persist quiz high score");
        if written == Some(true) {
          new_best = Some(self.score);
        }
        self.observe_best_score(self.score.max(progress.high_score()));
      }
      Duration::from_millis(config::CORRECT_ADVANCE_MS)
    } else {
      self.streak = 0;
      Duration::from_millis(config::WRONG_ADVANCE_MS)
    };

    self.phase = QuizPhase::Graded { correct };

    Some(AnswerOutcome {
      correct,
      correct_answer,
      new_best,
      advance_after,
    })
  }

  /// Move from feedback to the next question. Returns true if a new question
  /// was generated.
  pub fn advance(&mut self) -> bool {
    if !matches!(self.phase, QuizPhase::Graded { .. }) {
      return false;
    }
    self.regenerate().log_warn("Could not generate quiz question").is_some()
  }

  /// Restrict questions to rows `0..=limit`. Score and streak restart.
  /// An out-of-range limit changes nothing; an insufficient pool leaves the
  /// question absent.
  pub fn set_row_limit(&mut self, limit: usize) -> Result<(), QuizError> {
    let rows = self.catalog.rows().len();
    if limit >= rows {
      return Err(QuizError::InvalidRowLimit { limit, rows });
    }
    self.row_limit = limit;
    self.score = 0;
    self.streak = 0;
    self.regenerate()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::CharacterEntry;
  use crate::domain::KanaCategory::Monograph;
  use crate::store::MemoryStore;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn progress() -> Progress {
    Progress::new(Arc::new(MemoryStore::new()))
  }

  fn session(best: u32) -> QuizSession<StdRng> {
    QuizSession::new(KanaCatalog::hiragana(), best, StdRng::seed_from_u64(11))
  }

  fn wrong_choice(session: &QuizSession<StdRng>) -> String {
    let question = session.question().unwrap();
    question
      .choices
      .iter()
      .find(|c| c.as_str() != question.answer())
      .unwrap()
      .clone()
  }

  fn right_choice(session: &QuizSession<StdRng>) -> String {
    session.question().unwrap().answer().to_string()
  }

  #[test]
  fn test_new_session_has_question_and_all_rows() {
    let session = session(0);
    assert!(session.question().is_some());
    assert_eq!(session.row_limit(), KanaCatalog::hiragana().last_row_index());
    assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
    assert_eq!(session.score(), 0);
  }

  #[test]
  fn test_correct_answer_scores_and_extends_streak() {
    let progress = progress();
    let mut session = session(0);
    let choice = right_choice(&session);
    let outcome = session.submit_answer(&choice, &progress).unwrap();

    assert!(outcome.correct);
    assert_eq!(session.score(), 10);
    assert_eq!(session.streak(), 1);
    assert_eq!(outcome.advance_after, Duration::from_millis(config::CORRECT_ADVANCE_MS));
    assert_eq!(session.phase(), QuizPhase::Graded { correct: true });
  }

  #[test]
  fn test_wrong_answer_resets_streak_keeps_score() {
    let progress = progress();
    let mut session = session(0);

    let choice = right_choice(&session);
    session.submit_answer(&choice, &progress);
    session.advance();
    assert_eq!(session.streak(), 1);

    let choice = wrong_choice(&session);
    let outcome = session.submit_answer(&choice, &progress).unwrap();
    assert!(!outcome.correct);
    assert_eq!(session.score(), 10);
    assert_eq!(session.streak(), 0);
    assert!(outcome.advance_after > Duration::from_millis(config::CORRECT_ADVANCE_MS));
  }

  #[test]
  fn test_graded_state_ignores_further_answers() {
    let progress = progress();
    let mut session = session(0);
    let choice = right_choice(&session);
    session.submit_answer(&choice, &progress).unwrap();

    for _ in 0..5 {
      assert!(session.submit_answer(&choice, &progress).is_none());
    }
    assert_eq!(session.score(), 10);
    assert_eq!(session.streak(), 1);
  }

  #[test]
  fn test_advance_only_from_graded() {
    let progress = progress();
    let mut session = session(0);
    assert!(!session.advance());

    let choice = right_choice(&session);
    session.submit_answer(&choice, &progress);
    assert!(session.advance());
    assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
    // Second timer firing is a no-op
    assert!(!session.advance());
  }

  #[test]
  fn test_best_score_persisted_and_monotonic() {
    let progress = progress();
    progress.record_score(20).unwrap();
    let mut session = session(progress.high_score());

    let mut bests = vec![session.best_score()];
    for round in 0..6 {
      let choice = if round == 3 { wrong_choice(&session) } else { right_choice(&session) };
      session.submit_answer(&choice, &progress);
      session.advance();
      bests.push(session.best_score());
    }

    // 10, 20, 30, miss, 40, 50
    assert!(bests.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(session.best_score(), 50);
    assert_eq!(progress.high_score(), 50);

    // A new session starts from the persisted best
    let mut next = QuizSession::new(KanaCatalog::hiragana(), progress.high_score(), StdRng::seed_from_u64(5));
    let choice = right_choice(&next);
    let outcome = next.submit_answer(&choice, &progress).unwrap();
    assert_eq!(outcome.new_best, None);
    assert_eq!(progress.high_score(), 50);
  }

  #[test]
  fn test_set_row_limit_resets_score_and_filters() {
    let progress = progress();
    let mut session = session(0);
    let choice = right_choice(&session);
    session.submit_answer(&choice, &progress);

    session.set_row_limit(0).unwrap();
    assert_eq!(session.score(), 0);
    assert_eq!(session.streak(), 0);
    assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
    assert_eq!(session.question().unwrap().target.row, "a");
  }

  #[test]
  fn test_set_row_limit_insufficient_pool_leaves_no_question() {
    let catalog = Arc::new(KanaCatalog::new(
      vec![
        CharacterEntry::new("あ", "a", Monograph, "a"),
        CharacterEntry::new("い", "i", Monograph, "a"),
        CharacterEntry::new("か", "ka", Monograph, "ka"),
        CharacterEntry::new("き", "ki", Monograph, "ka"),
      ],
      vec!["a", "ka"],
    ));
    let progress = progress();
    let mut session = QuizSession::new(catalog, 0, StdRng::seed_from_u64(2));
    assert!(session.question().is_some());

    assert!(matches!(session.set_row_limit(0), Err(QuizError::InsufficientPool { .. })));
    assert!(session.question().is_none());
    assert!(session.submit_answer("a", &progress).is_none());
  }

  #[test]
  fn test_best_score_follows_other_sessions() {
    let progress = progress();
    let mut first = session(0);
    let mut other = session(0);

    // The other session pushes the stored best to 60
    for _ in 0..6 {
      let choice = right_choice(&other);
      other.submit_answer(&choice, &progress).unwrap();
      other.advance();
    }
    assert_eq!(progress.high_score(), 60);

    let choice = right_choice(&first);
    let outcome = first.submit_answer(&choice, &progress).unwrap();
    assert!(outcome.correct);
    assert_eq!(outcome.new_best, None);
    assert_eq!(first.score(), 10);
    assert_eq!(first.best_score(), 60);
    assert_eq!(progress.high_score(), 60);
  }

  #[test]
  fn test_new_best_only_when_stored_score_is_beaten() {
    let progress = progress();
    progress.record_score(10).unwrap();
    let mut session = session(0);

    let choice = right_choice(&session);
    assert_eq!(session.submit_answer(&choice, &progress).unwrap().new_best, None);
    session.advance();
    let choice = right_choice(&session);
    assert_eq!(session.submit_answer(&choice, &progress).unwrap().new_best, Some(20));
    assert_eq!(progress.high_score(), 20);
  }

  #[test]
  fn test_out_of_range_row_limit_keeps_session() {
    let progress = progress();
    let mut session = session(0);
    let choice = right_choice(&session);
    session.submit_answer(&choice, &progress);
    let before = session.row_limit();

    assert!(matches!(session.set_row_limit(99), Err(QuizError::InvalidRowLimit { limit: 99, .. })));
    assert_eq!(session.row_limit(), before);
    assert_eq!(session.score(), 10);
  }
}
