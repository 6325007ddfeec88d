//! In-memory learner sessions.
//!
//! Each browser gets a [`LearnerSession`] keyed by a cookie id, holding its
//! quiz, practice pass, word builder and prompt language. Sessions expire
//! after a configurable duration of inactivity.
//!
//! Access goes through [`SessionStore::with_session`], which takes a
//! synchronous closure, so the lock can never be held across an `.await`.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config;
use crate::content::KanaCatalog;
use crate::domain::{AppLanguage, VocabCard};
use crate::practice::{QuizSession, ReviewQueue, WordBuilder};

/// A practice pass over one topic
#[derive(Debug, Clone)]
pub struct ActiveReview {
  pub topic_id: String,
  pub queue: ReviewQueue,
}

pub struct LearnerSession {
  pub quiz: Option<QuizSession<StdRng>>,
  pub review: Option<ActiveReview>,
  pub builder: WordBuilder,
  pub language: AppLanguage,
  pub rng: StdRng,
}

impl LearnerSession {
  pub fn new() -> Self {
    Self {
      quiz: None,
      review: None,
      builder: WordBuilder::new(),
      language: AppLanguage::default(),
      rng: StdRng::from_rng(&mut rand::rng()),
    }
  }

  /// Current quiz, started on first use. `best_score` is the persisted best,
  /// which other sessions may have raised since the quiz started.
  pub fn quiz_mut(&mut self, catalog: Arc<KanaCatalog>, best_score: u32) -> &mut QuizSession<StdRng> {
    let rng = StdRng::from_rng(&mut self.rng);
    let quiz = self
      .quiz
      .get_or_insert_with(|| QuizSession::new(catalog, best_score, rng));
    quiz.observe_best_score(best_score);
    quiz
  }

  /// Replace any running pass with a fresh shuffle of `cards`
  pub fn start_review(&mut self, topic_id: &str, cards: Vec<VocabCard>) -> &mut ActiveReview {
    let queue = ReviewQueue::start(cards, &mut self.rng);
    self.review.insert(ActiveReview {
      topic_id: topic_id.to_string(),
      queue,
    })
  }
}

impl Default for LearnerSession {
  fn default() -> Self {
    Self::new()
  }
}

/// Session entry with last access time for expiration
struct SessionEntry {
  session: LearnerSession,
  last_access: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
  sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run `f` on the session for `session_id`, creating it when absent
  pub fn with_session<T>(&self, session_id: &str, f: impl FnOnce(&mut LearnerSession) -> T) -> T {
    // A panic inside a previous closure leaves sessions usable
    let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions, Utc::now());
    }

    let entry = sessions
      .entry(session_id.to_string())
      .or_insert_with(|| SessionEntry {
        session: LearnerSession::new(),
        last_access: Utc::now(),
      });
    entry.last_access = Utc::now();
    f(&mut entry.session)
  }

  /// Whether a live session exists for `session_id`
  pub fn contains(&self, session_id: &str) -> bool {
    self
      .sessions
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .contains_key(session_id)
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
  let expiry = now - Duration::hours(config::SESSION_EXPIRY_HOURS);
  let before = sessions.len();
  sessions.retain(|_, entry| entry.last_access > expiry);
  let removed = before - sessions.len();
  if removed > 0 {
    tracing::debug!("Expired {} learner sessions", removed);
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_session_is_created_and_reused() {
    let store = SessionStore::new();
    store.with_session("abc", |s| s.language = AppLanguage::German);
    let language = store.with_session("abc", |s| s.language);
    assert_eq!(language, AppLanguage::German);
    assert_eq!(store.len(), 1);

    let other = store.with_session("xyz", |s| s.language);
    assert_eq!(other, AppLanguage::English);
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn test_cleanup_removes_only_expired() {
    let now = Utc::now();
    let mut sessions = HashMap::new();
    sessions.insert(
      "old".to_string(),
      SessionEntry {
        session: LearnerSession::new(),
        last_access: now - Duration::hours(config::SESSION_EXPIRY_HOURS + 1),
      },
    );
    sessions.insert(
      "fresh".to_string(),
      SessionEntry {
        session: LearnerSession::new(),
        last_access: now - Duration::minutes(5),
      },
    );
    cleanup_expired(&mut sessions, now);
    assert!(sessions.contains_key("fresh"));
    assert!(!sessions.contains_key("old"));
  }

  #[test]
  fn test_quiz_started_once_and_tracks_stored_best() {
    let mut session = LearnerSession::new();
    let catalog = KanaCatalog::hiragana();
    let quiz = session.quiz_mut(catalog.clone(), 40);
    assert_eq!(quiz.best_score(), 40);
    quiz.set_row_limit(0).unwrap();

    // Existing quiz is kept; a higher stored best is adopted
    let quiz = session.quiz_mut(catalog.clone(), 90);
    assert_eq!(quiz.row_limit(), 0);
    assert_eq!(quiz.best_score(), 90);

    // A stale lower value never lowers it
    assert_eq!(session.quiz_mut(catalog, 10).best_score(), 90);
  }

  #[test]
  fn test_contains_does_not_create() {
    let store = SessionStore::new();
    assert!(!store.contains("abc"));
    assert!(store.is_empty());
    store.with_session("abc", |_| ());
    assert!(store.contains("abc"));
  }

  #[test]
  fn test_start_review_replaces_previous_pass() {
    let mut session = LearnerSession::new();
    session.start_review("a", vec![VocabCard::new("1", "ねこ", "neko", "cat")]);
    session.start_review("b", Vec::new());
    let review = session.review.as_ref().unwrap();
    assert_eq!(review.topic_id, "b");
    assert!(review.queue.is_finished());
  }

  #[test]
  fn test_generate_session_id() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }
}
