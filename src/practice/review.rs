//! Flashcard practice pass over one topic.
//!
//! The working order is shuffled once when the pass starts. Each card moves
//! through `Idle → Checking → Correct | Wrong`; grading advances to the next
//! card until the queue is finished.
//!
//! Checking is split in two so callers never hold the queue across a remote
//! call: [`ReviewQueue::begin_check`] decides locally (exact match) or moves
//! to `Checking`, and [`ReviewQueue::resolve_check`] applies the judge's
//! verdict if the card is still waiting for it.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::assistant::Assistant;
use crate::domain::{AppLanguage, VocabCard};
use crate::store::{MasteryStore, StoreError};
use crate::validation::{is_blank, is_exact_match};

/// Input state of the current card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardInput {
  #[default]
  Idle,
  Checking,
  Correct,
  Wrong,
}

impl CardInput {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::Checking => "checking",
      Self::Correct => "correct",
      Self::Wrong => "wrong",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
  pub mastered: u32,
  pub retry: u32,
}

/// What `begin_check` decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStep {
  /// Exact match; the card is already `Correct`
  Matched,
  /// No exact match; ask the judge and call `resolve_check`
  NeedsJudge { answer: String, target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
  pub card_id: String,
  pub mastered: bool,
  pub finished: bool,
}

#[derive(Debug)]
pub enum ReviewError {
  /// The pass is over; only exit is possible
  Finished,
  /// The action names a card that is not the current one
  StaleCard { expected: String, got: String },
  /// Nothing typed
  EmptyAnswer,
  /// A judge verdict is still pending for this card
  CheckPending,
  /// Answer already accepted; input is locked
  InputLocked,
  Store(StoreError),
}

impl std::fmt::Display for ReviewError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Finished => write!(f, "Practice is finished"),
      Self::StaleCard { expected, got } => {
        write!(f, "Card {} is not the current card ({})", got, expected)
      }
      Self::EmptyAnswer => write!(f, "Answer is empty"),
      Self::CheckPending => write!(f, "Answer is still being checked"),
      Self::InputLocked => write!(f, "Answer already accepted"),
      Self::Store(e) => write!(f, "Could not save mastery: {}", e),
    }
  }
}

impl std::error::Error for ReviewError {}

impl From<StoreError> for ReviewError {
  fn from(e: StoreError) -> Self {
    Self::Store(e)
  }
}

#[derive(Debug, Clone)]
pub struct ReviewQueue {
  order: Vec<VocabCard>,
  position: usize,
  tally: Tally,
  input: CardInput,
  flipped: bool,
}

impl ReviewQueue {
  /// Start a pass with a fresh uniform shuffle of `cards`
  pub fn start<R: Rng + ?Sized>(mut cards: Vec<VocabCard>, rng: &mut R) -> Self {
    cards.shuffle(rng);
    Self {
      order: cards,
      position: 0,
      tally: Tally::default(),
      input: CardInput::Idle,
      flipped: false,
    }
  }

  pub fn current(&self) -> Option<&VocabCard> {
    self.order.get(self.position)
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  pub fn is_finished(&self) -> bool {
    self.position >= self.order.len()
  }

  pub fn tally(&self) -> Tally {
    self.tally
  }

  pub fn input(&self) -> CardInput {
    self.input
  }

  pub fn is_flipped(&self) -> bool {
    self.flipped
  }

  pub fn order(&self) -> &[VocabCard] {
    &self.order
  }

  /// The current card, provided `card_id` still names it
  pub fn current_checked(&self, card_id: &str) -> Result<&VocabCard, ReviewError> {
    let card = self.current().ok_or(ReviewError::Finished)?;
    if card.id != card_id {
      return Err(ReviewError::StaleCard {
        expected: card.id.clone(),
        got: card_id.to_string(),
      });
    }
    Ok(card)
  }

  /// Submit a typed meaning. Exact (case-insensitive) matches are accepted
  /// immediately without consulting the judge.
  pub fn begin_check(&mut self, card_id: &str, answer: &str) -> Result<CheckStep, ReviewError> {
    let card = self.current_checked(card_id)?;
    match self.input {
      CardInput::Checking => return Err(ReviewError::CheckPending),
      CardInput::Correct => return Err(ReviewError::InputLocked),
      CardInput::Idle | CardInput::Wrong => {}
    }
    if is_blank(answer) {
      return Err(ReviewError::EmptyAnswer);
    }

    if is_exact_match(answer, &card.meaning) {
      self.input = CardInput::Correct;
      Ok(CheckStep::Matched)
    } else {
      let target = card.meaning.clone();
      self.input = CardInput::Checking;
      Ok(CheckStep::NeedsJudge {
        answer: answer.trim().to_string(),
        target,
      })
    }
  }

  /// Apply a judge verdict. Returns `None` when the verdict is stale (the
  /// card moved on, was skipped, or is no longer waiting) and was discarded.
  pub fn resolve_check(&mut self, card_id: &str, verdict: bool) -> Option<CardInput> {
    if self.input != CardInput::Checking || self.current_checked(card_id).is_err() {
      tracing::debug!("Discarding stale verdict for card {}", card_id);
      return None;
    }
    self.input = if verdict {
      CardInput::Correct
    } else {
      CardInput::Wrong
    };
    Some(self.input)
  }

  /// The learner edited their answer. Clears a `Wrong` verdict.
  pub fn edit_input(&mut self) -> Result<CardInput, ReviewError> {
    if self.is_finished() {
      return Err(ReviewError::Finished);
    }
    match self.input {
      CardInput::Correct => Err(ReviewError::InputLocked),
      CardInput::Wrong => {
        self.input = CardInput::Idle;
        Ok(self.input)
      }
      CardInput::Idle | CardInput::Checking => Ok(self.input),
    }
  }

  /// Delayed flip after a correct answer. No-op otherwise.
  pub fn flip(&mut self) -> bool {
    if self.input == CardInput::Correct && !self.flipped {
      self.flipped = true;
      true
    } else {
      false
    }
  }

  /// Reveal the back without grading. Not available once the answer was
  /// accepted.
  pub fn skip(&mut self) -> Result<(), ReviewError> {
    if self.is_finished() {
      return Err(ReviewError::Finished);
    }
    if self.input == CardInput::Correct {
      return Err(ReviewError::InputLocked);
    }
    self.flipped = true;
    self.input = CardInput::Idle;
    Ok(())
  }

  /// Grade the current card and move on. "Easy", or an answer already
  /// accepted by `check`, marks the card mastered; "Hard" only counts a retry
  /// and never clears an existing mastery flag.
  pub fn grade(
    &mut self,
    card_id: &str,
    easy: bool,
    mastery: &dyn MasteryStore,
  ) -> Result<GradeOutcome, ReviewError> {
    let card_id = self.current_checked(card_id)?.id.clone();
    if self.input == CardInput::Checking {
      return Err(ReviewError::CheckPending);
    }

    let mastered = easy || self.input == CardInput::Correct;
    if mastered {
      mastery.set(&card_id, true)?;
      self.tally.mastered += 1;
    } else {
      self.tally.retry += 1;
    }

    self.position += 1;
    self.input = CardInput::Idle;
    self.flipped = false;

    Ok(GradeOutcome {
      card_id,
      mastered,
      finished: self.is_finished(),
    })
  }
}

/// Check a typed answer end to end: exact match first, then the assistant's
/// judge. The assistant never fails; without a model it falls back to the
/// exact match that already failed, so the card ends up `Wrong`.
pub async fn check_answer(
  queue: &mut ReviewQueue,
  card_id: &str,
  answer: &str,
  assistant: &Assistant,
  language: AppLanguage,
) -> Result<CardInput, ReviewError> {
  match queue.begin_check(card_id, answer)? {
    CheckStep::Matched => Ok(CardInput::Correct),
    CheckStep::NeedsJudge { answer, target } => {
      let verdict = assistant.judge_answer(&answer, &target, language).await;
      Ok(queue.resolve_check(card_id, verdict).unwrap_or(queue.input()))
    }
  }
}
