//! Multiple-choice question generation for the kana quiz.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

use crate::config;
use crate::content::KanaCatalog;
use crate::domain::CharacterEntry;

/// One quiz round: a glyph and its shuffled romanization choices
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
  pub target: CharacterEntry,
  /// Exactly `config::CHOICE_COUNT` distinct romanizations, one of them the
  /// target's
  pub choices: Vec<String>,
}

impl QuizQuestion {
  pub fn answer(&self) -> &str {
    self.target.romanization
  }

  pub fn is_correct(&self, choice: &str) -> bool {
    choice == self.target.romanization
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
  /// Row limit points past the row ordering
  InvalidRowLimit { limit: usize, rows: usize },
  /// Not enough eligible entries (or distinct romanizations) for a question
  InsufficientPool { entries: usize, distinct: usize },
}

impl std::fmt::Display for QuizError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::InvalidRowLimit { limit, rows } => {
        write!(f, "Row limit {} is out of range ({} rows)", limit, rows)
      }
      Self::InsufficientPool { entries, distinct } => write!(
        f,
        "Need {} distinct answers, pool has {} entries with {} distinct romanizations",
        config::CHOICE_COUNT,
        entries,
        distinct
      ),
    }
  }
}

impl std::error::Error for QuizError {}

/// Build a question from the rows up to and including `row_limit`.
///
/// The target is drawn uniformly from the filtered pool. Distractors are drawn
/// uniformly from the same pool by rejection until the choice set holds
/// `CHOICE_COUNT` distinct romanizations, then the set is shuffled.
pub fn generate_question<R: Rng + ?Sized>(
  catalog: &KanaCatalog,
  row_limit: usize,
  rng: &mut R,
) -> Result<QuizQuestion, QuizError> {
  let rows = catalog.rows().len();
  if row_limit >= rows {
    return Err(QuizError::InvalidRowLimit { limit: row_limit, rows });
  }

  let pool = catalog.pool(row_limit);
  let distinct = pool
    .iter()
    .map(|entry| entry.romanization)
    .collect::<HashSet<_>>()
    .len();
  // With fewer distinct romanizations the rejection loop below could never finish
  if pool.len() < config::CHOICE_COUNT || distinct < config::CHOICE_COUNT {
    return Err(QuizError::InsufficientPool {
      entries: pool.len(),
      distinct,
    });
  }

  let target = **pool
    .choose(rng)
    .ok_or(QuizError::InsufficientPool { entries: 0, distinct: 0 })?;

  let mut seen: HashSet<&str> = HashSet::with_capacity(config::CHOICE_COUNT);
  let mut choices: Vec<String> = Vec::with_capacity(config::CHOICE_COUNT);
  seen.insert(target.romanization);
  choices.push(target.romanization.to_string());

  while choices.len() < config::CHOICE_COUNT {
    let candidate = pool[rng.random_range(0..pool.len())];
    if seen.insert(candidate.romanization) {
      choices.push(candidate.romanization.to_string());
    }
  }

  choices.shuffle(rng);

  Ok(QuizQuestion { target, choices })
}
