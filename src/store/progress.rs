//! Typed access to the persisted learner progress.
//!
//! | Key | Value |
//! |---|---|
//! | `learned-characters` | JSON array of glyphs, in the order they were marked |
//! | `custom-vocabulary` | JSON array of [`VocabCard`] |
//! | `vocabulary-mastery` | JSON object card id → bool |
//! | `quiz-high-score` | JSON integer |
//!
//! Malformed stored JSON is logged and read as the empty default; it never
//! blocks startup or a request.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{KvStore, LogOnError, StoreError};
use crate::domain::VocabCard;

pub const LEARNED_CHARACTERS_KEY: &str = "learned-characters";
pub const CUSTOM_VOCABULARY_KEY: &str = "custom-vocabulary";
pub const VOCABULARY_MASTERY_KEY: &str = "vocabulary-mastery";
pub const QUIZ_HIGH_SCORE_KEY: &str = "quiz-high-score";

pub type MasteryMap = BTreeMap<String, bool>;

/// Card id → mastered flag. Absent ids read as not mastered.
pub trait MasteryStore {
    fn get(&self, card_id: &str) -> bool;
    fn set(&self, card_id: &str, mastered: bool) -> Result<(), StoreError>;
    /// Forget the given ids (topic reset)
    fn clear(&self, card_ids: &[String]) -> Result<(), StoreError>;
}

/// Learner progress over an injected [`KvStore`]
#[derive(Clone)]
pub struct Progress {
    kv: Arc<dyn KvStore>,
    // Serializes read-modify-write cycles on the JSON blobs
    write_lock: Arc<Mutex<()>>,
}

impl Progress {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Lock)
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self
            .kv
            .get(key)
            .log_warn(&format!("Failed to read {}", key))
            .flatten()
        else {
            return T::default();
        };

        serde_json::from_str(&raw).log_warn_default(&format!("Ignoring corrupted {}", key))
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.kv.set(key, &json)
    }

    // ==================== Chart ====================

    pub fn learned_characters(&self) -> Vec<String> {
        self.load(LEARNED_CHARACTERS_KEY)
    }

    pub fn is_learned(&self, glyph: &str) -> bool {
        self.learned_characters().iter().any(|g| g == glyph)
    }

    /// Flip a glyph's learned flag; returns whether it is now learned
    pub fn toggle_learned(&self, glyph: &str) -> Result<bool, StoreError> {
        let _guard = self.lock_writes()?;
        let mut learned = self.learned_characters();
        let now_learned = if let Some(pos) = learned.iter().position(|g| g == glyph) {
            learned.remove(pos);
            false
        } else {
            learned.push(glyph.to_string());
            true
        };
        self.save(LEARNED_CHARACTERS_KEY, &learned)?;
        Ok(now_learned)
    }

    // ==================== Custom vocabulary ====================

    pub fn custom_words(&self) -> Vec<VocabCard> {
        self.load(CUSTOM_VOCABULARY_KEY)
    }

    pub fn add_custom_word(&self, card: VocabCard) -> Result<(), StoreError> {
        self.add_custom_word_with(|_| card).map(|_| ())
    }

    /// Append the card built by `make` from the current words. `make` runs
    /// under the write lock, so ids derived from the existing words cannot
    /// collide with a concurrent add.
    pub fn add_custom_word_with(
        &self,
        make: impl FnOnce(&[VocabCard]) -> VocabCard,
    ) -> Result<VocabCard, StoreError> {
        let _guard = self.lock_writes()?;
        let mut words = self.custom_words();
        let card = make(&words);
        words.push(card.clone());
        self.save(CUSTOM_VOCABULARY_KEY, &words)?;
        Ok(card)
    }

    /// Remove a custom word and its mastery entry. Returns false if no word
    /// had that id.
    pub fn delete_custom_word(&self, card_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock_writes()?;
        let mut words = self.custom_words();
        let before = words.len();
        words.retain(|w| w.id != card_id);
        if words.len() == before {
            return Ok(false);
        }
        self.save(CUSTOM_VOCABULARY_KEY, &words)?;

        let mut mastery = self.mastery_map();
        if mastery.remove(card_id).is_some() {
            self.save(VOCABULARY_MASTERY_KEY, &mastery)?;
        }
        Ok(true)
    }

    // ==================== Quiz ====================

    pub fn high_score(&self) -> u32 {
        self.load(QUIZ_HIGH_SCORE_KEY)
    }

    /// Persist `score` if it beats the stored best. Returns true when written.
    pub fn record_score(&self, score: u32) -> Result<bool, StoreError> {
        let _guard = self.lock_writes()?;
        if score <= self.high_score() {
            return Ok(false);
        }
        self.save(QUIZ_HIGH_SCORE_KEY, &score)?;
        Ok(true)
    }

    // ==================== Mastery ====================

    pub fn mastery_map(&self) -> MasteryMap {
        self.load(VOCABULARY_MASTERY_KEY)
    }

    pub fn mastered_count(&self, card_ids: &[String]) -> usize {
        let mastery = self.mastery_map();
        card_ids
            .iter()
            .filter(|id| mastery.get(id.as_str()).copied().unwrap_or(false))
            .count()
    }
}

impl MasteryStore for Progress {
    fn get(&self, card_id: &str) -> bool {
        self.mastery_map().get(card_id).copied().unwrap_or(false)
    }

    fn set(&self, card_id: &str, mastered: bool) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        let mut mastery = self.mastery_map();
        mastery.insert(card_id.to_string(), mastered);
        self.save(VOCABULARY_MASTERY_KEY, &mastery)
    }

    fn clear(&self, card_ids: &[String]) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        let mut mastery = self.mastery_map();
        for id in card_ids {
            mastery.remove(id);
        }
        self.save(VOCABULARY_MASTERY_KEY, &mastery)
    }
}
