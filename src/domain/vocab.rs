use serde::{Deserialize, Serialize};

use super::AppLanguage;

/// A vocabulary flashcard. Built-in cards are static; custom cards are
/// persisted under `custom-vocabulary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabCard {
  pub id: String,
  /// Word as written (mostly hiragana)
  #[serde(rename = "japanese")]
  pub script: String,
  #[serde(rename = "romaji")]
  pub romanization: String,
  pub meaning: String,
}

impl VocabCard {
  pub fn new(
    id: impl Into<String>,
    script: impl Into<String>,
    romanization: impl Into<String>,
    meaning: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      script: script.into(),
      romanization: romanization.into(),
      meaning: meaning.into(),
    }
  }
}

/// A group of cards practiced together
#[derive(Debug, Clone)]
pub struct VocabTopic {
  pub id: String,
  /// Titles indexed by `AppLanguage::index()`
  pub titles: [&'static str; 5],
  pub cards: Vec<VocabCard>,
  pub is_custom: bool,
}

impl VocabTopic {
  pub fn title(&self, language: AppLanguage) -> &'static str {
    let title = self.titles[language.index()];
    if title.is_empty() {
      self.titles[AppLanguage::English.index()]
    } else {
      title
    }
  }

  pub fn card(&self, card_id: &str) -> Option<&VocabCard> {
    self.cards.iter().find(|c| c.id == card_id)
  }

  pub fn card_ids(&self) -> Vec<String> {
    self.cards.iter().map(|c| c.id.clone()).collect()
  }
}
