//! Word builder: assemble kana into a candidate word for analysis.

use crate::assistant::WordAnalysis;
use crate::config;
use crate::content::KanaCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
  /// Already holding `MAX_WORD_LENGTH` glyphs
  Full,
  /// Glyph is not in the kana catalog
  UnknownGlyph(String),
  /// No glyph at that index
  OutOfRange(usize),
  /// Nothing to analyze
  Empty,
}

impl std::fmt::Display for BuilderError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Full => write!(f, "Words are limited to {} characters", config::MAX_WORD_LENGTH),
      Self::UnknownGlyph(g) => write!(f, "Unknown character: {}", g),
      Self::OutOfRange(i) => write!(f, "No character at position {}", i),
      Self::Empty => write!(f, "Add some characters first"),
    }
  }
}

impl std::error::Error for BuilderError {}

#[derive(Debug, Clone, Default)]
pub struct WordBuilder {
  glyphs: Vec<String>,
  analysis: Option<WordAnalysis>,
}

impl WordBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn glyphs(&self) -> &[String] {
    &self.glyphs
  }

  pub fn word(&self) -> String {
    self.glyphs.concat()
  }

  pub fn len(&self) -> usize {
    self.glyphs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.glyphs.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.glyphs.len() >= config::MAX_WORD_LENGTH
  }

  pub fn analysis(&self) -> Option<&WordAnalysis> {
    self.analysis.as_ref()
  }

  pub fn push(&mut self, glyph: &str, catalog: &KanaCatalog) -> Result<(), BuilderError> {
    if self.is_full() {
      return Err(BuilderError::Full);
    }
    if catalog.find_glyph(glyph).is_none() {
      return Err(BuilderError::UnknownGlyph(glyph.to_string()));
    }
    self.glyphs.push(glyph.to_string());
    self.analysis = None;
    Ok(())
  }

  pub fn remove(&mut self, index: usize) -> Result<String, BuilderError> {
    if index >= self.glyphs.len() {
      return Err(BuilderError::OutOfRange(index));
    }
    self.analysis = None;
    Ok(self.glyphs.remove(index))
  }

  pub fn clear(&mut self) {
    self.glyphs.clear();
    self.analysis = None;
  }

  /// Word to send for analysis, refused when empty
  pub fn analysis_request(&self) -> Result<String, BuilderError> {
    if self.is_empty() {
      return Err(BuilderError::Empty);
    }
    Ok(self.word())
  }

  /// Store an analysis if it still matches the current word. An edit made
  /// while the request was in flight makes it stale.
  pub fn set_analysis(&mut self, word: &str, analysis: WordAnalysis) -> bool {
    if word != self.word() {
      return false;
    }
    self.analysis = Some(analysis);
    true
  }
}
