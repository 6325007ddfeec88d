use serde::Serialize;

/// Script category of a kana entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KanaCategory {
  /// Plain syllables (あ, か, ...)
  Monograph,
  /// Voiced or half-voiced syllables marked with dakuten/handakuten (が, ぱ, ...)
  Diacritic,
  /// Combined syllables with a small ya/yu/yo (きゃ, しゅ, ...)
  Digraph,
}

impl KanaCategory {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "monograph" => Some(Self::Monograph),
      "diacritic" => Some(Self::Diacritic),
      "digraph" => Some(Self::Digraph),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Monograph => "monograph",
      Self::Diacritic => "diacritic",
      Self::Digraph => "digraph",
    }
  }
}

/// One chart cell. Identity is the (romanization, glyph) pair, since some
/// romanizations are shared (じ/ぢ are both "ji").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterEntry {
  pub glyph: &'static str,
  pub romanization: &'static str,
  pub category: KanaCategory,
  /// Row key, e.g. "ka" for か/き/く/け/こ
  pub row: &'static str,
}

impl CharacterEntry {
  pub const fn new(
    glyph: &'static str,
    romanization: &'static str,
    category: KanaCategory,
    row: &'static str,
  ) -> Self {
    Self {
      glyph,
      romanization,
      category,
      row,
    }
  }

  /// Stable key used in templates and forms
  pub fn key(&self) -> String {
    format!("{}-{}", self.romanization, self.glyph)
  }
}
