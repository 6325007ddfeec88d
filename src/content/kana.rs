//! Static Hiragana catalog and row ordering.
//!
//! Rows are ordered the way learners usually meet them: the 46 basic
//! syllables, then the voiced rows, then the combined (ya/yu/yo) rows.
//! Quiz row limits are indices into this ordering.

use std::sync::{Arc, LazyLock};

use crate::domain::{CharacterEntry, KanaCategory};

use KanaCategory::{Diacritic, Digraph, Monograph};

/// Row keys in learning order
pub const ROWS: [&str; 27] = [
  "a", "ka", "sa", "ta", "na", "ha", "ma", "ya", "ra", "wa", "n", // basic
  "ga", "za", "da", "ba", "pa", // voiced
  "kya", "sha", "cha", "nya", "hya", "mya", "rya", "gya", "ja", "bya", "pya", // combined
];

const fn e(glyph: &'static str, romanization: &'static str, category: KanaCategory, row: &'static str) -> CharacterEntry {
  CharacterEntry::new(glyph, romanization, category, row)
}

pub const HIRAGANA: [CharacterEntry; 104] = [
  e("あ", "a", Monograph, "a"),
  e("い", "i", Monograph, "a"),
  e("う", "u", Monograph, "a"),
  e("え", "e", Monograph, "a"),
  e("お", "o", Monograph, "a"),
  e("か", "ka", Monograph, "ka"),
  e("き", "ki", Monograph, "ka"),
  e("く", "ku", Monograph, "ka"),
  e("け", "ke", Monograph, "ka"),
  e("こ", "ko", Monograph, "ka"),
  e("さ", "sa", Monograph, "sa"),
  e("し", "shi", Monograph, "sa"),
  e("す", "su", Monograph, "sa"),
  e("せ", "se", Monograph, "sa"),
  e("そ", "so", Monograph, "sa"),
  e("た", "ta", Monograph, "ta"),
  e("ち", "chi", Monograph, "ta"),
  e("つ", "tsu", Monograph, "ta"),
  e("て", "te", Monograph, "ta"),
  e("と", "to", Monograph, "ta"),
  e("な", "na", Monograph, "na"),
  e("に", "ni", Monograph, "na"),
  e("ぬ", "nu", Monograph, "na"),
  e("ね", "ne", Monograph, "na"),
  e("の", "no", Monograph, "na"),
  e("は", "ha", Monograph, "ha"),
  e("ひ", "hi", Monograph, "ha"),
  e("ふ", "fu", Monograph, "ha"),
  e("へ", "he", Monograph, "ha"),
  e("ほ", "ho", Monograph, "ha"),
  e("ま", "ma", Monograph, "ma"),
  e("み", "mi", Monograph, "ma"),
  e("む", "mu", Monograph, "ma"),
  e("め", "me", Monograph, "ma"),
  e("も", "mo", Monograph, "ma"),
  e("や", "ya", Monograph, "ya"),
  e("ゆ", "yu", Monograph, "ya"),
  e("よ", "yo", Monograph, "ya"),
  e("ら", "ra", Monograph, "ra"),
  e("り", "ri", Monograph, "ra"),
  e("る", "ru", Monograph, "ra"),
  e("れ", "re", Monograph, "ra"),
  e("ろ", "ro", Monograph, "ra"),
  e("わ", "wa", Monograph, "wa"),
  e("を", "wo", Monograph, "wa"),
  e("ん", "n", Monograph, "n"),
  e("が", "ga", Diacritic, "ga"),
  e("ぎ", "gi", Diacritic, "ga"),
  e("ぐ", "gu", Diacritic, "ga"),
  e("げ", "ge", Diacritic, "ga"),
  e("ご", "go", Diacritic, "ga"),
  e("ざ", "za", Diacritic, "za"),
  e("じ", "ji", Diacritic, "za"),
  e("ず", "zu", Diacritic, "za"),
  e("ぜ", "ze", Diacritic, "za"),
  e("ぞ", "zo", Diacritic, "za"),
  e("だ", "da", Diacritic, "da"),
  e("ぢ", "ji", Diacritic, "da"),
  e("づ", "zu", Diacritic, "da"),
  e("で", "de", Diacritic, "da"),
  e("ど", "do", Diacritic, "da"),
  e("ば", "ba", Diacritic, "ba"),
  e("び", "bi", Diacritic, "ba"),
  e("ぶ", "bu", Diacritic, "ba"),
  e("べ", "be", Diacritic, "ba"),
  e("ぼ", "bo", Diacritic, "ba"),
  e("ぱ", "pa", Diacritic, "pa"),
  e("ぴ", "pi", Diacritic, "pa"),
  e("ぷ", "pu", Diacritic, "pa"),
  e("ぺ", "pe", Diacritic, "pa"),
  e("ぽ", "po", Diacritic, "pa"),
  e("きゃ", "kya", Digraph, "kya"),
  e("きゅ", "kyu", Digraph, "kya"),
  e("きょ", "kyo", Digraph, "kya"),
  e("しゃ", "sha", Digraph, "sha"),
  e("しゅ", "shu", Digraph, "sha"),
  e("しょ", "sho", Digraph, "sha"),
  e("ちゃ", "cha", Digraph, "cha"),
  e("ちゅ", "chu", Digraph, "cha"),
  e("ちょ", "cho", Digraph, "cha"),
  e("にゃ", "nya", Digraph, "nya"),
  e("にゅ", "nyu", Digraph, "nya"),
  e("にょ", "nyo", Digraph, "nya"),
  e("ひゃ", "hya", Digraph, "hya"),
  e("ひゅ", "hyu", Digraph, "hya"),
  e("ひょ", "hyo", Digraph, "hya"),
  e("みゃ", "mya", Digraph, "mya"),
  e("みゅ", "myu", Digraph, "mya"),
  e("みょ", "myo", Digraph, "mya"),
  e("りゃ", "rya", Digraph, "rya"),
  e("りゅ", "ryu", Digraph, "rya"),
  e("りょ", "ryo", Digraph, "rya"),
  e("ぎゃ", "gya", Digraph, "gya"),
  e("ぎゅ", "gyu", Digraph, "gya"),
  e("ぎょ", "gyo", Digraph, "gya"),
  e("じゃ", "ja", Digraph, "ja"),
  e("じゅ", "ju", Digraph, "ja"),
  e("じょ", "jo", Digraph, "ja"),
  e("びゃ", "bya", Digraph, "bya"),
  e("びゅ", "byu", Digraph, "bya"),
  e("びょ", "byo", Digraph, "bya"),
  e("ぴゃ", "pya", Digraph, "pya"),
  e("ぴゅ", "pyu", Digraph, "pya"),
  e("ぴょ", "pyo", Digraph, "pya"),
];

static HIRAGANA_CATALOG: LazyLock<Arc<KanaCatalog>> =
  LazyLock::new(|| Arc::new(KanaCatalog::new(HIRAGANA.to_vec(), ROWS.to_vec())));

/// Ordered character entries with their row ordering
#[derive(Debug, Clone)]
pub struct KanaCatalog {
  entries: Vec<CharacterEntry>,
  rows: Vec<&'static str>,
}

impl KanaCatalog {
  pub fn new(entries: Vec<CharacterEntry>, rows: Vec<&'static str>) -> Self {
    Self { entries, rows }
  }

  /// The built-in Hiragana catalog (shared)
  pub fn hiragana() -> Arc<KanaCatalog> {
    Arc::clone(&HIRAGANA_CATALOG)
  }

  pub fn entries(&self) -> &[CharacterEntry] {
    &self.entries
  }

  pub fn rows(&self) -> &[&'static str] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Row limit that includes every row
  pub fn last_row_index(&self) -> usize {
    self.rows.len().saturating_sub(1)
  }

  /// Entries whose row is among the first `row_limit + 1` rows.
  /// Recomputed on every call; the catalog is small.
  pub fn pool(&self, row_limit: usize) -> Vec<&CharacterEntry> {
    let end = (row_limit + 1).min(self.rows.len());
    let allowed = &self.rows[..end];
    self
      .entries
      .iter()
      .filter(|entry| allowed.contains(&entry.row))
      .collect()
  }

  pub fn find_glyph(&self, glyph: &str) -> Option<&CharacterEntry> {
    self.entries.iter().find(|entry| entry.glyph == glyph)
  }

  pub fn by_category(&self, category: KanaCategory) -> impl Iterator<Item = &CharacterEntry> {
    self.entries.iter().filter(move |entry| entry.category == category)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_catalog_counts() {
    let catalog = KanaCatalog::hiragana();
    assert_eq!(catalog.len(), 104);
    assert_eq!(catalog.by_category(Monograph).count(), 46);
    assert_eq!(catalog.by_category(Diacritic).count(), 25);
    assert_eq!(catalog.by_category(Digraph).count(), 33);
  }

  #[test]
  fn test_every_entry_row_is_known() {
    for entry in HIRAGANA.iter() {
      assert!(ROWS.contains(&entry.row), "unknown row {} for {}", entry.row, entry.glyph);
    }
  }

  #[test]
  fn test_glyphs_are_unique() {
    let mut glyphs: Vec<&str> = HIRAGANA.iter().map(|e| e.glyph).collect();
    glyphs.sort();
    glyphs.dedup();
    assert_eq!(glyphs.len(), HIRAGANA.len());
  }

  #[test]
  fn test_pool_first_row_only() {
    let catalog = KanaCatalog::hiragana();
    let pool = catalog.pool(0);
    assert_eq!(pool.len(), 5);
    assert!(pool.iter().all(|e| e.row == "a"));
  }

  #[test]
  fn test_pool_grows_with_limit() {
    let catalog = KanaCatalog::hiragana();
    assert_eq!(catalog.pool(1).len(), 10);
    assert_eq!(catalog.pool(10).len(), 46);
    assert_eq!(catalog.pool(catalog.last_row_index()).len(), 104);
  }

  #[test]
  fn test_pool_limit_past_end_is_clamped() {
    let catalog = KanaCatalog::hiragana();
    assert_eq!(catalog.pool(500).len(), 104);
  }

  #[test]
  fn test_find_glyph() {
    let catalog = KanaCatalog::hiragana();
    assert_eq!(catalog.find_glyph("し").map(|e| e.romanization), Some("shi"));
    assert!(catalog.find_glyph("x").is_none());
  }
}
