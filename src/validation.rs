//! Local answer matching used before (and instead of) the remote judge.
//!
//! Matching is deliberately strict: Unicode-normalized, trimmed,
//! case-insensitive equality. Anything looser (synonyms, typos) is the
//! assistant's job.

use unicode_normalization::UnicodeNormalization;

/// Normalize an answer for comparison
/// - NFC-normalizes (so composed and decomposed kana/accents compare equal)
/// - Trims surrounding whitespace
/// - Converts to lowercase
pub fn normalize_answer(input: &str) -> String {
  input.trim().nfc().collect::<String>().to_lowercase()
}

/// Case-insensitive exact match of a typed answer against a target meaning
pub fn is_exact_match(answer: &str, target: &str) -> bool {
  normalize_answer(answer) == normalize_answer(target)
}

/// True if the input has something to check
pub fn is_blank(input: &str) -> bool {
  input.trim().is_empty()
}
