pub mod kana;
pub mod language;
pub mod vocab;

pub use kana::{CharacterEntry, KanaCategory};
pub use language::AppLanguage;
pub use vocab::{VocabCard, VocabTopic};
