//! Static learning content: the kana chart and built-in vocabulary topics.

pub mod kana;
pub mod topics;

pub use kana::{KanaCatalog, HIRAGANA, ROWS};
pub use topics::{all_topics, builtin_topics, custom_topic, CUSTOM_TOPIC_ID};
