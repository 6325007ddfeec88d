//! Built-in vocabulary topics and the user's custom topic.

use crate::domain::{VocabCard, VocabTopic};

/// Topic id of the user-managed word list
pub const CUSTOM_TOPIC_ID: &str = "custom";

const CUSTOM_TITLES: [&str; 5] = ["My Words", "Mening so'zlarim", "Мои слова", "Meine Wörter", "単語帳"];

struct TopicSeed {
  id: &'static str,
  titles: [&'static str; 5],
  // (id suffix, script, romanization, meaning)
  words: &'static [(&'static str, &'static str, &'static str, &'static str)],
}

const SEEDS: &[TopicSeed] = &[
  TopicSeed {
    id: "greetings",
    titles: ["Greetings", "Salomlashish", "Приветствия", "Begrüßungen", "あいさつ"],
    words: &[
      ("konnichiwa", "こんにちは", "konnichiwa", "hello"),
      ("ohayou", "おはよう", "ohayou", "good morning"),
      ("konbanwa", "こんばんは", "konbanwa", "good evening"),
      ("arigatou", "ありがとう", "arigatou", "thank you"),
      ("sayounara", "さようなら", "sayounara", "goodbye"),
      ("sumimasen", "すみません", "sumimasen", "excuse me"),
      ("oyasumi", "おやすみ", "oyasumi", "good night"),
      ("hai", "はい", "hai", "yes"),
      ("iie", "いいえ", "iie", "no"),
    ],
  },
  TopicSeed {
    id: "animals",
    titles: ["Animals", "Hayvonlar", "Животные", "Tiere", "どうぶつ"],
    words: &[
      ("neko", "ねこ", "neko", "cat"),
      ("inu", "いぬ", "inu", "dog"),
      ("tori", "とり", "tori", "bird"),
      ("sakana", "さかな", "sakana", "fish"),
      ("uma", "うま", "uma", "horse"),
      ("usagi", "うさぎ", "usagi", "rabbit"),
      ("kuma", "くま", "kuma", "bear"),
      ("saru", "さる", "saru", "monkey"),
    ],
  },
  TopicSeed {
    id: "food",
    titles: ["Food & Drink", "Ovqat va ichimlik", "Еда и напитки", "Essen & Trinken", "たべもの"],
    words: &[
      ("gohan", "ごはん", "gohan", "rice"),
      ("mizu", "みず", "mizu", "water"),
      ("ocha", "おちゃ", "ocha", "tea"),
      ("pan", "ぱん", "pan", "bread"),
      ("tamago", "たまご", "tamago", "egg"),
      ("niku", "にく", "niku", "meat"),
      ("yasai", "やさい", "yasai", "vegetables"),
      ("ringo", "りんご", "ringo", "apple"),
    ],
  },
  TopicSeed {
    id: "numbers",
    titles: ["Numbers", "Raqamlar", "Числа", "Zahlen", "かず"],
    words: &[
      ("ichi", "いち", "ichi", "one"),
      ("ni", "に", "ni", "two"),
      ("san", "さん", "san", "three"),
      ("yon", "よん", "yon", "four"),
      ("go", "ご", "go", "five"),
      ("roku", "ろく", "roku", "six"),
      ("nana", "なな", "nana", "seven"),
      ("hachi", "はち", "hachi", "eight"),
      ("kyuu", "きゅう", "kyuu", "nine"),
      ("juu", "じゅう", "juu", "ten"),
    ],
  },
];

pub fn builtin_topics() -> Vec<VocabTopic> {
  SEEDS
    .iter()
    .map(|seed| VocabTopic {
      id: seed.id.to_string(),
      titles: seed.titles,
      cards: seed
        .words
        .iter()
        .map(|(suffix, script, rom, meaning)| {
          VocabCard::new(format!("{}-{}", seed.id, suffix), *script, *rom, *meaning)
        })
        .collect(),
      is_custom: false,
    })
    .collect()
}

pub fn custom_topic(cards: Vec<VocabCard>) -> VocabTopic {
  VocabTopic {
    id: CUSTOM_TOPIC_ID.to_string(),
    titles: CUSTOM_TITLES,
    cards,
    is_custom: true,
  }
}

/// Built-in topics followed by the custom topic
pub fn all_topics(custom_cards: Vec<VocabCard>) -> Vec<VocabTopic> {
  let mut topics = builtin_topics();
  topics.push(custom_topic(custom_cards));
  topics
}
