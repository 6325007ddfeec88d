use serde::{Deserialize, Serialize};

/// Language used for assistant prompts and topic titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppLanguage {
  #[default]
  English,
  Uzbek,
  Russian,
  German,
  Japanese,
}

impl AppLanguage {
  pub const ALL: [AppLanguage; 5] = [
    Self::English,
    Self::Uzbek,
    Self::Russian,
    Self::German,
    Self::Japanese,
  ];

  pub fn from_code(s: &str) -> Option<Self> {
    match s {
      "en" => Some(Self::English),
      "uz" => Some(Self::Uzbek),
      "ru" => Some(Self::Russian),
      "de" => Some(Self::German),
      "ja" => Some(Self::Japanese),
      _ => None,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::English => "en",
      Self::Uzbek => "uz",
      Self::Russian => "ru",
      Self::German => "de",
      Self::Japanese => "ja",
    }
  }

  /// Name of the language in itself; this is what prompts ask for
  pub fn native_name(&self) -> &'static str {
    match self {
      Self::English => "English",
      Self::Uzbek => "Oʻzbek",
      Self::Russian => "Русский",
      Self::German => "Deutsch",
      Self::Japanese => "日本語",
    }
  }

  pub fn index(&self) -> usize {
    match self {
      Self::English => 0,
      Self::Uzbek => 1,
      Self::Russian => 2,
      Self::German => 3,
      Self::Japanese => 4,
    }
  }
}
