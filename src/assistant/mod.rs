//! Language-model assistant: mnemonics, smart vocabulary entry, answer
//! judging and word analysis.
//!
//! [`LanguageModel`] is the raw remote interface and may fail. [`Assistant`]
//! wraps an optional model and never fails: a missing credential or any
//! remote error yields the documented fallback value, logged at warn.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::{AppLanguage, VocabCard};
use crate::validation::is_exact_match;

pub use gemini::GeminiClient;

pub const MISSING_KEY_MNEMONIC: &str = "API Key missing. Imagine a picture matching the shape!";
pub const FALLBACK_MNEMONIC: &str = "Visualize the shape!";

#[derive(Debug)]
pub enum AssistantError {
    /// No API key configured
    MissingCredential,
    /// Transport failure
    Http(reqwest::Error),
    /// Non-success status from the API
    Api { status: u16, message: String },
    /// Response had no usable text or did not decode
    InvalidResponse(String),
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "API key is missing"),
            Self::Http(e) => write!(f, "Request failed: {}", e),
            Self::Api { status, message } => write!(f, "API error {}: {}", status, message),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for AssistantError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}

/// A vocabulary entry proposed by the model for a free-form query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedVocab {
    #[serde(rename = "japanese")]
    pub script: String,
    #[serde(rename = "romaji")]
    pub romanization: String,
    pub meaning: String,
}

impl GeneratedVocab {
    pub fn is_complete(&self) -> bool {
        ![&self.script, &self.romanization, &self.meaning]
            .iter()
            .any(|field| field.trim().is_empty())
    }

    pub fn into_card(self, id: impl Into<String>) -> VocabCard {
        VocabCard::new(
            id,
            self.script.trim(),
            self.romanization.trim(),
            self.meaning.trim(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub japanese: String,
    pub romaji: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnalysis {
    pub is_valid: bool,
    pub reading: String,
    pub meaning: String,
    pub breakdown: String,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
}

impl WordAnalysis {
    /// Shown when the analysis service cannot be reached
    pub fn unavailable() -> Self {
        Self {
            is_valid: false,
            reading: "Error".to_string(),
            meaning: "Service unavailable".to_string(),
            breakdown: "Please check your internet or API key.".to_string(),
            examples: Vec::new(),
        }
    }
}

/// Remote language model. Implementations report every failure; fallback
/// policy belongs to [`Assistant`].
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn mnemonic(
        &self,
        glyph: &str,
        romanization: &str,
        language: AppLanguage,
    ) -> Result<String, AssistantError>;

    async fn vocab_entry(
        &self,
        query: &str,
        language: AppLanguage,
    ) -> Result<Option<GeneratedVocab>, AssistantError>;

    async fn judge_answer(
        &self,
        answer: &str,
        target: &str,
        language: AppLanguage,
    ) -> Result<bool, AssistantError>;

    async fn analyze_word(
        &self,
        script: &str,
        language: AppLanguage,
    ) -> Result<WordAnalysis, AssistantError>;
}

#[derive(Clone, Default)]
pub struct Assistant {
    model: Option<Arc<dyn LanguageModel>>,
}

impl Assistant {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    /// No model: every operation returns its fallback
    pub fn offline() -> Self {
        Self { model: None }
    }

    /// Build a Gemini-backed assistant, or an offline one when no key is set
    /// or the client cannot be created.
    pub fn from_api_key(api_key: Option<&str>, model: &str) -> Self {
        let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            tracing::warn!("No Gemini API key configured, assistant features use fallbacks");
            return Self::offline();
        };
        match GeminiClient::new(key, model) {
            Ok(client) => {
                tracing::info!("Assistant using Gemini model {}", model);
                Self::new(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("Failed to create Gemini client, running offline: {}", e);
                Self::offline()
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.model.is_some()
    }

    pub async fn mnemonic(&self, glyph: &str, romanization: &str, language: AppLanguage) -> String {
        let Some(model) = &self.model else {
            return MISSING_KEY_MNEMONIC.to_string();
        };
        match model.mnemonic(glyph, romanization, language).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => FALLBACK_MNEMONIC.to_string(),
            Err(e) => {
                tracing::warn!("Mnemonic for {} failed: {}", glyph, e);
                FALLBACK_MNEMONIC.to_string()
            }
        }
    }

    /// Resolve a free-form query into a vocabulary entry. `None` means
    /// nothing should be added.
    pub async fn vocab_entry(&self, query: &str, language: AppLanguage) -> Option<GeneratedVocab> {
        let model = self.model.as_ref()?;
        match model.vocab_entry(query, language).await {
            Ok(Some(entry)) if entry.is_complete() => Some(entry),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Vocabulary lookup for {:?} failed: {}", query, e);
                None
            }
        }
    }

    /// Soft-match a typed answer against the target meaning. Falls back to
    /// case-insensitive exact match.
    pub async fn judge_answer(&self, answer: &str, target: &str, language: AppLanguage) -> bool {
        let Some(model) = &self.model else {
            return is_exact_match(answer, target);
        };
        match model.judge_answer(answer, target, language).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Answer check failed, using exact match: {}", e);
                is_exact_match(answer, target)
            }
        }
    }

    pub async fn analyze_word(&self, script: &str, language: AppLanguage) -> WordAnalysis {
        let Some(model) = &self.model else {
            return WordAnalysis::unavailable();
        };
        match model.analyze_word(script, language).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Word analysis for {} failed: {}", script, e);
                WordAnalysis::unavailable()
            }
        }
    }
}
