//! Gemini `generateContent` client.
//!
//! Structured operations ask for `application/json` output with a
//! `responseSchema`; the text of the first candidate is then decoded.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AssistantError, GeneratedVocab, LanguageModel, WordAnalysis};
use crate::config;
use crate::domain::AppLanguage;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AssistantError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AssistantError::MissingCredential);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config::ASSISTANT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    /// Send one prompt and return the first candidate's text
    async fn generate(&self, prompt: &str, schema: Option<Value>) -> Result<String, AssistantError> {
        let body = request_body(prompt, schema);
        let resp = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: Value = resp.json().await?;
        candidate_text(&json)
            .map(str::to_string)
            .ok_or_else(|| AssistantError::InvalidResponse("Missing content".to_string()))
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Value,
    ) -> Result<T, AssistantError> {
        let text = self.generate(prompt, Some(schema)).await?;
        decode_json(&text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn mnemonic(
        &self,
        glyph: &str,
        romanization: &str,
        language: AppLanguage,
    ) -> Result<String, AssistantError> {
        self.generate(&mnemonic_prompt(glyph, romanization, language), None)
            .await
    }

    async fn vocab_entry(
        &self,
        query: &str,
        language: AppLanguage,
    ) -> Result<Option<GeneratedVocab>, AssistantError> {
        let text = self
            .generate(&vocab_prompt(query, language), Some(vocab_schema(language)))
            .await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        decode_json(&text).map(Some)
    }

    async fn judge_answer(
        &self,
        answer: &str,
        target: &str,
        language: AppLanguage,
    ) -> Result<bool, AssistantError> {
        let verdict: JudgeVerdict = self
            .generate_json(&judge_prompt(answer, target, language), judge_schema())
            .await?;
        Ok(verdict.is_correct)
    }

    async fn analyze_word(
        &self,
        script: &str,
        language: AppLanguage,
    ) -> Result<WordAnalysis, AssistantError> {
        self.generate_json(&analysis_prompt(script, language), analysis_schema())
            .await
    }
}

#[derive(Debug, Deserialize)]
struct JudgeVerdict {
    #[serde(rename = "isCorrect")]
    is_correct: bool,
}

// ==================== Request / response ====================

pub(crate) fn request_body(prompt: &str, schema: Option<Value>) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }]
    });
    if let Some(schema) = schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }
    body
}

/// Text of the first part of the first candidate
pub(crate) fn candidate_text(json: &Value) -> Option<&str> {
    json["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())
        .and_then(|parts| parts.first())
        .and_then(|p| p["text"].as_str())
}

/// Decode a JSON payload, tolerating a surrounding markdown code fence
pub(crate) fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, AssistantError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    Ok(serde_json::from_str(inner.trim())?)
}

// ==================== Prompts ====================

fn mnemonic_prompt(glyph: &str, romanization: &str, language: AppLanguage) -> String {
    format!(
        "Create a short, memorable, and visual mnemonic to help a student memorize the \
         Hiragana character \"{glyph}\" (pronounced \"{romanization}\"). Focus on the shape. \
         The mnemonic must be in {lang}. Keep it under 20 words.",
        lang = language.native_name()
    )
}

fn vocab_prompt(query: &str, language: AppLanguage) -> String {
    format!(
        "The user wants to add a Japanese word to their study list.\n\
         The user input is: \"{query}\".\n\n\
         The input might be in English (e.g., \"cat\"), Romaji (e.g., \"neko\"), or another language.\n\n\
         1. Identify the intended Japanese word.\n\
         2. Return the word written primarily in Hiragana (use Kanji only if it is very common for beginners).\n\
         3. Return the Romaji reading.\n\
         4. Return the meaning in {lang}.\n\n\
         Return JSON.",
        lang = language.native_name()
    )
}

fn judge_prompt(answer: &str, target: &str, language: AppLanguage) -> String {
    format!(
        "Context: A language learning app.\n\
         Target Meaning: \"{target}\"\n\
         User Input: \"{answer}\"\n\
         Language Context: {lang}\n\n\
         Question: Is the User Input a valid correct translation or synonym for the Target Meaning?\n\
         Be generous with typos, but strict with meaning.\n\n\
         Return JSON: {{ \"isCorrect\": boolean }}",
        lang = language.native_name()
    )
}

fn analysis_prompt(script: &str, language: AppLanguage) -> String {
    format!(
        "Analyze the Japanese string \"{script}\" composed of Hiragana.\n\
         1. Determine if it forms a valid Japanese word or common phrase.\n\
         2. If valid, provide the reading (romaji).\n\
         3. Provide the meaning in {lang}.\n\
         4. Provide a breakdown/nuance in {lang}.\n\
         5. Provide 3 simple example sentences using this word. Each example must have the \
         Japanese sentence, Romaji reading, and translation in {lang}.\n\n\
         If it is NOT a valid word, suggest the closest real word. Return meaning and breakdown \
         explaining why it's invalid in {lang}.",
        lang = language.native_name()
    )
}

fn vocab_schema(language: AppLanguage) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "japanese": { "type": "STRING", "description": "The word in Hiragana" },
            "romaji": { "type": "STRING" },
            "meaning": {
                "type": "STRING",
                "description": format!("Meaning in {}", language.native_name())
            }
        },
        "required": ["japanese", "romaji", "meaning"]
    })
}

fn judge_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "isCorrect": { "type": "BOOLEAN" } },
        "required": ["isCorrect"]
    })
}

fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isValid": { "type": "BOOLEAN" },
            "reading": { "type": "STRING" },
            "meaning": { "type": "STRING" },
            "breakdown": { "type": "STRING" },
            "examples": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "japanese": { "type": "STRING" },
                        "romaji": { "type": "STRING" },
                        "translation": { "type": "STRING" }
                    }
                }
            }
        },
        "required": ["isValid", "reading", "meaning", "breakdown", "examples"]
    })
}
