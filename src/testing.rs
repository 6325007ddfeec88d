//! Test utilities: in-memory and on-disk stores, and a scripted language
//! model that counts how often each operation was invoked.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use crate::assistant::{Assistant, AssistantError, GeneratedVocab, LanguageModel, WordAnalysis};
use crate::domain::AppLanguage;
use crate::state::AppState;
use crate::store::{MemoryStore, SqliteStore, StoreError};

/// On-disk SQLite store in a temporary directory, removed on drop
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub store: Arc<SqliteStore>,
}

impl TestEnv {
    pub fn new() -> Result<Self, StoreError> {
        let temp = TempDir::new().map_err(|e| {
            StoreError::Sqlite(rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        })?;
        let store = Arc::new(SqliteStore::open(&temp.path().join("kana.db"))?);
        Ok(Self { temp, store })
    }

    /// Reopen the same database file, as after a restart
    pub fn reopen(&self) -> Result<Arc<SqliteStore>, StoreError> {
        Ok(Arc::new(SqliteStore::open(&self.temp.path().join("kana.db"))?))
    }
}

/// App state over an in-memory store
pub fn memory_state(assistant: Assistant) -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), assistant)
}

/// Language model returning canned results
#[derive(Default)]
pub struct ScriptedModel {
    mnemonic: Option<String>,
    vocab: Option<GeneratedVocab>,
    verdict: bool,
    analysis: Option<WordAnalysis>,
    fail: bool,
    mnemonic_calls: AtomicUsize,
    vocab_calls: AtomicUsize,
    judge_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails with an API error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_mnemonic(mut self, text: &str) -> Self {
        self.mnemonic = Some(text.to_string());
        self
    }

    pub fn with_vocab(mut self, vocab: GeneratedVocab) -> Self {
        self.vocab = Some(vocab);
        self
    }

    pub fn with_verdict(mut self, verdict: bool) -> Self {
        self.verdict = verdict;
        self
    }

    pub fn with_analysis(mut self, analysis: WordAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn mnemonic_calls(&self) -> usize {
        self.mnemonic_calls.load(Ordering::SeqCst)
    }

    pub fn vocab_calls(&self) -> usize {
        self.vocab_calls.load(Ordering::SeqCst)
    }

    pub fn judge_calls(&self) -> usize {
        self.judge_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    fn check(&self, counter: &AtomicUsize) -> Result<(), AssistantError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AssistantError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn mnemonic(
        &self,
        glyph: &str,
        _romanization: &str,
        _language: AppLanguage,
    ) -> Result<String, AssistantError> {
        self.check(&self.mnemonic_calls)?;
        Ok(self
            .mnemonic
            .clone()
            .unwrap_or_else(|| format!("Picture {}", glyph)))
    }

    async fn vocab_entry(
        &self,
        _query: &str,
        _language: AppLanguage,
    ) -> Result<Option<GeneratedVocab>, AssistantError> {
        self.check(&self.vocab_calls)?;
        Ok(self.vocab.clone())
    }

    async fn judge_answer(
        &self,
        _answer: &str,
        _target: &str,
        _language: AppLanguage,
    ) -> Result<bool, AssistantError> {
        self.check(&self.judge_calls)?;
        Ok(self.verdict)
    }

    async fn analyze_word(
        &self,
        _script: &str,
        _language: AppLanguage,
    ) -> Result<WordAnalysis, AssistantError> {
        self.check(&self.analyze_calls)?;
        self.analysis
            .clone()
            .ok_or_else(|| AssistantError::InvalidResponse("no scripted analysis".to_string()))
    }
}
