//! Application state shared by all handlers.

use std::sync::Arc;

use crate::assistant::Assistant;
use crate::content::KanaCatalog;
use crate::session::SessionStore;
use crate::store::{KvStore, Progress};

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Persisted learner progress
    pub progress: Progress,

    /// Language-model assistant (may be offline)
    pub assistant: Assistant,

    /// Per-browser quiz, practice and builder state
    pub sessions: SessionStore,

    pub catalog: Arc<KanaCatalog>,
}

impl AppState {
    pub fn new(kv: Arc<dyn KvStore>, assistant: Assistant) -> Self {
        Self {
            progress: Progress::new(kv),
            assistant,
            sessions: SessionStore::new(),
            catalog: KanaCatalog::hiragana(),
        }
    }
}
