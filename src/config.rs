//! Application configuration constants and runtime settings.
//!
//! Gameplay values are compile-time constants. Deployment settings are
//! loaded with priority: config.toml > .env / environment > default.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Quiz Configuration ====================

/// Choices shown per quiz question (target plus distractors)
pub const CHOICE_COUNT: usize = 4;

/// Points added for a correct quiz answer
pub const POINTS_PER_CORRECT: u32 = 10;

/// Feedback delay before the next question after a correct answer
pub const CORRECT_ADVANCE_MS: u64 = 1000;

/// Feedback delay before the next question after a wrong answer
pub const WRONG_ADVANCE_MS: u64 = 1500;

// ==================== Practice Configuration ====================

/// Delay before a correctly answered flashcard flips
pub const FLIP_DELAY_MS: u64 = 800;

/// Maximum glyphs in the word builder
pub const MAX_WORD_LENGTH: usize = 8;

// ==================== Assistant Configuration ====================

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Request timeout for language-model calls
pub const ASSISTANT_TIMEOUT_SECS: u64 = 30;

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Session Configuration ====================

/// Learner session expiration time in hours of inactivity
pub const SESSION_EXPIRY_HOURS: i64 = 12;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Cookie carrying the learner session id
pub const SESSION_COOKIE: &str = "kana_session";

// ==================== Runtime settings ====================

/// config.toml structure
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
    assistant: Option<AssistantConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantConfig {
    api_key: Option<String>,
    model: Option<String>,
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub api_key: Option<String>,
    pub model: String,
}

impl AppConfig {
    /// Load from ./config.toml and the environment (after reading .env)
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let contents = std::fs::read_to_string("config.toml").ok();
        Self::resolve(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Merge config.toml contents with environment lookups
    pub fn resolve(toml_contents: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = match toml_contents.map(toml::from_str::<FileConfig>) {
            Some(Ok(file)) => file,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid config.toml: {}", e);
                FileConfig::default()
            }
            None => FileConfig::default(),
        };
        let database = file.database.unwrap_or_default();
        let server = file.server.unwrap_or_default();
        let assistant = file.assistant.unwrap_or_default();

        let database_path = if let Some(path) = database.path {
            tracing::info!("Using database from config.toml: {}", path);
            PathBuf::from(path)
        } else if let Some(path) = env("DATABASE_PATH") {
            tracing::info!("Using database from DATABASE_PATH env: {}", path);
            PathBuf::from(path)
        } else {
            let default = PathBuf::from(crate::paths::db_path());
            tracing::info!("Using default database path: {}", default.display());
            default
        };

        let port = server
            .port
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        let api_key = assistant
            .api_key
            .or_else(|| env("GEMINI_API_KEY"))
            .or_else(|| env("API_KEY"))
            .filter(|key| !key.trim().is_empty());

        let model = assistant
            .model
            .or_else(|| env("GEMINI_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            database_path,
            port,
            api_key,
            model,
        }
    }

    /// Full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", SERVER_ADDR, self.port)
    }
}
