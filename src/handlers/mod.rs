pub mod builder;
pub mod chart;
pub mod language;
pub mod practice;
pub mod quiz;
pub mod vocabulary;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tower_http::services::ServeDir;

use crate::config;
use crate::content::all_topics;
use crate::domain::AppLanguage;
use crate::filters;
use crate::paths;
use crate::session::{generate_session_id, SessionStore};
use crate::state::AppState;

/// Language selector entry in the navbar
pub struct LanguageOption {
  pub code: &'static str,
  pub name: &'static str,
  pub selected: bool,
}

/// Shared navbar data for full-page templates
pub struct NavContext {
  pub active: &'static str,
  pub languages: Vec<LanguageOption>,
  pub assistant_online: bool,
}

impl NavContext {
  pub fn new(state: &AppState, language: AppLanguage, active: &'static str) -> Self {
    Self {
      active,
      languages: AppLanguage::ALL
        .iter()
        .map(|lang| LanguageOption {
          code: lang.code(),
          name: lang.native_name(),
          selected: *lang == language,
        })
        .collect(),
      assistant_online: state.assistant.is_online(),
    }
  }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub nav: NavContext,
  pub learned_count: usize,
  pub kana_total: usize,
  pub chart_percent: u32,
  pub best_score: u32,
  pub topic_count: usize,
  pub mastered_count: usize,
  pub card_count: usize,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
  pub message: String,
}

/// Small HTML error fragment for htmx targets
pub fn error_fragment(message: impl Into<String>) -> Html<String> {
  let template = ErrorTemplate {
    message: message.into(),
  };
  Html(template.render().unwrap_or_default())
}

pub fn not_found(message: impl Into<String>) -> Response {
  (StatusCode::NOT_FOUND, error_fragment(message)).into_response()
}

/// Session id from the learner cookie. A missing cookie, or one naming no
/// live session, gets a fresh server-issued id and a new cookie.
pub fn learner_session(sessions: &SessionStore, jar: CookieJar) -> (CookieJar, String) {
  if let Some(cookie) = jar.get(config::SESSION_COOKIE) {
    if sessions.contains(cookie.value()) {
      let id = cookie.value().to_string();
      return (jar, id);
    }
    tracing::debug!("Learner cookie names no live session, issuing a new one");
  }
  let id = generate_session_id();
  sessions.with_session(&id, |_| ());
  let cookie = Cookie::build((config::SESSION_COOKIE, id.clone()))
    .path("/")
    .http_only(true)
    .build();
  (jar.add(cookie), id)
}

/// Whole-number percentage, 0 when `total` is 0
pub fn percent(part: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((part as f64 / total as f64) * 100.0).round() as u32
}

pub async fn index(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let language = state.sessions.with_session(&session_id, |s| s.language);

  let learned_count = state
    .progress
    .learned_characters()
    .iter()
    .filter(|glyph| state.catalog.find_glyph(glyph).is_some())
    .count();
  let kana_total = state.catalog.len();

  let topics = all_topics(state.progress.custom_words());
  let card_ids: Vec<String> = topics.iter().flat_map(|t| t.card_ids()).collect();

  let template = IndexTemplate {
    nav: NavContext::new(&state, language, "home"),
    learned_count,
    kana_total,
    chart_percent: percent(learned_count, kana_total),
    best_score: state.progress.high_score(),
    topic_count: topics.len(),
    mastered_count: state.progress.mastered_count(&card_ids),
    card_count: card_ids.len(),
  };

  (jar, Html(template.render().unwrap_or_default()))
}

/// Full application router
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/chart", get(chart::chart_page))
    .route("/chart/{glyph}", get(chart::glyph_detail))
    .route("/chart/{glyph}/toggle", post(chart::toggle_learned))
    .route("/quiz", get(quiz::quiz_page))
    .route("/quiz/answer", post(quiz::submit_answer))
    .route("/quiz/next", get(quiz::next_question))
    .route("/quiz/limit", post(quiz::set_row_limit))
    .route("/vocab", get(vocabulary::topic_list))
    .route("/vocab/{topic}", get(vocabulary::topic_detail))
    .route("/vocab/{topic}/reset", post(vocabulary::reset_topic))
    .route("/vocab/{topic}/practice", get(practice::practice_start))
    .route("/words/add", post(vocabulary::add_word))
    .route("/words/delete", post(vocabulary::delete_word))
    .route("/practice/check", post(practice::check))
    .route("/practice/edit", post(practice::edit))
    .route("/practice/flip", post(practice::flip))
    .route("/practice/skip", post(practice::skip))
    .route("/practice/grade", post(practice::grade))
    .route("/builder", get(builder::builder_page))
    .route("/builder/add", post(builder::add_glyph))
    .route("/builder/remove", post(builder::remove_glyph))
    .route("/builder/clear", post(builder::clear))
    .route("/builder/analyze", post(builder::analyze))
    .route("/language", post(language::select_language))
    .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
    .with_state(state)
}
