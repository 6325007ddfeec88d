//! Prompt language selection.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::learner_session;
use crate::domain::AppLanguage;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LanguageForm {
  pub language: String,
  /// Page to return to
  #[serde(default)]
  pub next: String,
}

/// Only local absolute paths are followed. Browsers read `\` as `/`, so
/// any backslash is refused.
fn return_path(next: &str) -> &str {
  if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
    next
  } else {
    "/"
  }
}

/// POST /language
pub async fn select_language(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<LanguageForm>,
) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);

  match AppLanguage::from_code(&form.language) {
    Some(language) => {
      state.sessions.with_session(&session_id, |s| s.language = language);
      tracing::debug!("Session language set to {}", language.code());
    }
    None => tracing::warn!("Ignoring unknown language code {:?}", form.language),
  }

  (jar, Redirect::to(return_path(&form.next)))
}
