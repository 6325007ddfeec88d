//! Word builder page and htmx partials.

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::chart::{chart_sections, ChartSection};
use super::{learner_session, NavContext};
use crate::assistant::WordAnalysis;
use crate::config;
use crate::filters;
use crate::practice::{BuilderError, WordBuilder};
use crate::state::AppState;

pub struct BuilderGlyph {
  pub index: usize,
  pub glyph: String,
}

pub struct BuilderBoard {
  pub glyphs: Vec<BuilderGlyph>,
  pub word: String,
  pub count: usize,
  pub max: usize,
  pub full: bool,
  pub analysis: Option<WordAnalysis>,
  pub error: Option<String>,
}

impl BuilderBoard {
  fn build(builder: &WordBuilder, error: Option<String>) -> Self {
    Self {
      glyphs: builder
        .glyphs()
        .iter()
        .enumerate()
        .map(|(index, glyph)| BuilderGlyph {
          index,
          glyph: glyph.clone(),
        })
        .collect(),
      word: builder.word(),
      count: builder.len(),
      max: config::MAX_WORD_LENGTH,
      full: builder.is_full(),
      analysis: builder.analysis().cloned(),
      error,
    }
  }
}

#[derive(Template)]
#[template(path = "builder.html")]
pub struct BuilderTemplate {
  pub nav: NavContext,
  pub sections: Vec<ChartSection>,
  pub board: BuilderBoard,
}

#[derive(Template)]
#[template(path = "builder_board.html")]
pub struct BuilderBoardTemplate {
  pub board: BuilderBoard,
}

fn render_board(board: BuilderBoard) -> Html<String> {
  let template = BuilderBoardTemplate { board };
  Html(template.render().unwrap_or_default())
}

/// Apply an edit to the session's builder and render the board
fn edit(
  state: &AppState,
  session_id: &str,
  action: impl FnOnce(&mut WordBuilder) -> Result<(), BuilderError>,
) -> Html<String> {
  let board = state.sessions.with_session(session_id, |s| {
    let error = action(&mut s.builder).err().map(|e| e.to_string());
    BuilderBoard::build(&s.builder, error)
  });
  render_board(board)
}

/// GET /builder
pub async fn builder_page(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let (language, board) = state
    .sessions
    .with_session(&session_id, |s| (s.language, BuilderBoard::build(&s.builder, None)));

  let template = BuilderTemplate {
    nav: NavContext::new(&state, language, "builder"),
    sections: chart_sections(&state.catalog, &[]),
    board,
  };

  (jar, Html(template.render().unwrap_or_default()))
}

#[derive(Deserialize)]
pub struct GlyphForm {
  pub glyph: String,
}

/// POST /builder/add
pub async fn add_glyph(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<GlyphForm>,
) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let catalog = state.catalog.clone();
  let board = edit(&state, &session_id, |builder| builder.push(&form.glyph, &catalog));
  (jar, board)
}

#[derive(Deserialize)]
pub struct IndexForm {
  pub index: usize,
}

/// POST /builder/remove
pub async fn remove_glyph(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<IndexForm>,
) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let board = edit(&state, &session_id, |builder| builder.remove(form.index).map(|_| ()));
  (jar, board)
}

/// POST /builder/clear
pub async fn clear(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let board = edit(&state, &session_id, |builder| {
    builder.clear();
    Ok(())
  });
  (jar, board)
}

/// POST /builder/analyze - ask the assistant about the current word
pub async fn analyze(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);

  let request = state
    .sessions
    .with_session(&session_id, |s| (s.language, s.builder.analysis_request()));

  let board = match request {
    (language, Ok(word)) => {
      let analysis = state.assistant.analyze_word(&word, language).await;
      state.sessions.with_session(&session_id, |s| {
        if !s.builder.set_analysis(&word, analysis) {
          tracing::debug!("Dropping analysis for {}, word changed", word);
        }
        BuilderBoard::build(&s.builder, None)
      })
    }
    (_, Err(e)) => state
      .sessions
      .with_session(&session_id, |s| BuilderBoard::build(&s.builder, Some(e.to_string()))),
  };

  (jar, render_board(board))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assistant::Assistant;
  use crate::handlers::test_support::*;
  use crate::testing::{memory_state, ScriptedModel};
  use std::sync::Arc;

  fn word(state: &AppState) -> String {
    state.sessions.with_session(TEST_SESSION, |s| s.builder.word())
  }

  #[tokio::test]
  async fn test_builder_page_renders_keyboard() {
    let (_, server) = offline();
    let response = server.get("/builder").await;
    response.assert_status_ok();
    assert!(response.text().contains("builder-board"));
  }

  #[tokio::test]
  async fn test_add_remove_clear() {
    let (state, server) = offline();
    for glyph in ["ね", "こ", "ぎ"] {
      server
        .post("/builder/add")
        .add_cookie(session_cookie())
        .form(&form(&[("glyph", glyph)]))
        .await
        .assert_status_ok();
    }
    assert_eq!(word(&state), "ねこぎ");

    server
      .post("/builder/remove")
      .add_cookie(session_cookie())
      .form(&form(&[("index", "2")]))
      .await
      .assert_status_ok();
    assert_eq!(word(&state), "ねこ");

    server.post("/builder/clear").add_cookie(session_cookie()).await.assert_status_ok();
    assert_eq!(word(&state), "");
  }

  #[tokio::test]
  async fn test_add_beyond_limit_reports_error() {
    let (state, server) = offline();
    for _ in 0..config::MAX_WORD_LENGTH {
      server
        .post("/builder/add")
        .add_cookie(session_cookie())
        .form(&form(&[("glyph", "あ")]))
        .await;
    }
    let response = server
      .post("/builder/add")
      .add_cookie(session_cookie())
      .form(&form(&[("glyph", "い")]))
      .await;
    assert!(response.text().contains("limited to 8"));
    assert_eq!(word(&state).chars().count(), config::MAX_WORD_LENGTH);
  }

  #[tokio::test]
  async fn test_analyze_empty_word_is_refused() {
    let model = Arc::new(ScriptedModel::new());
    let state = memory_state(Assistant::new(model.clone()));
    let server = server(state);

    let response = server.post("/builder/analyze").add_cookie(session_cookie()).await;
    assert!(response.text().contains("Add some characters first"));
    assert_eq!(model.analyze_calls(), 0);
  }

  #[tokio::test]
  async fn test_analyze_offline_shows_unavailable() {
    let (state, server) = offline();
    server
      .post("/builder/add")
      .add_cookie(session_cookie())
      .form(&form(&[("glyph", "ね")]))
      .await;
    let response = server.post("/builder/analyze").add_cookie(session_cookie()).await;
    assert!(response.text().contains("Service unavailable"));

    let has_analysis = state.sessions.with_session(TEST_SESSION, |s| s.builder.analysis().is_some());
    assert!(has_analysis);
  }

  #[tokio::test]
  async fn test_analyze_with_model() {
    let model = ScriptedModel::new().with_analysis(WordAnalysis {
      is_valid: true,
      reading: "neko".into(),
      meaning: "cat".into(),
      breakdown: "ne + ko".into(),
      examples: Vec::new(),
    });
    let state = memory_state(Assistant::new(Arc::new(model)));
    let server = server(state);
    for glyph in ["ね", "こ"] {
      server
        .post("/builder/add")
        .add_cookie(session_cookie())
        .form(&form(&[("glyph", glyph)]))
        .await;
    }
    let response = server.post("/builder/analyze").add_cookie(session_cookie()).await;
    let body = response.text();
    assert!(body.contains("neko"));
    assert!(body.contains("ne + ko"));
  }
}
