//! Multiple-choice quiz pages and htmx partials.

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Form;
use axum_extra::extract::CookieJar;
use rand::rngs::StdRng;
use serde::Deserialize;

use super::{learner_session, NavContext};
use crate::config;
use crate::filters;
use crate::practice::{QuizPhase, QuizSession};
use crate::state::AppState;

pub struct ChoiceView {
  pub label: String,
  /// "idle", "correct", "wrong" or "dim"
  pub state: &'static str,
}

/// Everything the quiz board partial shows
pub struct QuizBoard {
  pub score: u32,
  pub streak: u32,
  pub best_score: u32,
  pub glyph: Option<&'static str>,
  pub choices: Vec<ChoiceView>,
  pub graded: bool,
  pub correct: bool,
  pub correct_answer: String,
  pub new_best: bool,
  pub advance_ms: u64,
  pub error: Option<String>,
}

impl QuizBoard {
  fn build(quiz: &QuizSession<StdRng>, selected: Option<&str>) -> Self {
    let (graded, correct) = match quiz.phase() {
      QuizPhase::AwaitingAnswer => (false, false),
      QuizPhase::Graded { correct } => (true, correct),
    };
    let question = quiz.question();
    let correct_answer = question.map(|q| q.answer().to_string()).unwrap_or_default();

    let choices = question
      .map(|q| {
        q.choices
          .iter()
          .map(|choice| {
            let state = if !graded {
              "idle"
            } else if *choice == correct_answer {
              "correct"
            } else if Some(choice.as_str()) == selected {
              "wrong"
            } else {
              "dim"
            };
            ChoiceView {
              label: choice.clone(),
              state,
            }
          })
          .collect()
      })
      .unwrap_or_default();

    let advance_ms = if correct {
      config::CORRECT_ADVANCE_MS
    } else {
      config::WRONG_ADVANCE_MS
    };

    Self {
      score: quiz.score(),
      streak: quiz.streak(),
      best_score: quiz.best_score(),
      glyph: question.map(|q| q.target.glyph),
      choices,
      graded,
      correct,
      correct_answer,
      new_best: false,
      advance_ms,
      error: None,
    }
  }
}

pub struct RowOption {
  pub index: usize,
  pub label: String,
  pub selected: bool,
}

#[derive(Template)]
#[template(path = "quiz.html")]
pub struct QuizTemplate {
  pub nav: NavContext,
  pub board: QuizBoard,
  pub rows: Vec<RowOption>,
}

#[derive(Template)]
#[template(path = "quiz_board.html")]
pub struct QuizBoardTemplate {
  pub board: QuizBoard,
}

fn render_board(board: QuizBoard) -> Html<String> {
  let template = QuizBoardTemplate { board };
  Html(template.render().unwrap_or_default())
}

/// GET /quiz
pub async fn quiz_page(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let best = state.progress.high_score();
  let catalog = state.catalog.clone();

  let (language, board, row_limit) = state.sessions.with_session(&session_id, |s| {
    let language = s.language;
    let quiz = s.quiz_mut(catalog, best);
    (language, QuizBoard::build(quiz, None), quiz.row_limit())
  });

  let rows = state
    .catalog
    .rows()
    .iter()
    .enumerate()
    .map(|(index, row)| RowOption {
      index,
      label: format!("{}. {}", index + 1, row),
      selected: index == row_limit,
    })
    .collect();

  let template = QuizTemplate {
    nav: NavContext::new(&state, language, "quiz"),
    board,
    rows,
  };

  (jar, Html(template.render().unwrap_or_default()))
}

#[derive(Deserialize)]
pub struct AnswerForm {
  pub choice: String,
}

/// POST /quiz/answer
pub async fn submit_answer(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<AnswerForm>,
) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let best = state.progress.high_score();
  let catalog = state.catalog.clone();
  let progress = state.progress.clone();

  let board = state.sessions.with_session(&session_id, |s| {
    let quiz = s.quiz_mut(catalog, best);
    let outcome = quiz.submit_answer(&form.choice, &progress);
    let mut board = QuizBoard::build(quiz, Some(&form.choice));
    if let Some(outcome) = outcome {
      board.new_best = outcome.new_best.is_some();
      board.advance_ms = outcome.advance_after.as_millis() as u64;
    }
    board
  });

  (jar, render_board(board))
}

/// GET /quiz/next - fired by the feedback timer
pub async fn next_question(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let best = state.progress.high_score();
  let catalog = state.catalog.clone();

  let board = state.sessions.with_session(&session_id, |s| {
    let quiz = s.quiz_mut(catalog, best);
    // Superseded timers find the quiz already advanced
    quiz.advance();
    QuizBoard::build(quiz, None)
  });

  (jar, render_board(board))
}

#[derive(Deserialize)]
pub struct LimitForm {
  pub limit: usize,
}

/// POST /quiz/limit
pub async fn set_row_limit(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<LimitForm>,
) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let best = state.progress.high_score();
  let catalog = state.catalog.clone();

  let board = state.sessions.with_session(&session_id, |s| {
    let quiz = s.quiz_mut(catalog, best);
    let result = quiz.set_row_limit(form.limit);
    let mut board = QuizBoard::build(quiz, None);
    if let Err(e) = result {
      tracing::warn!("Rejected quiz row limit {}: {}", form.limit, e);
      board.error = Some(e.to_string());
    }
    board
  });

  (jar, render_board(board))
}
