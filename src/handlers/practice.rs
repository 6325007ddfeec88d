//! Flashcard practice pass for one topic.
//!
//! The review queue lives in the learner session. Remote answer checks run
//! between `begin_check` and `resolve_check` with the session released, so a
//! slow judge never blocks other requests from the same browser.

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::vocabulary::find_topic;
use super::{error_fragment, learner_session, not_found, NavContext};
use crate::config;
use crate::filters;
use crate::practice::{CheckStep, ReviewError};
use crate::session::ActiveReview;
use crate::state::AppState;

/// Everything the practice card partial shows
pub struct PracticeView {
  pub topic_id: String,
  pub finished: bool,
  /// 1-based position for display
  pub number: usize,
  pub total: usize,
  pub card_id: String,
  pub script: String,
  pub romanization: String,
  pub meaning: String,
  pub input: &'static str,
  pub flipped: bool,
  pub answer: String,
  pub mastered: u32,
  pub retry: u32,
  pub flip_delay_ms: u64,
  pub message: Option<String>,
}

impl PracticeView {
  fn build(review: &ActiveReview, answer: &str, message: Option<String>) -> Self {
    let queue = &review.queue;
    let tally = queue.tally();
    let card = queue.current();
    Self {
      topic_id: review.topic_id.clone(),
      finished: queue.is_finished(),
      number: (queue.position() + 1).min(queue.len()),
      total: queue.len(),
      card_id: card.map(|c| c.id.clone()).unwrap_or_default(),
      script: card.map(|c| c.script.clone()).unwrap_or_default(),
      romanization: card.map(|c| c.romanization.clone()).unwrap_or_default(),
      meaning: card.map(|c| c.meaning.clone()).unwrap_or_default(),
      input: queue.input().as_str(),
      flipped: queue.is_flipped(),
      answer: answer.to_string(),
      mastered: tally.mastered,
      retry: tally.retry,
      flip_delay_ms: config::FLIP_DELAY_MS,
      message,
    }
  }
}

#[derive(Template)]
#[template(path = "practice.html")]
pub struct PracticeTemplate {
  pub nav: NavContext,
  pub title: &'static str,
  pub view: PracticeView,
}

#[derive(Template)]
#[template(path = "practice_card.html")]
pub struct PracticeCardTemplate {
  pub view: PracticeView,
}

fn render_card(view: PracticeView) -> Html<String> {
  let template = PracticeCardTemplate { view };
  Html(template.render().unwrap_or_default())
}

/// Message for rejected actions; stale and duplicate actions render silently
fn rejection_message(err: &ReviewError) -> Option<String> {
  match err {
    ReviewError::EmptyAnswer | ReviewError::Store(_) => Some(err.to_string()),
    ReviewError::Finished
    | ReviewError::StaleCard { .. }
    | ReviewError::CheckPending
    | ReviewError::InputLocked => {
      tracing::debug!("Ignoring practice action: {}", err);
      None
    }
  }
}

fn no_practice() -> Response {
  error_fragment("No practice in progress. Pick a topic to start.").into_response()
}

/// GET /vocab/{topic}/practice - start a fresh shuffled pass
pub async fn practice_start(
  State(state): State<AppState>,
  jar: CookieJar,
  Path(topic_id): Path<String>,
) -> Response {
  let Some(topic) = find_topic(&state, &topic_id) else {
    return not_found(format!("Unknown topic {}", topic_id));
  };
  let (jar, session_id) = learner_session(&state.sessions, jar);

  let (language, view) = state.sessions.with_session(&session_id, |s| {
    let review = s.start_review(&topic.id, topic.cards.clone());
    let view = PracticeView::build(review, "", None);
    (s.language, view)
  });
  tracing::debug!("Started practice for {} ({} cards)", topic.id, view.total);

  let template = PracticeTemplate {
    nav: NavContext::new(&state, language, "vocab"),
    title: topic.title(language),
    view,
  };

  (jar, Html(template.render().unwrap_or_default())).into_response()
}

#[derive(Deserialize)]
pub struct CardForm {
  pub card_id: String,
  #[serde(default)]
  pub answer: String,
}

/// POST /practice/check
pub async fn check(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<CardForm>,
) -> Response {
  let (jar, session_id) = learner_session(&state.sessions, jar);

  let begun = state.sessions.with_session(&session_id, |s| {
    let language = s.language;
    let review = s.review.as_mut()?;
    let step = review.queue.begin_check(&form.card_id, &form.answer);
    Some((language, step))
  });
  let Some((language, step)) = begun else {
    return no_practice();
  };

  let message = match step {
    Ok(CheckStep::Matched) => None,
    Ok(CheckStep::NeedsJudge { answer, target }) => {
      let verdict = state.assistant.judge_answer(&answer, &target, language).await;
      let applied = state.sessions.with_session(&session_id, |s| {
        s.review
          .as_mut()
          .and_then(|review| review.queue.resolve_check(&form.card_id, verdict))
      });
      tracing::debug!("Judge verdict for {}: {} (applied: {:?})", form.card_id, verdict, applied);
      None
    }
    Err(e) => rejection_message(&e),
  };

  let view = state.sessions.with_session(&session_id, |s| {
    s.review
      .as_ref()
      .map(|review| PracticeView::build(review, &form.answer, message))
  });
  match view {
    Some(view) => (jar, render_card(view)).into_response(),
    None => no_practice(),
  }
}

/// Apply a synchronous queue action and render the card
fn apply(
  state: &AppState,
  session_id: &str,
  form: &CardForm,
  action: impl FnOnce(&mut ActiveReview) -> Result<(), ReviewError>,
) -> Response {
  let view = state.sessions.with_session(session_id, |s| {
    let review = s.review.as_mut()?;
    let message = match action(review) {
      Ok(()) => None,
      Err(e) => rejection_message(&e),
    };
    Some(PracticeView::build(review, &form.answer, message))
  });
  match view {
    Some(view) => render_card(view).into_response(),
    None => no_practice(),
  }
}

/// POST /practice/edit - the learner changed the answer text
pub async fn edit(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<CardForm>,
) -> Response {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let response = apply(&state, &session_id, &form, |review| {
    review.queue.current_checked(&form.card_id)?;
    review.queue.edit_input().map(|_| ())
  });
  (jar, response).into_response()
}

/// POST /practice/flip - delayed flip after a correct answer
pub async fn flip(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<CardForm>,
) -> Response {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let response = apply(&state, &session_id, &form, |review| {
    review.queue.current_checked(&form.card_id)?;
    review.queue.flip();
    Ok(())
  });
  (jar, response).into_response()
}

/// POST /practice/skip - reveal without grading
pub async fn skip(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<CardForm>,
) -> Response {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let response = apply(&state, &session_id, &form, |review| {
    review.queue.current_checked(&form.card_id)?;
    review.queue.skip()
  });
  (jar, response).into_response()
}

#[derive(Deserialize)]
pub struct GradeForm {
  pub card_id: String,
  /// "easy" or "hard"
  pub grade: String,
}

/// POST /practice/grade
pub async fn grade(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<GradeForm>,
) -> Response {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let easy = form.grade == "easy";
  let progress = state.progress.clone();
  let card_form = CardForm {
    card_id: form.card_id.clone(),
    answer: String::new(),
  };

  let response = apply(&state, &session_id, &card_form, |review| {
    let outcome = review.queue.grade(&form.card_id, easy, &progress)?;
    tracing::debug!(
      "Graded {} (mastered: {}, finished: {})",
      outcome.card_id,
      outcome.mastered,
      outcome.finished
    );
    Ok(())
  });
  (jar, response).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assistant::Assistant;
  use crate::handlers::test_support::*;
  use crate::store::MasteryStore;
  use crate::testing::{memory_state, ScriptedModel};
  use std::sync::Arc;

  fn current_card(state: &AppState) -> Option<(String, String)> {
    state.sessions.with_session(TEST_SESSION, |s| {
      let card = s.review.as_ref()?.queue.current()?;
      Some((card.id.clone(), card.meaning.clone()))
    })
  }

  fn tally(state: &AppState) -> (u32, u32) {
    state.sessions.with_session(TEST_SESSION, |s| {
      let t = s.review.as_ref().unwrap().queue.tally();
      (t.mastered, t.retry)
    })
  }

  #[tokio::test]
  async fn test_practice_page_starts_queue() {
    let (state, server) = offline();
    let response = server.get("/vocab/animals/practice").add_cookie(session_cookie()).await;
    response.assert_status_ok();
    assert!(current_card(&state).is_some());
  }

  #[tokio::test]
  async fn test_card_front_shows_script_not_meaning() {
    let (state, server) = offline();
    let response = server.get("/vocab/animals/practice").add_cookie(session_cookie()).await;
    let body = response.text();
    let (id, script, meaning) = state.sessions.with_session(TEST_SESSION, |s| {
      let card = s.review.as_ref().unwrap().queue.current().unwrap();
      (card.id.clone(), card.script.clone(), card.meaning.clone())
    });

    assert!(body.contains(&format!("<div class=\"front\">{}</div>", script)));
    assert!(!body.contains(&format!("<div class=\"front\">{}</div>", meaning)));
    assert!(!body.contains(&format!("<span class=\"meaning\">{}</span>", meaning)));
    assert!(body.contains("What does this mean?"));

    // The meaning is revealed on the back once the card is turned
    let response = server
      .post("/practice/skip")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str())]))
      .await;
    assert!(response
      .text()
      .contains(&format!("<span class=\"meaning\">{}</span>", meaning)));
  }

  #[tokio::test]
  async fn test_empty_custom_topic_finishes_immediately() {
    let (_, server) = offline();
    let response = server.get("/vocab/custom/practice").add_cookie(session_cookie()).await;
    response.assert_status_ok();
    assert!(response.text().contains("Practice complete"));
  }

  #[tokio::test]
  async fn test_actions_without_practice() {
    let (_, server) = offline();
    let response = server
      .post("/practice/grade")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", "x"), ("grade", "easy")]))
      .await;
    response.assert_status_ok();
    assert!(response.text().contains("No practice in progress"));
  }

  #[tokio::test]
  async fn test_exact_answer_skips_judge_and_masters() {
    let model = Arc::new(ScriptedModel::new().with_verdict(false));
    let state = memory_state(Assistant::new(model.clone()));
    let server = server(state.clone());
    server.get("/vocab/animals/practice").add_cookie(session_cookie()).await;

    let (id, meaning) = current_card(&state).unwrap();
    let answer = meaning.to_uppercase();
    let response = server
      .post("/practice/check")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str()), ("answer", answer.as_str())]))
      .await;
    response.assert_status_ok();
    assert!(response.text().contains("load delay:800ms"));
    assert_eq!(model.judge_calls(), 0);

    server
      .post("/practice/grade")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str()), ("grade", "hard")]))
      .await
      .assert_status_ok();
    assert!(state.progress.get(&id));
    assert_eq!(tally(&state), (1, 0));
  }

  #[tokio::test]
  async fn test_judged_wrong_then_edit_and_skip() {
    let model = Arc::new(ScriptedModel::new().with_verdict(false));
    let state = memory_state(Assistant::new(model.clone()));
    let server = server(state.clone());
    server.get("/vocab/food/practice").add_cookie(session_cookie()).await;
    let (id, _) = current_card(&state).unwrap();

    let response = server
      .post("/practice/check")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str()), ("answer", "definitely not this")]))
      .await;
    assert!(response.text().contains("data-input=\"wrong\""));
    assert_eq!(model.judge_calls(), 1);

    let response = server
      .post("/practice/edit")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str())]))
      .await;
    assert!(response.text().contains("data-input=\"idle\""));

    server
      .post("/practice/skip")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str())]))
      .await
      .assert_status_ok();
    server
      .post("/practice/grade")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str()), ("grade", "hard")]))
      .await
      .assert_status_ok();
    assert!(!state.progress.get(&id));
    assert_eq!(tally(&state), (0, 1));
  }

  #[tokio::test]
  async fn test_stale_grade_is_ignored() {
    let (state, server) = offline();
    server.get("/vocab/numbers/practice").add_cookie(session_cookie()).await;
    let (id, _) = current_card(&state).unwrap();

    for _ in 0..2 {
      server
        .post("/practice/grade")
        .add_cookie(session_cookie())
        .form(&form(&[("card_id", id.as_str()), ("grade", "easy")]))
        .await
        .assert_status_ok();
    }
    // Second grade named the old card and did nothing
    assert_eq!(tally(&state), (1, 0));
  }

  #[tokio::test]
  async fn test_skip_naming_other_card_is_ignored() {
    let (state, server) = offline();
    server.get("/vocab/numbers/practice").add_cookie(session_cookie()).await;

    server
      .post("/practice/skip")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", "not-the-current-card")]))
      .await
      .assert_status_ok();
    let flipped = state
      .sessions
      .with_session(TEST_SESSION, |s| s.review.as_ref().unwrap().queue.is_flipped());
    assert!(!flipped);
  }

  #[tokio::test]
  async fn test_blank_answer_is_reported() {
    let (state, server) = offline();
    server.get("/vocab/greetings/practice").add_cookie(session_cookie()).await;
    let (id, _) = current_card(&state).unwrap();

    let response = server
      .post("/practice/check")
      .add_cookie(session_cookie())
      .form(&form(&[("card_id", id.as_str()), ("answer", "  ")]))
      .await;
    assert!(response.text().contains("Answer is empty"));
  }
}
