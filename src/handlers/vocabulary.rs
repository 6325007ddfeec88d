//! Vocabulary topics, the custom word list, and mastery reset.

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::{learner_session, not_found, percent, NavContext};
use crate::content::{all_topics, CUSTOM_TOPIC_ID};
use crate::domain::{AppLanguage, VocabCard, VocabTopic};
use crate::filters;
use crate::state::AppState;
use crate::store::{LogOnError, MasteryStore};
use crate::validation::is_blank;

pub struct TopicSummary {
  pub id: String,
  pub title: &'static str,
  pub card_count: usize,
  pub percent: u32,
  pub is_custom: bool,
}

pub struct CardRow {
  pub id: String,
  pub script: String,
  pub romanization: String,
  pub meaning: String,
  pub mastered: bool,
}

#[derive(Template)]
#[template(path = "topics.html")]
pub struct TopicsTemplate {
  pub nav: NavContext,
  pub topics: Vec<TopicSummary>,
}

#[derive(Template)]
#[template(path = "topic.html")]
pub struct TopicTemplate {
  pub nav: NavContext,
  pub topic_id: String,
  pub title: &'static str,
  pub is_custom: bool,
  pub cards: Vec<CardRow>,
  pub mastered_count: usize,
  pub percent: u32,
  pub message: Option<String>,
}

/// Built-in topic or the custom topic, by id
pub fn find_topic(state: &AppState, topic_id: &str) -> Option<VocabTopic> {
  all_topics(state.progress.custom_words())
    .into_iter()
    .find(|t| t.id == topic_id)
}

fn topic_template(
  state: &AppState,
  topic: &VocabTopic,
  language: AppLanguage,
  message: Option<String>,
) -> TopicTemplate {
  let cards: Vec<CardRow> = topic
    .cards
    .iter()
    .map(|card| CardRow {
      id: card.id.clone(),
      script: card.script.clone(),
      romanization: card.romanization.clone(),
      meaning: card.meaning.clone(),
      mastered: state.progress.get(&card.id),
    })
    .collect();
  let mastered_count = cards.iter().filter(|c| c.mastered).count();

  TopicTemplate {
    nav: NavContext::new(state, language, "vocab"),
    topic_id: topic.id.clone(),
    title: topic.title(language),
    is_custom: topic.is_custom,
    percent: percent(mastered_count, cards.len()),
    mastered_count,
    cards,
    message,
  }
}

/// GET /vocab
pub async fn topic_list(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let language = state.sessions.with_session(&session_id, |s| s.language);

  let topics = all_topics(state.progress.custom_words())
    .into_iter()
    .map(|topic| {
      let mastered = state.progress.mastered_count(&topic.card_ids());
      TopicSummary {
        title: topic.title(language),
        card_count: topic.cards.len(),
        percent: percent(mastered, topic.cards.len()),
        is_custom: topic.is_custom,
        id: topic.id,
      }
    })
    .collect();

  let template = TopicsTemplate {
    nav: NavContext::new(&state, language, "vocab"),
    topics,
  };

  (jar, Html(template.render().unwrap_or_default()))
}

/// GET /vocab/{topic}
pub async fn topic_detail(
  State(state): State<AppState>,
  jar: CookieJar,
  Path(topic_id): Path<String>,
) -> Response {
  let Some(topic) = find_topic(&state, &topic_id) else {
    return not_found(format!("Unknown topic {}", topic_id));
  };
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let language = state.sessions.with_session(&session_id, |s| s.language);

  let template = topic_template(&state, &topic, language, None);
  (jar, Html(template.render().unwrap_or_default())).into_response()
}

/// POST /vocab/{topic}/reset - forget mastery for the topic's cards
pub async fn reset_topic(State(state): State<AppState>, Path(topic_id): Path<String>) -> Response {
  let Some(topic) = find_topic(&state, &topic_id) else {
    return not_found(format!("Unknown topic {}", topic_id));
  };

  state
    .progress
    .clear(&topic.card_ids())
    .log_warn("Failed to reset topic mastery");
  tracing::info!("Reset mastery for topic {}", topic.id);

  Redirect::to(&format!("/vocab/{}", topic.id)).into_response()
}

#[derive(Deserialize)]
pub struct AddWordForm {
  pub query: String,
}

/// Millisecond timestamp id, bumped past any id already in use
fn next_card_id(existing: &[VocabCard]) -> String {
  let mut id = chrono::Utc::now().timestamp_millis();
  while existing.iter().any(|card| card.id == id.to_string()) {
    id += 1;
  }
  id.to_string()
}

/// POST /words/add - resolve a free-form query with the assistant and append
/// it to the custom topic
pub async fn add_word(
  State(state): State<AppState>,
  jar: CookieJar,
  Form(form): Form<AddWordForm>,
) -> Response {
  let custom_path = format!("/vocab/{}", CUSTOM_TOPIC_ID);
  if is_blank(&form.query) {
    return Redirect::to(&custom_path).into_response();
  }

  let (jar, session_id) = learner_session(&state.sessions, jar);
  let language = state.sessions.with_session(&session_id, |s| s.language);
  let query = form.query.trim();

  let message = match state.assistant.vocab_entry(query, language).await {
    Some(entry) => {
      let added = state
        .progress
        .add_custom_word_with(|existing| entry.into_card(next_card_id(existing)));
      match added {
        Ok(card) => {
          tracing::info!("Added custom word {} ({}) as {}", card.script, card.meaning, card.id);
          return (jar, Redirect::to(&custom_path)).into_response();
        }
        Err(e) => {
          tracing::warn!("Failed to save custom word: {}", e);
          format!("Could not save \"{}\". Please try again.", query)
        }
      }
    }
    None => format!("Could not add \"{}\". Try another spelling.", query),
  };

  let topic = find_topic(&state, CUSTOM_TOPIC_ID)
    .unwrap_or_else(|| crate::content::custom_topic(Vec::new()));
  let template = topic_template(&state, &topic, language, Some(message));
  (jar, Html(template.render().unwrap_or_default())).into_response()
}

#[derive(Deserialize)]
pub struct DeleteWordForm {
  pub card_id: String,
}

/// POST /words/delete
pub async fn delete_word(State(state): State<AppState>, Form(form): Form<DeleteWordForm>) -> Redirect {
  match state.progress.delete_custom_word(&form.card_id) {
    Ok(true) => tracing::info!("Deleted custom word {}", form.card_id),
    Ok(false) => tracing::debug!("No custom word {} to delete", form.card_id),
    Err(e) => tracing::warn!("Failed to delete custom word {}: {}", form.card_id, e),
  }
  Redirect::to(&format!("/vocab/{}", CUSTOM_TOPIC_ID))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assistant::{Assistant, GeneratedVocab};
  use crate::handlers::test_support::*;
  use crate::testing::{memory_state, ScriptedModel};
  use axum::http::StatusCode;
  use std::sync::Arc;

  #[test]
  fn test_next_card_id_skips_taken() {
    let first = next_card_id(&[]);
    let taken: Vec<VocabCard> = (0..5)
      .map(|i| {
        let id = (first.parse::<i64>().unwrap() + i).to_string();
        VocabCard::new(id, "ねこ", "neko", "cat")
      })
      .collect();
    let next = next_card_id(&taken);
    assert!(taken.iter().all(|card| card.id != next));
  }

  #[test]
  fn test_concurrent_adds_get_distinct_ids() {
    let state = memory_state(Assistant::offline());
    std::thread::scope(|scope| {
      for _ in 0..8 {
        let progress = state.progress.clone();
        scope.spawn(move || {
          progress
            .add_custom_word_with(|existing| {
              VocabCard::new(next_card_id(existing), "ねこ", "neko", "cat")
            })
            .unwrap();
        });
      }
    });

    let mut ids: Vec<String> = state.progress.custom_words().into_iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), 8);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
  }

  #[tokio::test]
  async fn test_topic_list_includes_custom() {
    let (_, server) = offline();
    let response = server.get("/vocab").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("My Words"));
    assert!(body.contains("/vocab/greetings"));
  }

  #[tokio::test]
  async fn test_topic_detail_and_unknown() {
    let (_, server) = offline();
    server.get("/vocab/animals").await.assert_status_ok();
    server.get("/vocab/nope").await.assert_status_not_found();
  }

  #[tokio::test]
  async fn test_add_word_offline_reports_not_added() {
    let (state, server) = offline();
    let response = server.post("/words/add").form(&form(&[("query", "cat")])).await;
    response.assert_status_ok();
    assert!(response.text().contains("Could not add"));
    assert!(state.progress.custom_words().is_empty());
  }

  #[tokio::test]
  async fn test_add_blank_query_is_ignored() {
    let model = Arc::new(ScriptedModel::new());
    let state = memory_state(Assistant::new(model.clone()));
    let server = server(state.clone());

    let response = server.post("/words/add").form(&form(&[("query", "   ")])).await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(model.vocab_calls(), 0);
    assert!(state.progress.custom_words().is_empty());
  }

  #[tokio::test]
  async fn test_add_word_with_model_persists() {
    let model = ScriptedModel::new().with_vocab(GeneratedVocab {
      script: "ねこ".into(),
      romanization: "neko".into(),
      meaning: "cat".into(),
    });
    let state = memory_state(Assistant::new(Arc::new(model)));
    let server = server(state.clone());

    let response = server.post("/words/add").form(&form(&[("query", "cat")])).await;
    response.assert_status(StatusCode::SEE_OTHER);

    let words = state.progress.custom_words();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].script, "ねこ");
    assert!(words[0].id.parse::<i64>().is_ok());
  }

  #[tokio::test]
  async fn test_delete_word_prunes_mastery() {
    let (state, server) = offline();
    state
      .progress
      .add_custom_word(VocabCard::new("42", "いぬ", "inu", "dog"))
      .unwrap();
    state.progress.set("42", true).unwrap();

    server
      .post("/words/delete")
      .form(&form(&[("card_id", "42")]))
      .await
      .assert_status(StatusCode::SEE_OTHER);
    assert!(state.progress.custom_words().is_empty());
    assert!(!state.progress.mastery_map().contains_key("42"));
  }

  #[tokio::test]
  async fn test_reset_clears_only_that_topic() {
    let (state, server) = offline();
    let animals = find_topic(&state, "animals").unwrap();
    let food = find_topic(&state, "food").unwrap();
    state.progress.set(&animals.cards[0].id, true).unwrap();
    state.progress.set(&food.cards[0].id, true).unwrap();

    server
      .post("/vocab/animals/reset")
      .await
      .assert_status(StatusCode::SEE_OTHER);
    assert!(!state.progress.get(&animals.cards[0].id));
    assert!(state.progress.get(&food.cards[0].id));
  }
}
