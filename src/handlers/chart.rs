//! Kana chart: learned toggles and per-glyph mnemonics.

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;

use super::{learner_session, not_found, percent, NavContext};
use crate::content::KanaCatalog;
use crate::domain::{CharacterEntry, KanaCategory};
use crate::filters;
use crate::state::AppState;
use crate::store::LogOnError;

pub struct ChartCell {
  pub glyph: &'static str,
  pub romanization: &'static str,
  pub learned: bool,
}

pub struct ChartSection {
  pub title: &'static str,
  pub cells: Vec<ChartCell>,
}

fn section_title(category: KanaCategory) -> &'static str {
  match category {
    KanaCategory::Monograph => "Basic",
    KanaCategory::Diacritic => "Dakuten & Handakuten",
    KanaCategory::Digraph => "Combinations",
  }
}

/// Catalog grouped by category, in catalog order
pub fn chart_sections(catalog: &KanaCatalog, learned: &[String]) -> Vec<ChartSection> {
  [KanaCategory::Monograph, KanaCategory::Diacritic, KanaCategory::Digraph]
    .into_iter()
    .map(|category| ChartSection {
      title: section_title(category),
      cells: catalog
        .by_category(category)
        .map(|entry| ChartCell {
          glyph: entry.glyph,
          romanization: entry.romanization,
          learned: learned.iter().any(|g| g == entry.glyph),
        })
        .collect(),
    })
    .collect()
}

#[derive(Template)]
#[template(path = "chart.html")]
pub struct ChartTemplate {
  pub nav: NavContext,
  pub sections: Vec<ChartSection>,
  pub learned_count: usize,
  pub total: usize,
  pub percent: u32,
}

#[derive(Template)]
#[template(path = "chart_cell.html")]
pub struct ChartCellTemplate {
  pub cell: ChartCell,
  pub learned_count: usize,
  pub total: usize,
  pub percent: u32,
}

#[derive(Template)]
#[template(path = "glyph_detail.html")]
pub struct GlyphDetailTemplate {
  pub entry: CharacterEntry,
  pub learned: bool,
  pub mnemonic: String,
}

/// Learned glyphs that are still in the catalog
fn learned_in_catalog(state: &AppState) -> Vec<String> {
  state
    .progress
    .learned_characters()
    .into_iter()
    .filter(|glyph| state.catalog.find_glyph(glyph).is_some())
    .collect()
}

/// GET /chart
pub async fn chart_page(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let language = state.sessions.with_session(&session_id, |s| s.language);

  let learned = learned_in_catalog(&state);
  let total = state.catalog.len();

  let template = ChartTemplate {
    nav: NavContext::new(&state, language, "chart"),
    sections: chart_sections(&state.catalog, &learned),
    learned_count: learned.len(),
    total,
    percent: percent(learned.len(), total),
  };

  (jar, Html(template.render().unwrap_or_default()))
}

/// GET /chart/{glyph} - detail panel with a mnemonic
pub async fn glyph_detail(
  State(state): State<AppState>,
  jar: CookieJar,
  Path(glyph): Path<String>,
) -> Response {
  let Some(entry) = state.catalog.find_glyph(&glyph).copied() else {
    return not_found(format!("Unknown character {}", glyph));
  };
  let (jar, session_id) = learner_session(&state.sessions, jar);
  let language = state.sessions.with_session(&session_id, |s| s.language);

  let mnemonic = state
    .assistant
    .mnemonic(entry.glyph, entry.romanization, language)
    .await;

  let template = GlyphDetailTemplate {
    entry,
    learned: state.progress.is_learned(entry.glyph),
    mnemonic,
  };

  (jar, Html(template.render().unwrap_or_default())).into_response()
}

/// POST /chart/{glyph}/toggle - returns the updated cell and progress
pub async fn toggle_learned(State(state): State<AppState>, Path(glyph): Path<String>) -> Response {
  let Some(entry) = state.catalog.find_glyph(&glyph).copied() else {
    return not_found(format!("Unknown character {}", glyph));
  };

  let learned = state
    .progress
    .toggle_learned(entry.glyph)
    .log_warn("Failed to save learned character")
    .unwrap_or_else(|| state.progress.is_learned(entry.glyph));
  tracing::debug!("{} learned: {}", entry.glyph, learned);

  let learned_count = learned_in_catalog(&state).len();
  let total = state.catalog.len();

  let template = ChartCellTemplate {
    cell: ChartCell {
      glyph: entry.glyph,
      romanization: entry.romanization,
      learned,
    },
    learned_count,
    total,
    percent: percent(learned_count, total),
  };

  Html(template.render().unwrap_or_default()).into_response()
}
