//! Handler for the AI counselor briefing.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/students/:student_id/summary` | Cached per student with TTL |

use axum::{
  Json,
  extract::{Path, State},
};
use cairn_core::store::StudentStore;
use cairn_summary::{SummaryPayload, build_prompt};
use serde::Serialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct SummaryBody {
  pub summary: String,
  pub cached:  bool,
}

/// `POST /students/:student_id/summary`
///
/// The payload is built server-side from a freshly fetched aggregate, never
/// accepted from the client, so the cache signature always reflects stored
/// state.
pub async fn generate<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path(student_id): Path<String>,
) -> Result<Json<SummaryBody>, ApiError> {
  let student = state.store.get_student(&student_id).await?;
  let payload = SummaryPayload::from_student(&student);

  let prompt = build_prompt(&payload);
  let summarizer = state.summarizer.clone();
  let outcome = state
    .cache
    .get_or_compute(&payload, move || async move {
      summarizer.summarize(&prompt).await
    })
    .await?;

  Ok(Json(SummaryBody { summary: outcome.summary, cached: outcome.cached }))
}
