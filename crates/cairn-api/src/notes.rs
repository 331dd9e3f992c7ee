//! Handlers for `/students/:student_id/notes` endpoints — the only
//! collection with full CRUD.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/students/:student_id/notes` | Body: `{"author","content"}` |
//! | `PATCH`  | `/students/:student_id/notes/:note_id` | Body: `{"content"}` |
//! | `DELETE` | `/students/:student_id/notes/:note_id` | 404 if note absent |

use axum::{
  Json,
  extract::{Path, State},
};
use cairn_core::{
  store::{NewNote, StudentStore},
  student::Student,
};
use serde::Deserialize;

use crate::{AppState, Data, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub author:  String,
  #[serde(default)]
  pub content: String,
}

/// `POST /students/:student_id/notes`
pub async fn create<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path(student_id): Path<String>,
  Json(body): Json<CreateBody>,
) -> Result<Json<Data<Student>>, ApiError> {
  let author = body.author.trim().to_owned();
  let content = body.content.trim().to_owned();
  if author.is_empty() || content.is_empty() {
    return Err(ApiError::BadRequest(
      "author and content are required".to_owned(),
    ));
  }

  let student =
    state.store.create_note(&student_id, NewNote { author, content }).await?;
  Ok(Json(Data { data: student }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(default)]
  pub content: String,
}

/// `PATCH /students/:student_id/notes/:note_id`
pub async fn update<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path((student_id, note_id)): Path<(String, String)>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Data<Student>>, ApiError> {
  let content = body.content.trim().to_owned();
  if content.is_empty() {
    return Err(ApiError::BadRequest("content is required".to_owned()));
  }

  let student =
    state.store.update_note(&student_id, &note_id, content).await?;
  Ok(Json(Data { data: student }))
}

/// `DELETE /students/:student_id/notes/:note_id`
pub async fn remove<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path((student_id, note_id)): Path<(String, String)>,
) -> Result<Json<Data<Student>>, ApiError> {
  let student = state.store.delete_note(&student_id, &note_id).await?;
  Ok(Json(Data { data: student }))
}
