//! Handlers for `/students/:student_id/reminders` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/students/:student_id/reminders` | Body: `{"dueDate","description","owner"}` |
//! | `PATCH` | `/students/:student_id/reminders/:reminder_id` | Body: `{"completed"}` |

use axum::{
  Json,
  extract::{Path, State},
};
use cairn_core::{
  normalize::{DEFAULT_OWNER, coerce_bool, parse_date},
  store::{NewReminder, StudentStore},
  student::Student,
};
use serde::Deserialize;

use crate::{AppState, Data, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  #[serde(default)]
  pub due_date:    String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub owner:       String,
}

/// `POST /students/:student_id/reminders`
pub async fn create<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path(student_id): Path<String>,
  Json(body): Json<CreateBody>,
) -> Result<Json<Data<Student>>, ApiError> {
  let due_date = parse_date(body.due_date.trim()).ok_or_else(|| {
    ApiError::BadRequest("a valid due date is required".to_owned())
  })?;

  let description = body.description.trim().to_owned();
  if description.is_empty() {
    return Err(ApiError::BadRequest("description is required".to_owned()));
  }

  let owner = body.owner.trim();
  let owner = if owner.is_empty() { DEFAULT_OWNER } else { owner };

  let student = state
    .store
    .create_reminder(&student_id, NewReminder {
      due_date,
      description,
      owner: owner.to_owned(),
    })
    .await?;
  Ok(Json(Data { data: student }))
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  // Accepts any JSON value; coerced with the same truthiness the
  // normalizer applies to stored documents.
  #[serde(default)]
  pub completed: serde_json::Value,
}

/// `PATCH /students/:student_id/reminders/:reminder_id`
pub async fn toggle<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path((student_id, reminder_id)): Path<(String, String)>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<Data<Student>>, ApiError> {
  let completed = coerce_bool(Some(&body.completed));
  let student = state
    .store
    .toggle_reminder(&student_id, &reminder_id, completed)
    .await?;
  Ok(Json(Data { data: student }))
}
