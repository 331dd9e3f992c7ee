//! Handlers for student reads.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/students` | Sorted by name ascending |
//! | `GET`  | `/students/:student_id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
};
use cairn_core::{store::StudentStore, student::Student};

use crate::{AppState, Data, error::ApiError};

/// `GET /students`
pub async fn list<S: StudentStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<Data<Vec<Student>>>, ApiError> {
  let students = state.store.list_students().await?;
  Ok(Json(Data { data: students }))
}

/// `GET /students/:student_id`
pub async fn get_one<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path(student_id): Path<String>,
) -> Result<Json<Data<Student>>, ApiError> {
  let student = state.store.get_student(&student_id).await?;
  Ok(Json(Data { data: student }))
}
