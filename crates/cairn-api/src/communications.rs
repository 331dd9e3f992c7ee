//! Handlers for outreach logging.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/students/:student_id/communications` | Strict channel parse |
//! | `POST` | `/students/:student_id/follow-up` | No body |

use axum::{
  Json,
  extract::{Path, State},
};
use cairn_core::{
  normalize::DEFAULT_OWNER,
  record::CommunicationChannel,
  store::{NewCommunication, StudentStore},
  student::Student,
};
use serde::Deserialize;

use crate::{AppState, Data, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LogBody {
  #[serde(default)]
  pub channel: String,
  #[serde(default)]
  pub subject: String,
  #[serde(default)]
  pub notes:   String,
  #[serde(default)]
  pub owner:   String,
}

/// `POST /students/:student_id/communications`
///
/// Unlike the permissive store-side normalizer, the boundary parses the
/// channel strictly: an unknown channel is a 400, not a silent default.
pub async fn log<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path(student_id): Path<String>,
  Json(body): Json<LogBody>,
) -> Result<Json<Data<Student>>, ApiError> {
  let channel: CommunicationChannel =
    body.channel.trim().parse().map_err(|_| {
      ApiError::BadRequest("invalid communication channel".to_owned())
    })?;

  let subject = body.subject.trim().to_owned();
  if subject.is_empty() {
    return Err(ApiError::BadRequest("subject is required".to_owned()));
  }

  let owner = body.owner.trim();
  let owner = if owner.is_empty() { DEFAULT_OWNER } else { owner };

  let student = state
    .store
    .log_communication(&student_id, NewCommunication {
      channel,
      subject,
      notes: body.notes.trim().to_owned(),
      owner: owner.to_owned(),
    })
    .await?;
  Ok(Json(Data { data: student }))
}

/// `POST /students/:student_id/follow-up`
pub async fn follow_up<S: StudentStore>(
  State(state): State<AppState<S>>,
  Path(student_id): Path<String>,
) -> Result<Json<Data<Student>>, ApiError> {
  let student = state.store.trigger_follow_up(&student_id).await?;
  Ok(Json(Data { data: student }))
}
