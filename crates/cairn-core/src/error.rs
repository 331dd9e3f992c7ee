//! Shared error taxonomy for `cairn-core` and the store backends.
//!
//! Both backends surface the same error kinds so that higher layers can map
//! "not found" to a 404-equivalent without knowing which backend is active.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(String),

  #[error("note {note_id} not found for student {student_id}")]
  NoteNotFound {
    student_id: String,
    note_id:    String,
  },

  #[error("reminder {reminder_id} not found for student {student_id}")]
  ReminderNotFound {
    student_id:  String,
    reminder_id: String,
  },

  /// Any persistence failure from the durable backend. The original cause is
  /// logged with operation context where it is raised; it is never retried.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap an arbitrary backend failure.
  pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(e))
  }

  /// `true` for the recoverable "record absent" kinds, which the HTTP
  /// boundary maps to a 404-equivalent.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::StudentNotFound(_)
        | Self::NoteNotFound { .. }
        | Self::ReminderNotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
