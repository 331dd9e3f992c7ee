//! JSON REST API for Cairn.
//!
//! Exposes an axum [`Router`] backed by any [`cairn_core::store::StudentStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! Successful responses wrap their payload in `{"data": ...}` (the summary
//! endpoint is the exception and returns `{"summary", "cached"}`); errors are
//! `{"error": message}` with a meaningful status code.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cairn_api::api_router(state))
//! ```

pub mod communications;
pub mod error;
pub mod notes;
pub mod reminders;
pub mod students;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use cairn_core::store::StudentStore;
use cairn_summary::{Summarize, SummaryCache};
use serde::Serialize;

pub use error::ApiError;

/// Standard success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
  pub data: T,
}

/// Shared handler state: the active store backend, the summarization
/// provider, and the summary cache.
pub struct AppState<S> {
  pub store:      Arc<S>,
  pub summarizer: Arc<dyn Summarize>,
  pub cache:      Arc<SummaryCache>,
}

// Manual impl: `#[derive(Clone)]` would require `S: Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      summarizer: self.summarizer.clone(),
      cache:      self.cache.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: StudentStore + 'static,
{
  Router::new()
    // Students
    .route("/students", get(students::list::<S>))
    .route("/students/{student_id}", get(students::get_one::<S>))
    // Notes
    .route("/students/{student_id}/notes", post(notes::create::<S>))
    .route(
      "/students/{student_id}/notes/{note_id}",
      patch(notes::update::<S>).delete(notes::remove::<S>),
    )
    // Communications
    .route(
      "/students/{student_id}/communications",
      post(communications::log::<S>),
    )
    .route(
      "/students/{student_id}/follow-up",
      post(communications::follow_up::<S>),
    )
    // Reminders
    .route("/students/{student_id}/reminders", post(reminders::create::<S>))
    .route(
      "/students/{student_id}/reminders/{reminder_id}",
      patch(reminders::toggle::<S>),
    )
    // AI summary
    .route("/students/{student_id}/summary", post(summary::generate::<S>))
    .with_state(state)
}
