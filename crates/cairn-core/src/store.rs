//! The `StudentStore` trait, mutation payloads, and subscription plumbing.
//!
//! The trait is implemented by two interchangeable backends: the durable
//! document store (`cairn-store-sqlite`) and the in-process fallback map
//! (`cairn-store-memory`). Callers never need to know which one is active;
//! the choice is made once at startup and the resolved instance is passed
//! explicitly to consumers.

use std::{
  future::Future,
  sync::{Arc, Mutex, Weak},
};

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  record::CommunicationChannel,
  student::Student,
};

// ─── Mutation payloads ───────────────────────────────────────────────────────

/// Input to [`StudentStore::create_note`]. The date and id are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewNote {
  pub author:  String,
  pub content: String,
}

/// Input to [`StudentStore::log_communication`].
#[derive(Debug, Clone)]
pub struct NewCommunication {
  pub channel: CommunicationChannel,
  pub subject: String,
  pub notes:   String,
  pub owner:   String,
}

/// Input to [`StudentStore::create_reminder`]. `completed` always starts
/// `false`.
#[derive(Debug, Clone)]
pub struct NewReminder {
  pub due_date:    DateTime<Utc>,
  pub description: String,
  pub owner:       String,
}

// ─── Fixed follow-up semantics ───────────────────────────────────────────────

// The follow-up operation records intent only; no email is ever dispatched.
pub const FOLLOW_UP_SUBJECT: &str = "Automated follow-up email scheduled";
pub const FOLLOW_UP_OWNER: &str = "Workflow Automation";
pub const FOLLOW_UP_NOTES: &str =
  "Mock action recorded for visibility. No email is sent in this demo.";
pub const FOLLOW_UP_LABEL: &str = "Follow-up email triggered";
pub const FOLLOW_UP_DETAILS: &str =
  "Automation will send reminder within 24 hours.";

/// Timeline label derived from a logged communication.
pub fn outreach_label(channel: CommunicationChannel) -> String {
  format!("Logged {} outreach", channel.as_str().to_lowercase())
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Cairn student store backend.
///
/// Every mutation runs the full fetch-merge-sort-serialize-writeback protocol
/// against the durable backend and returns the freshly assembled aggregate,
/// so callers always observe a complete, post-mutation snapshot.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait StudentStore: Send + Sync {
  // ── Reads ─────────────────────────────────────────────────────────────

  /// List all students, sorted by name ascending.
  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>>> + Send + '_;

  /// Fetch one fully assembled student, or [`Error::StudentNotFound`].
  fn get_student<'a>(
    &'a self,
    student_id: &'a str,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  // ── Notes — full CRUD ─────────────────────────────────────────────────

  fn create_note<'a>(
    &'a self,
    student_id: &'a str,
    input: NewNote,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  /// Replace a note's content and stamp `updated_at`.
  /// [`Error::NoteNotFound`] if the note id is absent.
  fn update_note<'a>(
    &'a self,
    student_id: &'a str,
    note_id: &'a str,
    content: String,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  fn delete_note<'a>(
    &'a self,
    student_id: &'a str,
    note_id: &'a str,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  // ── Communications ────────────────────────────────────────────────────

  /// Append one communication entry plus its derived timeline event, and
  /// update `last_contacted` — one logical unit.
  fn log_communication<'a>(
    &'a self,
    student_id: &'a str,
    input: NewCommunication,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  /// Record a synthetic follow-up (fixed subject/owner) plus its timeline
  /// event, and update `last_contacted`. Records intent only; nothing is
  /// dispatched.
  fn trigger_follow_up<'a>(
    &'a self,
    student_id: &'a str,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  // ── Reminders ─────────────────────────────────────────────────────────

  fn create_reminder<'a>(
    &'a self,
    student_id: &'a str,
    input: NewReminder,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  /// Set a reminder's `completed` flag. [`Error::ReminderNotFound`] if the
  /// reminder id is absent.
  fn toggle_reminder<'a>(
    &'a self,
    student_id: &'a str,
    reminder_id: &'a str,
    completed: bool,
  ) -> impl Future<Output = Result<Student>> + Send + 'a;

  // ── Live updates ──────────────────────────────────────────────────────

  /// Register for full-snapshot notifications after each mutation.
  /// Dropping the returned [`Subscription`] stops further notifications
  /// without affecting other subscribers.
  fn subscribe(
    &self,
    on_data: StudentsListener,
    on_error: Option<StoreErrorListener>,
  ) -> Subscription;
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

/// Callback invoked with a full fresh snapshot (not deltas) after each
/// mutation, in subscription order.
pub type StudentsListener = Arc<dyn Fn(&[Student]) + Send + Sync>;

/// Callback invoked when a snapshot could not be assembled for delivery.
pub type StoreErrorListener = Arc<dyn Fn(&Error) + Send + Sync>;

struct SubscriberEntry {
  id:       u64,
  on_data:  StudentsListener,
  on_error: Option<StoreErrorListener>,
}

#[derive(Default)]
struct SubscriberInner {
  next_id: u64,
  entries: Vec<SubscriberEntry>,
}

/// Registry of live-update subscribers, shared by both backends.
///
/// Notification is synchronous and in subscription order. Cloning shares the
/// registry.
#[derive(Clone, Default)]
pub struct SubscriberSet {
  inner: Arc<Mutex<SubscriberInner>>,
}

impl SubscriberSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn subscribe(
    &self,
    on_data: StudentsListener,
    on_error: Option<StoreErrorListener>,
  ) -> Subscription {
    let id = {
      let mut inner = self.lock();
      let id = inner.next_id;
      inner.next_id += 1;
      inner.entries.push(SubscriberEntry { id, on_data, on_error });
      id
    };
    Subscription { inner: Arc::downgrade(&self.inner), id }
  }

  /// `true` when nobody is listening; lets backends skip snapshot assembly.
  pub fn is_empty(&self) -> bool {
    self.lock().entries.is_empty()
  }

  /// Deliver a fresh snapshot to every subscriber.
  pub fn notify(&self, students: &[Student]) {
    let listeners: Vec<StudentsListener> =
      self.lock().entries.iter().map(|e| e.on_data.clone()).collect();
    for listener in listeners {
      listener(students);
    }
  }

  /// Deliver an assembly failure to the subscribers that asked for errors.
  pub fn notify_error(&self, error: &Error) {
    let listeners: Vec<StoreErrorListener> = self
      .lock()
      .entries
      .iter()
      .filter_map(|e| e.on_error.clone())
      .collect();
    for listener in listeners {
      listener(error);
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, SubscriberInner> {
    // Listener callbacks run outside the lock, so the mutex cannot be
    // poisoned by a panicking subscriber mid-notify.
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}

/// Guard for one live-update registration. Unsubscribes on drop.
pub struct Subscription {
  inner: Weak<Mutex<SubscriberInner>>,
  id:    u64,
}

impl Subscription {
  /// Explicitly stop notifications. Equivalent to dropping the guard.
  pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(inner) = self.inner.upgrade() {
      let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
      inner.entries.retain(|e| e.id != self.id);
    }
  }
}
