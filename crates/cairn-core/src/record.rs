//! Sub-record types owned by a [`Student`](crate::student::Student).
//!
//! Each of the four collections exists in two persisted representations: an
//! inline array on the parent document and a subcollection of individually
//! addressable documents. Both sides normalize into these types.
//!
//! Enumerations parse permissively: an unrecognised value falls back to a
//! fixed default instead of failing, because the document store enforces no
//! schema. The strict parse (for boundary validation) is `FromStr`.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Pipeline stage of a student's application journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
  #[default]
  Exploring,
  Shortlisting,
  Applying,
  Submitted,
}

impl ApplicationStatus {
  /// Permissive parse: unknown values default to `Exploring`.
  pub fn from_loose(s: &str) -> Self {
    s.parse().unwrap_or_default()
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Exploring => "Exploring",
      Self::Shortlisting => "Shortlisting",
      Self::Applying => "Applying",
      Self::Submitted => "Submitted",
    }
  }
}

impl std::str::FromStr for ApplicationStatus {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, UnknownVariant> {
    match s {
      "Exploring" => Ok(Self::Exploring),
      "Shortlisting" => Ok(Self::Shortlisting),
      "Applying" => Ok(Self::Applying),
      "Submitted" => Ok(Self::Submitted),
      other => Err(UnknownVariant(other.to_owned())),
    }
  }
}

/// Kind of timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineEventKind {
  #[default]
  Activity,
  Document,
  Milestone,
  Message,
}

impl TimelineEventKind {
  /// Permissive parse: unknown values default to `Activity`.
  pub fn from_loose(s: &str) -> Self {
    s.parse().unwrap_or_default()
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Activity => "activity",
      Self::Document => "document",
      Self::Milestone => "milestone",
      Self::Message => "message",
    }
  }
}

impl std::str::FromStr for TimelineEventKind {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, UnknownVariant> {
    match s {
      "activity" => Ok(Self::Activity),
      "document" => Ok(Self::Document),
      "milestone" => Ok(Self::Milestone),
      "message" => Ok(Self::Message),
      other => Err(UnknownVariant(other.to_owned())),
    }
  }
}

/// Channel an advisor used to reach a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommunicationChannel {
  #[default]
  Email,
  #[serde(rename = "SMS")]
  Sms,
  Call,
  WhatsApp,
}

impl CommunicationChannel {
  /// Permissive parse: unknown values default to `Email`.
  pub fn from_loose(s: &str) -> Self {
    s.parse().unwrap_or_default()
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Email => "Email",
      Self::Sms => "SMS",
      Self::Call => "Call",
      Self::WhatsApp => "WhatsApp",
    }
  }
}

impl std::str::FromStr for CommunicationChannel {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, UnknownVariant> {
    match s {
      "Email" => Ok(Self::Email),
      "SMS" => Ok(Self::Sms),
      "Call" => Ok(Self::Call),
      "WhatsApp" => Ok(Self::WhatsApp),
      other => Err(UnknownVariant(other.to_owned())),
    }
  }
}

/// Strict-parse failure for the enumerations above. Boundary validation uses
/// this; the store itself only ever uses the `from_loose` variants.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown variant: {0:?}")]
pub struct UnknownVariant(pub String);

// ─── Records ─────────────────────────────────────────────────────────────────

/// A dated entry in a student's activity timeline. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
  pub id:      String,
  pub date:    DateTime<Utc>,
  #[serde(rename = "type")]
  pub kind:    TimelineEventKind,
  pub label:   String,
  pub details: String,
}

/// A logged outreach to a student. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationEntry {
  pub id:      String,
  pub channel: CommunicationChannel,
  pub subject: String,
  pub date:    DateTime<Utc>,
  pub owner:   String,
  pub notes:   String,
}

/// An advisor note. The only record with full CRUD semantics: content may be
/// edited (stamping `updated_at`) and the note may be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
  pub id:         String,
  pub author:     String,
  pub date:       DateTime<Utc>,
  pub content:    String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

/// A follow-up task. Only the `completed` flag is ever mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
  pub id:          String,
  pub due_date:    DateTime<Utc>,
  pub description: String,
  pub owner:       String,
  pub completed:   bool,
}

// ─── SubRecord ───────────────────────────────────────────────────────────────

/// Common surface over the four sub-record types: a stable string identifier
/// and the type-specific total ordering used everywhere a collection is
/// materialised.
pub trait SubRecord {
  fn record_id(&self) -> &str;

  /// Total order. Ties on the primary key break by id so sorting is
  /// deterministic.
  fn compare(a: &Self, b: &Self) -> Ordering;
}

fn desc_by_date(a_date: DateTime<Utc>, a_id: &str, b_date: DateTime<Utc>, b_id: &str) -> Ordering {
  b_date.cmp(&a_date).then_with(|| a_id.cmp(b_id))
}

impl SubRecord for TimelineEvent {
  fn record_id(&self) -> &str { &self.id }

  fn compare(a: &Self, b: &Self) -> Ordering {
    desc_by_date(a.date, &a.id, b.date, &b.id)
  }
}

impl SubRecord for CommunicationEntry {
  fn record_id(&self) -> &str { &self.id }

  fn compare(a: &Self, b: &Self) -> Ordering {
    desc_by_date(a.date, &a.id, b.date, &b.id)
  }
}

impl SubRecord for Note {
  fn record_id(&self) -> &str { &self.id }

  fn compare(a: &Self, b: &Self) -> Ordering {
    desc_by_date(a.date, &a.id, b.date, &b.id)
  }
}

impl SubRecord for Reminder {
  fn record_id(&self) -> &str { &self.id }

  /// Reminders sort soonest-due first, unlike the dated collections.
  fn compare(a: &Self, b: &Self) -> Ordering {
    a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id))
  }
}
