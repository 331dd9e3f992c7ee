//! Student — the aggregate root.
//!
//! A student owns four sub-record collections exclusively. Each collection is
//! unique by id and kept sorted: timeline, communications and notes newest
//! first, reminders soonest-due first. The persisted parent document carries
//! the same collections as inline arrays (the denormalized snapshot) so it
//! remains a complete, self-sufficient read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{
  ApplicationStatus, CommunicationEntry, Note, Reminder, SubRecord,
  TimelineEvent,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub id:                 String,
  pub name:               String,
  pub email:              String,
  pub phone:              String,
  pub country:            String,
  pub grade:              String,
  pub status:             ApplicationStatus,
  pub last_active:        DateTime<Utc>,
  pub last_contacted:     DateTime<Utc>,
  pub high_intent:        bool,
  pub needs_essay_help:   bool,
  pub program_interests:  Vec<String>,
  pub tags:               Vec<String>,
  pub engagement_score:   u32,
  pub essay_drafts:       u32,
  pub documents_uploaded: u32,
  pub open_applications:  u32,
  pub timeline:           Vec<TimelineEvent>,
  pub communications:     Vec<CommunicationEntry>,
  pub notes:              Vec<Note>,
  pub reminders:          Vec<Reminder>,
  pub ai_summary:         String,
}

impl Student {
  /// Restore the collection sort invariants after a direct mutation.
  pub fn sort_collections(&mut self) {
    self.timeline.sort_by(TimelineEvent::compare);
    self.communications.sort_by(CommunicationEntry::compare);
    self.notes.sort_by(Note::compare);
    self.reminders.sort_by(Reminder::compare);
  }
}

/// Name-ascending order used by every `list_students` implementation.
pub fn by_name_asc(a: &Student, b: &Student) -> std::cmp::Ordering {
  a.name.cmp(&b.name)
}
