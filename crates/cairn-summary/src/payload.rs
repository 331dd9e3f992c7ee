//! The trimmed payload sent to the summarizer: enough context to brief a
//! counselor, small enough to stay inside model input limits.

use serde::Serialize;

use cairn_core::{
  record::{
    ApplicationStatus, CommunicationEntry, Note, Reminder, TimelineEvent,
  },
  student::Student,
};

const MAX_TIMELINE_EVENTS: usize = 6;
const MAX_COMMUNICATIONS: usize = 4;
const MAX_NOTES: usize = 4;
const MAX_REMINDERS: usize = 4;

/// Whitespace runs (including newlines) collapse to single spaces so free
/// text cannot inject structure into the prompt.
fn sanitize(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sanitize_list(items: &[String]) -> Vec<String> {
  items.iter().map(|s| sanitize(s)).filter(|s| !s.is_empty()).collect()
}

/// Snapshot of one student for summarization. Built server-side from a
/// freshly fetched aggregate; serialization order is stable, so the JSON
/// encoding doubles as the cache-signature input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
  pub id:                String,
  pub name:              String,
  pub status:            ApplicationStatus,
  pub engagement_score:  u32,
  pub high_intent:       bool,
  pub needs_essay_help:  bool,
  pub last_active:       chrono::DateTime<chrono::Utc>,
  pub last_contacted:    chrono::DateTime<chrono::Utc>,
  pub tags:              Vec<String>,
  pub program_interests: Vec<String>,
  pub timeline:          Vec<TimelineEvent>,
  pub communications:    Vec<CommunicationEntry>,
  pub notes:             Vec<Note>,
  pub reminders:         Vec<Reminder>,
}

impl SummaryPayload {
  /// Trim a full aggregate down to the summarizer's view. The aggregate's
  /// collections are already canonically sorted, so the newest events and
  /// the soonest-due reminders survive the caps.
  pub fn from_student(student: &Student) -> Self {
    let mut timeline: Vec<TimelineEvent> = student
      .timeline
      .iter()
      .take(MAX_TIMELINE_EVENTS)
      .cloned()
      .collect();
    for event in &mut timeline {
      event.label = sanitize(&event.label);
      event.details = sanitize(&event.details);
    }

    let mut communications: Vec<CommunicationEntry> = student
      .communications
      .iter()
      .take(MAX_COMMUNICATIONS)
      .cloned()
      .collect();
    for entry in &mut communications {
      entry.subject = sanitize(&entry.subject);
      entry.owner = sanitize(&entry.owner);
      entry.notes = sanitize(&entry.notes);
    }

    let mut notes: Vec<Note> =
      student.notes.iter().take(MAX_NOTES).cloned().collect();
    for note in &mut notes {
      note.author = sanitize(&note.author);
      note.content = sanitize(&note.content);
    }

    let mut reminders: Vec<Reminder> =
      student.reminders.iter().take(MAX_REMINDERS).cloned().collect();
    for reminder in &mut reminders {
      reminder.description = sanitize(&reminder.description);
      reminder.owner = sanitize(&reminder.owner);
    }

    Self {
      id: student.id.clone(),
      name: sanitize(&student.name),
      status: student.status,
      engagement_score: student.engagement_score,
      high_intent: student.high_intent,
      needs_essay_help: student.needs_essay_help,
      last_active: student.last_active,
      last_contacted: student.last_contacted,
      tags: sanitize_list(&student.tags),
      program_interests: sanitize_list(&student.program_interests),
      timeline,
      communications,
      notes,
      reminders,
    }
  }
}
