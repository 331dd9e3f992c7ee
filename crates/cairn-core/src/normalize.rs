//! Record normalization — pure coercion from structurally-untrusted values
//! (parent-document fields, inline array members, sub-record documents) into
//! the canonical record types.
//!
//! Nothing in this module fails: missing ids are synthesized, unparseable
//! creation-facing dates degrade to "now", unknown enum members fall back to
//! their defaults, and free text coerces to a string. The document store
//! enforces no schema, so every read passes through here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde_json::Value;

use crate::{
  record::{
    ApplicationStatus, CommunicationChannel, CommunicationEntry, Note,
    Reminder, SubRecord, TimelineEvent, TimelineEventKind,
  },
  student::Student,
};

/// Default attribution when a loosely-typed document omits the owner.
pub const DEFAULT_OWNER: &str = "Advising Team";
/// Default attribution when a loosely-typed note omits the author.
pub const DEFAULT_AUTHOR: &str = "Admissions Team";

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Synthesize a record identifier: eight base-36 characters of OS randomness
/// followed by the current epoch milliseconds in base 36. Collision-free in
/// practice within one process lifetime.
pub fn create_id() -> String {
  let mut buf = [0u8; 8];
  OsRng.fill_bytes(&mut buf);
  let random = u64::from_le_bytes(buf);

  let millis = Utc::now().timestamp_millis().max(0) as u64;

  let mut id = to_base36(random);
  id.truncate(8);
  id.push_str(&to_base36(millis));
  id
}

fn to_base36(mut n: u64) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  if n == 0 {
    return "0".to_owned();
  }
  let mut out = Vec::new();
  while n > 0 {
    out.push(DIGITS[(n % 36) as usize]);
    n /= 36;
  }
  out.reverse();
  String::from_utf8(out).unwrap_or_default()
}

// ─── Scalar coercion ─────────────────────────────────────────────────────────

/// Parse a date-like string: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (assumed UTC), or a bare calendar date.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
  }
  None
}

/// Coerce a date-like value: a date string, or a numeric epoch in
/// milliseconds. Invalid or missing values fall back to "now".
pub fn coerce_date(value: Option<&Value>) -> DateTime<Utc> {
  opt_date(value).unwrap_or_else(Utc::now)
}

/// Like [`coerce_date`] but `None` when the value is absent or unparseable.
/// Used for genuinely optional dates such as a note's `updatedAt`.
pub fn opt_date(value: Option<&Value>) -> Option<DateTime<Utc>> {
  match value {
    Some(Value::String(s)) => parse_date(s),
    Some(Value::Number(n)) => {
      let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
      DateTime::from_timestamp_millis(millis)
    }
    _ => None,
  }
}

/// Coerce to a string; absent or null becomes `default`.
pub fn coerce_text(value: Option<&Value>, default: &str) -> String {
  match value {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.to_string(),
    Some(Value::Bool(b)) => b.to_string(),
    _ => default.to_owned(),
  }
}

/// JavaScript-style truthiness; absent is `false`.
pub fn coerce_bool(value: Option<&Value>) -> bool {
  match value {
    Some(Value::Bool(b)) => *b,
    Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
    Some(Value::String(s)) => !s.is_empty(),
    Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    _ => false,
  }
}

/// Coerce to a non-negative count: a number, or a string that parses as one;
/// everything else is 0.
pub fn coerce_count(value: Option<&Value>) -> u32 {
  match value {
    Some(Value::Number(n)) => {
      if let Some(u) = n.as_u64() {
        u.min(u32::MAX as u64) as u32
      } else {
        n.as_f64().filter(|f| *f > 0.0).map(|f| f as u32).unwrap_or(0)
      }
    }
    Some(Value::String(s)) => s.trim().parse::<u32>().unwrap_or(0),
    _ => 0,
  }
}

/// Coerce to an array of strings, dropping non-stringifiable members.
pub fn string_array(value: Option<&Value>) -> Vec<String> {
  match value {
    Some(Value::Array(items)) => items
      .iter()
      .map(|item| coerce_text(Some(item), ""))
      .filter(|s| !s.is_empty())
      .collect(),
    _ => Vec::new(),
  }
}

fn id_or_create(value: &Value, explicit_id: Option<&str>) -> String {
  if let Some(id) = explicit_id {
    if !id.is_empty() {
      return id.to_owned();
    }
  }
  let from_doc = coerce_text(value.get("id"), "");
  if from_doc.is_empty() { create_id() } else { from_doc }
}

// ─── Record normalizers ──────────────────────────────────────────────────────

/// Normalize a single timeline event. `explicit_id` (the sub-record document
/// id) wins over any `id` field in the value. Non-object values are dropped.
pub fn normalize_timeline_event(
  value: &Value,
  explicit_id: Option<&str>,
) -> Option<TimelineEvent> {
  if !value.is_object() {
    return None;
  }
  Some(TimelineEvent {
    id:      id_or_create(value, explicit_id),
    date:    coerce_date(value.get("date")),
    kind:    TimelineEventKind::from_loose(&coerce_text(value.get("type"), "")),
    label:   coerce_text(value.get("label"), ""),
    details: coerce_text(value.get("details"), ""),
  })
}

pub fn normalize_communication(
  value: &Value,
  explicit_id: Option<&str>,
) -> Option<CommunicationEntry> {
  if !value.is_object() {
    return None;
  }
  Some(CommunicationEntry {
    id:      id_or_create(value, explicit_id),
    channel: CommunicationChannel::from_loose(&coerce_text(
      value.get("channel"),
      "",
    )),
    subject: coerce_text(value.get("subject"), ""),
    date:    coerce_date(value.get("date")),
    owner:   coerce_text(value.get("owner"), DEFAULT_OWNER),
    notes:   coerce_text(value.get("notes"), ""),
  })
}

pub fn normalize_note(value: &Value, explicit_id: Option<&str>) -> Option<Note> {
  if !value.is_object() {
    return None;
  }
  Some(Note {
    id:         id_or_create(value, explicit_id),
    author:     coerce_text(value.get("author"), DEFAULT_AUTHOR),
    date:       coerce_date(value.get("date")),
    content:    coerce_text(value.get("content"), ""),
    updated_at: opt_date(value.get("updatedAt")),
  })
}

pub fn normalize_reminder(
  value: &Value,
  explicit_id: Option<&str>,
) -> Option<Reminder> {
  if !value.is_object() {
    return None;
  }
  Some(Reminder {
    id:          id_or_create(value, explicit_id),
    due_date:    coerce_date(value.get("dueDate")),
    description: coerce_text(value.get("description"), ""),
    owner:       coerce_text(value.get("owner"), DEFAULT_OWNER),
    completed:   coerce_bool(value.get("completed")),
  })
}

// ─── Array normalizers ───────────────────────────────────────────────────────

fn normalize_array<T: SubRecord>(
  value: Option<&Value>,
  normalize_one: impl Fn(&Value) -> Option<T>,
) -> Vec<T> {
  let Some(Value::Array(items)) = value else {
    return Vec::new();
  };
  let mut records: Vec<T> = items.iter().filter_map(normalize_one).collect();
  records.sort_by(T::compare);
  records
}

pub fn normalize_timeline_array(value: Option<&Value>) -> Vec<TimelineEvent> {
  normalize_array(value, |v| normalize_timeline_event(v, None))
}

pub fn normalize_communications_array(
  value: Option<&Value>,
) -> Vec<CommunicationEntry> {
  normalize_array(value, |v| normalize_communication(v, None))
}

pub fn normalize_notes_array(value: Option<&Value>) -> Vec<Note> {
  normalize_array(value, |v| normalize_note(v, None))
}

pub fn normalize_reminders_array(value: Option<&Value>) -> Vec<Reminder> {
  normalize_array(value, |v| normalize_reminder(v, None))
}

// ─── Student ─────────────────────────────────────────────────────────────────

/// Assemble a full [`Student`] from a parent document value, including its
/// inline collection arrays. The caller supplies the document id.
pub fn normalize_student(id: &str, doc: &Value) -> Student {
  Student {
    id:                 id.to_owned(),
    name:               coerce_text(doc.get("name"), ""),
    email:              coerce_text(doc.get("email"), ""),
    phone:              coerce_text(doc.get("phone"), ""),
    country:            coerce_text(doc.get("country"), ""),
    grade:              coerce_text(doc.get("grade"), ""),
    status:             ApplicationStatus::from_loose(&coerce_text(
      doc.get("status"),
      "",
    )),
    last_active:        coerce_date(doc.get("lastActive")),
    last_contacted:     coerce_date(doc.get("lastContacted")),
    high_intent:        coerce_bool(doc.get("highIntent")),
    needs_essay_help:   coerce_bool(doc.get("needsEssayHelp")),
    program_interests:  string_array(doc.get("programInterests")),
    tags:               string_array(doc.get("tags")),
    engagement_score:   coerce_count(doc.get("engagementScore")),
    essay_drafts:       coerce_count(doc.get("essayDrafts")),
    documents_uploaded: coerce_count(doc.get("documentsUploaded")),
    open_applications:  coerce_count(doc.get("openApplications")),
    timeline:           normalize_timeline_array(doc.get("timeline")),
    communications:     normalize_communications_array(
      doc.get("communications"),
    ),
    notes:              normalize_notes_array(doc.get("notes")),
    reminders:          normalize_reminders_array(doc.get("reminders")),
    ai_summary:         coerce_text(doc.get("aiSummary"), ""),
  }
}
