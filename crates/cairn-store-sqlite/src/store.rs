//! [`SqliteStore`] — the SQLite implementation of [`StudentStore`].
//!
//! Every mutation follows the same protocol: write the targeted sub-record,
//! re-read the inline snapshot, reconcile it with the full sub-record
//! enumeration, write the merged arrays back onto the parent document, and
//! return the freshly assembled aggregate. The writeback keeps the inline
//! snapshot current so plain reads never need the subrecords table.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::{Map, Value, json};

use cairn_core::{
  Error, Result,
  normalize::{
    create_id, normalize_communication, normalize_communications_array,
    normalize_note, normalize_notes_array, normalize_reminder,
    normalize_reminders_array, normalize_student, normalize_timeline_array,
    normalize_timeline_event,
  },
  reconcile::reconcile,
  record::{
    CommunicationChannel, CommunicationEntry, Note, Reminder, SubRecord,
    TimelineEvent, TimelineEventKind,
  },
  store::{
    FOLLOW_UP_DETAILS, FOLLOW_UP_LABEL, FOLLOW_UP_NOTES, FOLLOW_UP_OWNER,
    FOLLOW_UP_SUBJECT, NewCommunication, NewNote, NewReminder,
    StoreErrorListener, StudentStore, StudentsListener, SubscriberSet,
    Subscription, outreach_label,
  },
  student::{Student, by_name_asc},
};

use crate::schema::SCHEMA;

// Sub-record collection names, shared with older writers of the same file.
const TIMELINE: &str = "timeline";
const COMMUNICATIONS: &str = "communications";
const NOTES: &str = "notes";
const REMINDERS: &str = "reminders";

fn backend_error(
  op: &'static str,
  student_id: &str,
  error: tokio_rusqlite::Error,
) -> Error {
  tracing::error!(%op, %student_id, %error, "student store backend failure");
  Error::backend(error)
}

// Stored text that fails to parse degrades to `Null`, which the normalizer
// treats like any other non-object value.
fn parse_doc(text: &str) -> Value {
  serde_json::from_str(text).unwrap_or(Value::Null)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cairn student store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted and the
/// subscriber registry is shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:        tokio_rusqlite::Connection,
  subscribers: SubscriberSet,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|e| backend_error("open", "", e))?;
    let store = Self { conn, subscribers: SubscriberSet::new() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|e| backend_error("open", "", e))?;
    let store = Self { conn, subscribers: SubscriberSet::new() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(|e| backend_error("init_schema", "", e))?;
    Ok(())
  }

  /// Insert a seed student as an inline-only parent document, replacing any
  /// existing row with the same id.
  pub async fn insert_student(&self, student: &Student) -> Result<()> {
    let mut doc = serde_json::to_value(student)?;
    if let Some(map) = doc.as_object_mut() {
      // The row key is authoritative for the id.
      map.remove("id");
    }
    self.put_doc(&student.id, &doc).await
  }

  pub async fn count_students(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM students", [], |row| {
          row.get(0)
        })?)
      })
      .await
      .map_err(|e| backend_error("count_students", "", e))?;
    Ok(count as u64)
  }

  // ── Parent documents ──────────────────────────────────────────────────────

  pub(crate) async fn read_doc(
    &self,
    student_id: &str,
  ) -> Result<Option<Value>> {
    let id = student_id.to_owned();
    let text: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc FROM students WHERE student_id = ?1",
              rusqlite::params![id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(|e| backend_error("read_doc", student_id, e))?;
    Ok(text.map(|t| parse_doc(&t)))
  }

  async fn read_required_doc(&self, student_id: &str) -> Result<Value> {
    self
      .read_doc(student_id)
      .await?
      .ok_or_else(|| Error::StudentNotFound(student_id.to_owned()))
  }

  pub(crate) async fn put_doc(
    &self,
    student_id: &str,
    doc: &Value,
  ) -> Result<()> {
    let id = student_id.to_owned();
    let text = doc.to_string();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (student_id, doc) VALUES (?1, ?2)
           ON CONFLICT (student_id) DO UPDATE SET doc = excluded.doc",
          rusqlite::params![id, text],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| backend_error("put_doc", student_id, e))?;
    Ok(())
  }

  /// Merge `updates` into the parent document and stamp `updatedAt`. The
  /// student must exist; a non-object document is replaced wholesale.
  async fn write_back(
    &self,
    student_id: &str,
    updates: Map<String, Value>,
  ) -> Result<()> {
    let doc = self.read_required_doc(student_id).await?;
    let mut map = match doc {
      Value::Object(map) => map,
      _ => Map::new(),
    };
    for (key, value) in updates {
      map.insert(key, value);
    }
    map.insert("updatedAt".to_owned(), json!(Utc::now()));
    self.put_doc(student_id, &Value::Object(map)).await
  }

  // ── Sub-records ───────────────────────────────────────────────────────────

  async fn sub_list(
    &self,
    student_id: &str,
    collection: &'static str,
  ) -> Result<Vec<(String, Value)>> {
    let id = student_id.to_owned();
    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, doc FROM subrecords
           WHERE student_id = ?1 AND collection = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id, collection], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(|e| backend_error("sub_list", student_id, e))?;

    Ok(
      rows
        .into_iter()
        .map(|(record_id, text)| {
          let doc = parse_doc(&text);
          (record_id, doc)
        })
        .collect(),
    )
  }

  async fn sub_put(
    &self,
    student_id: &str,
    collection: &'static str,
    record_id: &str,
    doc: &Value,
  ) -> Result<()> {
    let sid = student_id.to_owned();
    let rid = record_id.to_owned();
    let text = doc.to_string();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subrecords (student_id, collection, record_id, doc)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (student_id, collection, record_id)
           DO UPDATE SET doc = excluded.doc",
          rusqlite::params![sid, collection, rid, text],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| backend_error("sub_put", student_id, e))?;
    Ok(())
  }

  async fn sub_delete(
    &self,
    student_id: &str,
    collection: &'static str,
    record_id: &str,
  ) -> Result<()> {
    let sid = student_id.to_owned();
    let rid = record_id.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM subrecords
           WHERE student_id = ?1 AND collection = ?2 AND record_id = ?3",
          rusqlite::params![sid, collection, rid],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| backend_error("sub_delete", student_id, e))?;
    Ok(())
  }

  /// Enumerate and normalize one sub-record collection, sorted canonically.
  /// The sub-record row id wins over any id embedded in the document.
  async fn sub_records<T: SubRecord>(
    &self,
    student_id: &str,
    collection: &'static str,
    normalize_one: fn(&Value, Option<&str>) -> Option<T>,
  ) -> Result<Vec<T>> {
    let rows = self.sub_list(student_id, collection).await?;
    let mut records: Vec<T> = rows
      .iter()
      .filter_map(|(record_id, doc)| normalize_one(doc, Some(record_id)))
      .collect();
    records.sort_by(T::compare);
    Ok(records)
  }

  // ── Reconciled views ──────────────────────────────────────────────────────

  async fn merged<T: SubRecord>(
    &self,
    student_id: &str,
    collection: &'static str,
    inline: Vec<T>,
    normalize_one: fn(&Value, Option<&str>) -> Option<T>,
  ) -> Result<Vec<T>> {
    let subrecords =
      self.sub_records(student_id, collection, normalize_one).await?;
    Ok(reconcile(inline, subrecords))
  }

  async fn merged_timeline(
    &self,
    student_id: &str,
    doc: &Value,
  ) -> Result<Vec<TimelineEvent>> {
    let inline = normalize_timeline_array(doc.get("timeline"));
    self.merged(student_id, TIMELINE, inline, normalize_timeline_event).await
  }

  async fn merged_communications(
    &self,
    student_id: &str,
    doc: &Value,
  ) -> Result<Vec<CommunicationEntry>> {
    let inline = normalize_communications_array(doc.get("communications"));
    self
      .merged(student_id, COMMUNICATIONS, inline, normalize_communication)
      .await
  }

  async fn merged_notes(
    &self,
    student_id: &str,
    doc: &Value,
  ) -> Result<Vec<Note>> {
    let inline = normalize_notes_array(doc.get("notes"));
    self.merged(student_id, NOTES, inline, normalize_note).await
  }

  async fn merged_reminders(
    &self,
    student_id: &str,
    doc: &Value,
  ) -> Result<Vec<Reminder>> {
    let inline = normalize_reminders_array(doc.get("reminders"));
    self.merged(student_id, REMINDERS, inline, normalize_reminder).await
  }

  // ── Aggregate assembly ────────────────────────────────────────────────────

  /// Build the full aggregate from a parent document. The inline snapshot
  /// satisfies reads; the subcollection is consulted only for collections
  /// whose inline array is empty (documents that predate the writeback).
  async fn assemble_student(
    &self,
    student_id: &str,
    doc: &Value,
  ) -> Result<Student> {
    let mut student = normalize_student(student_id, doc);
    if student.timeline.is_empty() {
      student.timeline = self
        .sub_records(student_id, TIMELINE, normalize_timeline_event)
        .await?;
    }
    if student.communications.is_empty() {
      student.communications = self
        .sub_records(student_id, COMMUNICATIONS, normalize_communication)
        .await?;
    }
    if student.notes.is_empty() {
      student.notes =
        self.sub_records(student_id, NOTES, normalize_note).await?;
    }
    if student.reminders.is_empty() {
      student.reminders =
        self.sub_records(student_id, REMINDERS, normalize_reminder).await?;
    }
    Ok(student)
  }

  /// Re-fetch the mutated aggregate, then push a full fresh snapshot to any
  /// subscribers. A snapshot assembly failure is reported to error listeners
  /// without failing the mutation itself.
  async fn fetch_and_publish(&self, student_id: &str) -> Result<Student> {
    let student = self.get_student(student_id).await?;
    if !self.subscribers.is_empty() {
      match self.list_students().await {
        Ok(snapshot) => self.subscribers.notify(&snapshot),
        Err(error) => self.subscribers.notify_error(&error),
      }
    }
    Ok(student)
  }
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_students(&self) -> Result<Vec<Student>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT student_id, doc FROM students")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(|e| backend_error("list_students", "", e))?;

    let mut students = Vec::with_capacity(rows.len());
    for (student_id, text) in rows {
      let doc = parse_doc(&text);
      students.push(self.assemble_student(&student_id, &doc).await?);
    }
    students.sort_by(by_name_asc);
    Ok(students)
  }

  async fn get_student(&self, student_id: &str) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;
    self.assemble_student(student_id, &doc).await
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  async fn create_note(
    &self,
    student_id: &str,
    input: NewNote,
  ) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;

    let note = Note {
      id:         create_id(),
      author:     input.author,
      date:       Utc::now(),
      content:    input.content,
      updated_at: None,
    };
    self
      .sub_put(student_id, NOTES, &note.id, &serde_json::to_value(&note)?)
      .await?;

    let notes = self.merged_notes(student_id, &doc).await?;
    let mut updates = Map::new();
    updates.insert("notes".to_owned(), serde_json::to_value(&notes)?);
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  async fn update_note(
    &self,
    student_id: &str,
    note_id: &str,
    content: String,
  ) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;

    let notes = self.merged_notes(student_id, &doc).await?;
    let mut note = notes
      .into_iter()
      .find(|n| n.id == note_id)
      .ok_or_else(|| Error::NoteNotFound {
        student_id: student_id.to_owned(),
        note_id:    note_id.to_owned(),
      })?;
    note.content = content;
    note.updated_at = Some(Utc::now());
    // Writing the sub-record also upgrades inline-only legacy notes.
    self
      .sub_put(student_id, NOTES, note_id, &serde_json::to_value(&note)?)
      .await?;

    let notes = self.merged_notes(student_id, &doc).await?;
    let mut updates = Map::new();
    updates.insert("notes".to_owned(), serde_json::to_value(&notes)?);
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  async fn delete_note(
    &self,
    student_id: &str,
    note_id: &str,
  ) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;

    let notes = self.merged_notes(student_id, &doc).await?;
    if !notes.iter().any(|n| n.id == note_id) {
      return Err(Error::NoteNotFound {
        student_id: student_id.to_owned(),
        note_id:    note_id.to_owned(),
      });
    }
    self.sub_delete(student_id, NOTES, note_id).await?;

    // Filter the inline copy too, so a stale snapshot cannot resurrect the
    // deleted note through the merge.
    let remaining: Vec<Note> = self
      .merged_notes(student_id, &doc)
      .await?
      .into_iter()
      .filter(|n| n.id != note_id)
      .collect();
    let mut updates = Map::new();
    updates.insert("notes".to_owned(), serde_json::to_value(&remaining)?);
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  // ── Communications ────────────────────────────────────────────────────────

  async fn log_communication(
    &self,
    student_id: &str,
    input: NewCommunication,
  ) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;
    let now = Utc::now();

    let entry = CommunicationEntry {
      id:      create_id(),
      channel: input.channel,
      subject: input.subject.clone(),
      date:    now,
      owner:   input.owner,
      notes:   input.notes,
    };
    let event = TimelineEvent {
      id:      create_id(),
      date:    now,
      kind:    TimelineEventKind::Message,
      label:   outreach_label(input.channel),
      details: input.subject,
    };
    self
      .sub_put(
        student_id,
        COMMUNICATIONS,
        &entry.id,
        &serde_json::to_value(&entry)?,
      )
      .await?;
    self
      .sub_put(student_id, TIMELINE, &event.id, &serde_json::to_value(&event)?)
      .await?;

    let communications = self.merged_communications(student_id, &doc).await?;
    let timeline = self.merged_timeline(student_id, &doc).await?;
    let mut updates = Map::new();
    updates.insert(
      "communications".to_owned(),
      serde_json::to_value(&communications)?,
    );
    updates.insert("timeline".to_owned(), serde_json::to_value(&timeline)?);
    updates.insert("lastContacted".to_owned(), json!(now));
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  async fn trigger_follow_up(&self, student_id: &str) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;
    let now = Utc::now();

    let entry = CommunicationEntry {
      id:      create_id(),
      channel: CommunicationChannel::Email,
      subject: FOLLOW_UP_SUBJECT.to_owned(),
      date:    now,
      owner:   FOLLOW_UP_OWNER.to_owned(),
      notes:   FOLLOW_UP_NOTES.to_owned(),
    };
    let event = TimelineEvent {
      id:      create_id(),
      date:    now,
      kind:    TimelineEventKind::Message,
      label:   FOLLOW_UP_LABEL.to_owned(),
      details: FOLLOW_UP_DETAILS.to_owned(),
    };
    self
      .sub_put(
        student_id,
        COMMUNICATIONS,
        &entry.id,
        &serde_json::to_value(&entry)?,
      )
      .await?;
    self
      .sub_put(student_id, TIMELINE, &event.id, &serde_json::to_value(&event)?)
      .await?;

    let communications = self.merged_communications(student_id, &doc).await?;
    let timeline = self.merged_timeline(student_id, &doc).await?;
    let mut updates = Map::new();
    updates.insert(
      "communications".to_owned(),
      serde_json::to_value(&communications)?,
    );
    updates.insert("timeline".to_owned(), serde_json::to_value(&timeline)?);
    updates.insert("lastContacted".to_owned(), json!(now));
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  // ── Reminders ─────────────────────────────────────────────────────────────

  async fn create_reminder(
    &self,
    student_id: &str,
    input: NewReminder,
  ) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;

    let reminder = Reminder {
      id:          create_id(),
      due_date:    input.due_date,
      description: input.description,
      owner:       input.owner,
      completed:   false,
    };
    self
      .sub_put(
        student_id,
        REMINDERS,
        &reminder.id,
        &serde_json::to_value(&reminder)?,
      )
      .await?;

    let reminders = self.merged_reminders(student_id, &doc).await?;
    let mut updates = Map::new();
    updates.insert("reminders".to_owned(), serde_json::to_value(&reminders)?);
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  async fn toggle_reminder(
    &self,
    student_id: &str,
    reminder_id: &str,
    completed: bool,
  ) -> Result<Student> {
    let doc = self.read_required_doc(student_id).await?;

    let reminders = self.merged_reminders(student_id, &doc).await?;
    let mut reminder = reminders
      .into_iter()
      .find(|r| r.id == reminder_id)
      .ok_or_else(|| Error::ReminderNotFound {
        student_id:  student_id.to_owned(),
        reminder_id: reminder_id.to_owned(),
      })?;
    reminder.completed = completed;
    self
      .sub_put(
        student_id,
        REMINDERS,
        reminder_id,
        &serde_json::to_value(&reminder)?,
      )
      .await?;

    let reminders = self.merged_reminders(student_id, &doc).await?;
    let mut updates = Map::new();
    updates.insert("reminders".to_owned(), serde_json::to_value(&reminders)?);
    self.write_back(student_id, updates).await?;

    self.fetch_and_publish(student_id).await
  }

  // ── Live updates ──────────────────────────────────────────────────────────

  fn subscribe(
    &self,
    on_data: StudentsListener,
    on_error: Option<StoreErrorListener>,
  ) -> Subscription {
    self.subscribers.subscribe(on_data, on_error)
  }
}
