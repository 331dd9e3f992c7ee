//! Behavioural tests for the SQLite store, covering the writeback protocol,
//! legacy inline-only documents, and reconciliation against stale snapshots.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use cairn_core::{
  Error,
  record::CommunicationChannel,
  seed::demo_students,
  store::{NewCommunication, NewNote, NewReminder, StudentStore},
};

use crate::SqliteStore;

// Seed students land as inline-only parent documents, the same shape older
// writers produced before the subrecords table existed.
async fn store() -> SqliteStore {
  let store = SqliteStore::open_in_memory().await.unwrap();
  for student in demo_students() {
    store.insert_student(&student).await.unwrap();
  }
  store
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_students_sorted_by_name() {
  let s = store().await;
  let students = s.list_students().await.unwrap();
  assert_eq!(students.len(), 2);
  assert_eq!(students[0].name, "Aanya Patel");
  assert_eq!(students[1].name, "Mateo Alvarez");
}

#[tokio::test]
async fn get_student_reads_inline_snapshot() {
  let s = store().await;
  let student = s.get_student("s-aanya").await.unwrap();
  assert_eq!(student.notes.len(), 2);
  assert_eq!(student.timeline.len(), 3);
  assert_eq!(student.status.as_str(), "Shortlisting");
}

#[tokio::test]
async fn get_student_missing_is_not_found() {
  let s = store().await;
  let err = s.get_student("s-nobody").await.unwrap_err();
  assert!(matches!(err, Error::StudentNotFound(_)));
  assert!(err.is_not_found());
}

// ─── Notes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_note_writes_back_refreshed_inline_snapshot() {
  let s = store().await;
  let before = s.get_student("s-aanya").await.unwrap();
  assert_eq!(before.notes.len(), 2);

  let after = s
    .create_note("s-aanya", NewNote {
      author:  "Jane Doe".to_owned(),
      content: "Called today".to_owned(),
    })
    .await
    .unwrap();
  assert_eq!(after.notes.len(), 3);

  // The parent document's inline array was refreshed by the writeback.
  let doc = s.read_doc("s-aanya").await.unwrap().unwrap();
  assert_eq!(doc["notes"].as_array().unwrap().len(), 3);
  assert!(doc["updatedAt"].is_string());

  let refetched = s.get_student("s-aanya").await.unwrap();
  assert_eq!(refetched.notes.len(), 3);
}

#[tokio::test]
async fn update_note_upgrades_legacy_inline_note() {
  let s = store().await;
  // note-aanya-1 exists only inline; the update must still find it, write
  // it as a sub-record, and persist the new content.
  let updated = s
    .update_note("s-aanya", "note-aanya-1", "Revised plan".to_owned())
    .await
    .unwrap();
  let note = updated.notes.iter().find(|n| n.id == "note-aanya-1").unwrap();
  assert_eq!(note.content, "Revised plan");
  assert!(note.updated_at.is_some());

  let refetched = s.get_student("s-aanya").await.unwrap();
  let note =
    refetched.notes.iter().find(|n| n.id == "note-aanya-1").unwrap();
  assert_eq!(note.content, "Revised plan");
}

#[tokio::test]
async fn delete_note_does_not_resurrect_through_the_merge() {
  let s = store().await;
  let after = s.delete_note("s-aanya", "note-aanya-2").await.unwrap();
  assert!(after.notes.iter().all(|n| n.id != "note-aanya-2"));

  // Gone from the inline snapshot as well, not just the subrecords table.
  let doc = s.read_doc("s-aanya").await.unwrap().unwrap();
  let inline = doc["notes"].as_array().unwrap();
  assert!(inline.iter().all(|n| n["id"] != "note-aanya-2"));

  let refetched = s.get_student("s-aanya").await.unwrap();
  assert!(refetched.notes.iter().all(|n| n.id != "note-aanya-2"));
}

#[tokio::test]
async fn note_mutations_on_missing_targets_are_not_found() {
  let s = store().await;

  let err = s
    .update_note("missing-student", "note-aanya-1", "x".to_owned())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StudentNotFound(_)));

  let err = s
    .update_note("s-aanya", "missing-note", "x".to_owned())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoteNotFound { .. }));

  let err = s.delete_note("s-aanya", "missing-note").await.unwrap_err();
  assert!(matches!(err, Error::NoteNotFound { .. }));
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn mutations_prefer_subrecords_over_stale_inline_copies() {
  let s = store().await;
  s.update_note("s-aanya", "note-aanya-1", "authoritative".to_owned())
    .await
    .unwrap();

  // Clobber the parent document with a stale inline copy of the note.
  let mut doc = s.read_doc("s-aanya").await.unwrap().unwrap();
  for note in doc["notes"].as_array_mut().unwrap() {
    if note["id"] == "note-aanya-1" {
      note["content"] = "stale".into();
    }
  }
  s.put_doc("s-aanya", &doc).await.unwrap();

  // Any mutation re-merges both sides; the sub-record wins the id conflict.
  let after = s.trigger_follow_up("s-aanya").await.unwrap();
  let note = after.notes.iter().find(|n| n.id == "note-aanya-1").unwrap();
  assert_eq!(note.content, "authoritative");
}

// ─── Communications ──────────────────────────────────────────────────────────

#[tokio::test]
async fn log_communication_records_entry_timeline_and_last_contacted() {
  let s = store().await;
  let before = s.get_student("s-aanya").await.unwrap();

  let after = s
    .log_communication("s-aanya", NewCommunication {
      channel: CommunicationChannel::WhatsApp,
      subject: "Checked in on essays".to_owned(),
      notes:   "Student is on track.".to_owned(),
      owner:   "Jane Doe".to_owned(),
    })
    .await
    .unwrap();

  assert_eq!(after.communications.len(), before.communications.len() + 1);
  assert_eq!(after.timeline.len(), before.timeline.len() + 1);
  assert_eq!(after.communications[0].channel, CommunicationChannel::WhatsApp);
  assert_eq!(after.timeline[0].label, "Logged whatsapp outreach");
  assert!(after.last_contacted > before.last_contacted);
}

#[tokio::test]
async fn trigger_follow_up_records_fixed_synthetic_entries() {
  let s = store().await;
  let after = s.trigger_follow_up("s-mateo").await.unwrap();

  let comm = &after.communications[0];
  assert_eq!(comm.channel, CommunicationChannel::Email);
  assert_eq!(comm.subject, "Automated follow-up email scheduled");
  assert_eq!(comm.owner, "Workflow Automation");
  assert_eq!(after.timeline[0].label, "Follow-up email triggered");
}

// ─── Reminders ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_reminder_starts_incomplete_and_sorts_by_due_date() {
  let s = store().await;
  let after = s
    .create_reminder("s-aanya", NewReminder {
      due_date:    Utc::now() + Duration::hours(1),
      description: "Send checklist".to_owned(),
      owner:       "Jane Doe".to_owned(),
    })
    .await
    .unwrap();

  assert_eq!(after.reminders[0].description, "Send checklist");
  assert!(!after.reminders[0].completed);
  for pair in after.reminders.windows(2) {
    assert!(pair[0].due_date <= pair[1].due_date);
  }
}

#[tokio::test]
async fn toggle_reminder_upgrades_legacy_inline_reminder() {
  let s = store().await;
  let after =
    s.toggle_reminder("s-aanya", "rem-aanya-1", true).await.unwrap();
  let reminder =
    after.reminders.iter().find(|r| r.id == "rem-aanya-1").unwrap();
  assert!(reminder.completed);

  let refetched = s.get_student("s-aanya").await.unwrap();
  let reminder =
    refetched.reminders.iter().find(|r| r.id == "rem-aanya-1").unwrap();
  assert!(reminder.completed);

  let err = s
    .toggle_reminder("s-aanya", "missing-reminder", true)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ReminderNotFound { .. }));
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_receive_full_snapshots_after_mutations() {
  let s = store().await;
  let seen = Arc::new(Mutex::new(Vec::new()));

  let subscription = {
    let seen = seen.clone();
    s.subscribe(
      Arc::new(move |students| {
        seen.lock().unwrap().push(students.len());
      }),
      None,
    )
  };

  s.trigger_follow_up("s-aanya").await.unwrap();
  assert_eq!(seen.lock().unwrap().as_slice(), &[2]);

  subscription.unsubscribe();
  s.trigger_follow_up("s-mateo").await.unwrap();
  assert_eq!(seen.lock().unwrap().as_slice(), &[2]);
}
