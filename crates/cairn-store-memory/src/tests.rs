//! Behavioural tests for the fallback store, including the canonical
//! advising scenario from the seed dataset.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use cairn_core::{
  Error,
  record::CommunicationChannel,
  seed::demo_students,
  store::{NewCommunication, NewNote, NewReminder, StudentStore},
};

use crate::MemoryStore;

fn store() -> MemoryStore {
  MemoryStore::new(demo_students())
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_students_sorted_by_name() {
  let s = store();
  let students = s.list_students().await.unwrap();
  assert_eq!(students.len(), 2);
  assert_eq!(students[0].name, "Aanya Patel");
  assert_eq!(students[1].name, "Mateo Alvarez");
}

#[tokio::test]
async fn get_student_missing_is_not_found() {
  let s = store();
  let err = s.get_student("s-nobody").await.unwrap_err();
  assert!(matches!(err, Error::StudentNotFound(_)));
  assert!(err.is_not_found());
}

// ─── Notes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_note_appends_exactly_one_note() {
  let s = store();
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
  let new_note = after
    .notes
    .iter()
    .find(|n| !before.notes.iter().any(|old| old.id == n.id))
    .unwrap();
  assert_eq!(new_note.author, "Jane Doe");
  assert_eq!(new_note.content, "Called today");
  assert!(!new_note.id.is_empty());

  // A subsequent fetch shows the same state.
  let refetched = s.get_student("s-aanya").await.unwrap();
  assert_eq!(refetched.notes.len(), 3);
}

#[tokio::test]
async fn update_note_replaces_content_and_stamps_updated_at() {
  let s = store();
  let updated = s
    .update_note("s-aanya", "note-aanya-1", "Revised plan".to_owned())
    .await
    .unwrap();
  let note = updated.notes.iter().find(|n| n.id == "note-aanya-1").unwrap();
  assert_eq!(note.content, "Revised plan");
  assert!(note.updated_at.is_some());
}

#[tokio::test]
async fn delete_note_removes_it_from_aggregate_and_refetch() {
  let s = store();
  let after = s.delete_note("s-aanya", "note-aanya-2").await.unwrap();
  assert!(after.notes.iter().all(|n| n.id != "note-aanya-2"));

  let refetched = s.get_student("s-aanya").await.unwrap();
  assert!(refetched.notes.iter().all(|n| n.id != "note-aanya-2"));
}

#[tokio::test]
async fn note_mutations_on_missing_targets_are_not_found() {
  let s = store();

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

// ─── Communications ──────────────────────────────────────────────────────────

#[tokio::test]
async fn log_communication_records_entry_timeline_and_last_contacted() {
  let s = store();
  let before = s.get_student("s-aanya").await.unwrap();

  let after = s
    .log_communication("s-aanya", NewCommunication {
      channel: CommunicationChannel::Call,
      subject: "Intro call".to_owned(),
      notes:   String::new(),
      owner:   "Jane Doe".to_owned(),
    })
    .await
    .unwrap();

  assert_eq!(after.communications.len(), before.communications.len() + 1);
  assert_eq!(after.timeline.len(), before.timeline.len() + 1);

  // Collections sort newest first, so both land at the head.
  assert_eq!(after.communications[0].channel, CommunicationChannel::Call);
  assert_eq!(after.communications[0].subject, "Intro call");
  assert_eq!(after.timeline[0].label, "Logged call outreach");
  assert_eq!(after.timeline[0].details, "Intro call");
  assert!(after.last_contacted > before.last_contacted);
  assert_eq!(after.last_contacted, after.communications[0].date);
}

#[tokio::test]
async fn trigger_follow_up_records_fixed_synthetic_entries() {
  let s = store();
  let after = s.trigger_follow_up("s-aanya").await.unwrap();

  let comm = &after.communications[0];
  assert_eq!(comm.channel, CommunicationChannel::Email);
  assert_eq!(comm.subject, "Automated follow-up email scheduled");
  assert_eq!(comm.owner, "Workflow Automation");
  assert_eq!(after.timeline[0].label, "Follow-up email triggered");
}

// ─── Reminders ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_reminder_starts_incomplete_and_sorts_by_due_date() {
  let s = store();
  let due = chrono::Utc::now() + chrono::Duration::hours(1);
  let after = s
    .create_reminder("s-aanya", NewReminder {
      due_date:    due,
      description: "Send checklist".to_owned(),
      owner:       "Jane Doe".to_owned(),
    })
    .await
    .unwrap();

  // Soonest-due first; the new reminder is due before the seeded ones.
  assert_eq!(after.reminders[0].description, "Send checklist");
  assert!(!after.reminders[0].completed);
  for pair in after.reminders.windows(2) {
    assert!(pair[0].due_date <= pair[1].due_date);
  }
}

#[tokio::test]
async fn toggle_reminder_sets_flag_and_missing_id_is_not_found() {
  let s = store();
  let after = s.toggle_reminder("s-aanya", "rem-aanya-1", true).await.unwrap();
  let reminder = after.reminders.iter().find(|r| r.id == "rem-aanya-1").unwrap();
  assert!(reminder.completed);

  let err = s
    .toggle_reminder("s-aanya", "missing-reminder", true)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ReminderNotFound { .. }));
  assert!(err.is_not_found());
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_receive_full_snapshots_until_unsubscribed() {
  let s = store();

  let first_calls = Arc::new(AtomicUsize::new(0));
  let second_seen = Arc::new(Mutex::new(Vec::new()));

  let first = {
    let calls = first_calls.clone();
    s.subscribe(
      Arc::new(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
      }),
      None,
    )
  };
  let _second = {
    let seen = second_seen.clone();
    s.subscribe(
      Arc::new(move |students| {
        seen.lock().unwrap().push(students.len());
      }),
      None,
    )
  };

  s.trigger_follow_up("s-aanya").await.unwrap();
  assert_eq!(first_calls.load(Ordering::SeqCst), 1);
  assert_eq!(second_seen.lock().unwrap().as_slice(), &[2]);

  first.unsubscribe();

  s.trigger_follow_up("s-mateo").await.unwrap();
  // The dropped subscription is silent; the surviving one still fires.
  assert_eq!(first_calls.load(Ordering::SeqCst), 1);
  assert_eq!(second_seen.lock().unwrap().as_slice(), &[2, 2]);
}
