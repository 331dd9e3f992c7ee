//! In-process fallback backend for the Cairn student store.
//!
//! Used when no durable-store connection parameters are configured. Holds one
//! shared map from student id to [`Student`] and mutates it synchronously and
//! atomically per call — there is no suspension point inside a mutation, so
//! concurrent mutations cannot interleave and there is no inline/subcollection
//! split to reconcile.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;

use cairn_core::{
  Error, Result,
  normalize::create_id,
  record::{
    CommunicationChannel, CommunicationEntry, Note, Reminder, TimelineEvent,
    TimelineEventKind,
  },
  store::{
    FOLLOW_UP_DETAILS, FOLLOW_UP_LABEL, FOLLOW_UP_NOTES, FOLLOW_UP_OWNER,
    FOLLOW_UP_SUBJECT, NewCommunication, NewNote, NewReminder,
    StoreErrorListener, StudentStore, StudentsListener, SubscriberSet,
    Subscription, outreach_label,
  },
  student::{Student, by_name_asc},
};

/// The fallback store. Cheap to share behind an `Arc`.
pub struct MemoryStore {
  students:    Mutex<HashMap<String, Student>>,
  subscribers: SubscriberSet,
}

impl MemoryStore {
  /// Build a store pre-populated with `initial` students. Collection sort
  /// invariants are restored up front so loose seed data is acceptable.
  pub fn new(initial: Vec<Student>) -> Self {
    let students = initial
      .into_iter()
      .map(|mut s| {
        s.sort_collections();
        (s.id.clone(), s)
      })
      .collect();
    Self {
      students:    Mutex::new(students),
      subscribers: SubscriberSet::new(),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Student>> {
    self.students.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn snapshot(map: &HashMap<String, Student>) -> Vec<Student> {
    let mut students: Vec<Student> = map.values().cloned().collect();
    students.sort_by(by_name_asc);
    students
  }

  /// Apply `mutate` to one student under the lock, restore sort invariants,
  /// and notify subscribers with a fresh full snapshot (outside the lock).
  fn mutate(
    &self,
    student_id: &str,
    mutate: impl FnOnce(&mut Student) -> Result<()>,
  ) -> Result<Student> {
    let (refreshed, snapshot) = {
      let mut map = self.lock();
      let student = map
        .get_mut(student_id)
        .ok_or_else(|| Error::StudentNotFound(student_id.to_owned()))?;
      mutate(student)?;
      student.sort_collections();
      let refreshed = student.clone();
      (refreshed, Self::snapshot(&map))
    };

    self.subscribers.notify(&snapshot);
    Ok(refreshed)
  }
}

impl StudentStore for MemoryStore {
  async fn list_students(&self) -> Result<Vec<Student>> {
    Ok(Self::snapshot(&self.lock()))
  }

  async fn get_student(&self, student_id: &str) -> Result<Student> {
    self
      .lock()
      .get(student_id)
      .cloned()
      .ok_or_else(|| Error::StudentNotFound(student_id.to_owned()))
  }

  async fn create_note(
    &self,
    student_id: &str,
    input: NewNote,
  ) -> Result<Student> {
    self.mutate(student_id, |student| {
      student.notes.push(Note {
        id:         create_id(),
        author:     input.author,
        date:       Utc::now(),
        content:    input.content,
        updated_at: None,
      });
      Ok(())
    })
  }

  async fn update_note(
    &self,
    student_id: &str,
    note_id: &str,
    content: String,
  ) -> Result<Student> {
    self.mutate(student_id, |student| {
      let note = student
        .notes
        .iter_mut()
        .find(|n| n.id == note_id)
        .ok_or_else(|| Error::NoteNotFound {
          student_id: student_id.to_owned(),
          note_id:    note_id.to_owned(),
        })?;
      note.content = content;
      note.updated_at = Some(Utc::now());
      Ok(())
    })
  }

  async fn delete_note(
    &self,
    student_id: &str,
    note_id: &str,
  ) -> Result<Student> {
    self.mutate(student_id, |student| {
      let before = student.notes.len();
      student.notes.retain(|n| n.id != note_id);
      if student.notes.len() == before {
        return Err(Error::NoteNotFound {
          student_id: student_id.to_owned(),
          note_id:    note_id.to_owned(),
        });
      }
      Ok(())
    })
  }

  async fn log_communication(
    &self,
    student_id: &str,
    input: NewCommunication,
  ) -> Result<Student> {
    let now = Utc::now();
    self.mutate(student_id, |student| {
      student.communications.push(CommunicationEntry {
        id:      create_id(),
        channel: input.channel,
        subject: input.subject.clone(),
        date:    now,
        owner:   input.owner,
        notes:   input.notes,
      });
      student.timeline.push(TimelineEvent {
        id:      create_id(),
        date:    now,
        kind:    TimelineEventKind::Message,
        label:   outreach_label(input.channel),
        details: input.subject,
      });
      student.last_contacted = now;
      Ok(())
    })
  }

  async fn trigger_follow_up(&self, student_id: &str) -> Result<Student> {
    let now = Utc::now();
    self.mutate(student_id, |student| {
      student.communications.push(CommunicationEntry {
        id:      create_id(),
        channel: CommunicationChannel::Email,
        subject: FOLLOW_UP_SUBJECT.to_owned(),
        date:    now,
        owner:   FOLLOW_UP_OWNER.to_owned(),
        notes:   FOLLOW_UP_NOTES.to_owned(),
      });
      student.timeline.push(TimelineEvent {
        id:      create_id(),
        date:    now,
        kind:    TimelineEventKind::Message,
        label:   FOLLOW_UP_LABEL.to_owned(),
        details: FOLLOW_UP_DETAILS.to_owned(),
      });
      student.last_contacted = now;
      Ok(())
    })
  }

  async fn create_reminder(
    &self,
    student_id: &str,
    input: NewReminder,
  ) -> Result<Student> {
    self.mutate(student_id, |student| {
      student.reminders.push(Reminder {
        id:          create_id(),
        due_date:    input.due_date,
        description: input.description,
        owner:       input.owner,
        completed:   false,
      });
      Ok(())
    })
  }

  async fn toggle_reminder(
    &self,
    student_id: &str,
    reminder_id: &str,
    completed: bool,
  ) -> Result<Student> {
    self.mutate(student_id, |student| {
      let reminder = student
        .reminders
        .iter_mut()
        .find(|r| r.id == reminder_id)
        .ok_or_else(|| Error::ReminderNotFound {
          student_id:  student_id.to_owned(),
          reminder_id: reminder_id.to_owned(),
        })?;
      reminder.completed = completed;
      Ok(())
    })
  }

  fn subscribe(
    &self,
    on_data: StudentsListener,
    on_error: Option<StoreErrorListener>,
  ) -> Subscription {
    self.subscribers.subscribe(on_data, on_error)
  }
}

#[cfg(test)]
mod tests;
