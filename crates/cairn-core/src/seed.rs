//! Demo dataset used to seed an empty store.
//!
//! Timestamps are anchored to the current runtime so the relative spacing
//! between events ("3 days ago", "due in 2 days") stays realistic regardless
//! of when the server is started.

use chrono::{DateTime, Duration, Utc};

use crate::{
  record::{
    ApplicationStatus, CommunicationChannel, CommunicationEntry, Note,
    Reminder, TimelineEvent, TimelineEventKind,
  },
  student::Student,
};

fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
  now - Duration::days(days)
}

fn days_ahead(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
  now + Duration::days(days)
}

/// The seed students. `s-aanya` deliberately starts with exactly two notes.
pub fn demo_students() -> Vec<Student> {
  let now = Utc::now();

  let mut students = vec![
    Student {
      id: "s-aanya".to_owned(),
      name: "Aanya Patel".to_owned(),
      email: "aanya.patel@example.com".to_owned(),
      phone: "+91 98200 12345".to_owned(),
      country: "India".to_owned(),
      grade: "11".to_owned(),
      status: ApplicationStatus::Shortlisting,
      last_active: days_ago(now, 3),
      last_contacted: days_ago(now, 3),
      high_intent: true,
      needs_essay_help: true,
      program_interests: vec![
        "Computer Science".to_owned(),
        "Data Science".to_owned(),
      ],
      tags: vec![
        "STEM".to_owned(),
        "US Universities".to_owned(),
        "Scholarship Focus".to_owned(),
      ],
      engagement_score: 82,
      essay_drafts: 1,
      documents_uploaded: 4,
      open_applications: 3,
      timeline: vec![
        TimelineEvent {
          id: "ev-aanya-1".to_owned(),
          date: days_ago(now, 3),
          kind: TimelineEventKind::Activity,
          label: "Completed campus fit quiz".to_owned(),
          details: "Scored highly for collaborative learning environments \
                    and mid-sized campuses."
            .to_owned(),
        },
        TimelineEvent {
          id: "ev-aanya-2".to_owned(),
          date: days_ago(now, 4),
          kind: TimelineEventKind::Document,
          label: "Uploaded transcript".to_owned(),
          details: "CBSE grade 10 transcript with 94% aggregate.".to_owned(),
        },
        TimelineEvent {
          id: "ev-aanya-3".to_owned(),
          date: days_ago(now, 9),
          kind: TimelineEventKind::Milestone,
          label: "Shortlisted first universities".to_owned(),
          details: "Added UC Davis, Georgia Tech, and Purdue to shortlist."
            .to_owned(),
        },
      ],
      communications: vec![
        CommunicationEntry {
          id: "comm-aanya-1".to_owned(),
          channel: CommunicationChannel::Email,
          subject: "Scholarship deadlines overview".to_owned(),
          date: days_ago(now, 3),
          owner: "Priya Nair".to_owned(),
          notes: "Shared merit scholarship matrix for shortlisted schools."
            .to_owned(),
        },
        CommunicationEntry {
          id: "comm-aanya-2".to_owned(),
          channel: CommunicationChannel::WhatsApp,
          subject: "Essay brainstorm check-in".to_owned(),
          date: days_ago(now, 6),
          owner: "Priya Nair".to_owned(),
          notes: "Student prefers weekend calls.".to_owned(),
        },
      ],
      notes: vec![
        Note {
          id: "note-aanya-1".to_owned(),
          author: "Priya Nair".to_owned(),
          date: days_ago(now, 5),
          content: "Strong quantitative profile; needs structure for the \
                    personal essay."
            .to_owned(),
          updated_at: None,
        },
        Note {
          id: "note-aanya-2".to_owned(),
          author: "Admissions Team".to_owned(),
          date: days_ago(now, 11),
          content: "Parents keen on scholarship-heavy options.".to_owned(),
          updated_at: None,
        },
      ],
      reminders: vec![
        Reminder {
          id: "rem-aanya-1".to_owned(),
          due_date: days_ahead(now, 2),
          description: "Review first essay draft".to_owned(),
          owner: "Priya Nair".to_owned(),
          completed: false,
        },
        Reminder {
          id: "rem-aanya-2".to_owned(),
          due_date: days_ahead(now, 7),
          description: "Send Georgia Tech program comparison".to_owned(),
          owner: "Advising Team".to_owned(),
          completed: false,
        },
      ],
      ai_summary: "Aanya is a high-intent shortlisting-stage student with a \
                   strong STEM profile who needs essay support."
        .to_owned(),
    },
    Student {
      id: "s-mateo".to_owned(),
      name: "Mateo Alvarez".to_owned(),
      email: "mateo.alvarez@example.com".to_owned(),
      phone: "+52 55 1234 5678".to_owned(),
      country: "Mexico".to_owned(),
      grade: "12".to_owned(),
      status: ApplicationStatus::Applying,
      last_active: days_ago(now, 1),
      last_contacted: days_ago(now, 8),
      high_intent: false,
      needs_essay_help: false,
      program_interests: vec!["Mechanical Engineering".to_owned()],
      tags: vec!["Canada".to_owned(), "Co-op Programs".to_owned()],
      engagement_score: 58,
      essay_drafts: 2,
      documents_uploaded: 6,
      open_applications: 2,
      timeline: vec![TimelineEvent {
        id: "ev-mateo-1".to_owned(),
        date: days_ago(now, 1),
        kind: TimelineEventKind::Document,
        label: "Uploaded recommendation letter".to_owned(),
        details: "Physics teacher recommendation received.".to_owned(),
      }],
      communications: vec![CommunicationEntry {
        id: "comm-mateo-1".to_owned(),
        channel: CommunicationChannel::Call,
        subject: "Application timeline review".to_owned(),
        date: days_ago(now, 8),
        owner: "Advising Team".to_owned(),
        notes: "Walked through Waterloo and UBC deadlines.".to_owned(),
      }],
      notes: vec![Note {
        id: "note-mateo-1".to_owned(),
        author: "Advising Team".to_owned(),
        date: days_ago(now, 8),
        content: "Engagement dipping; schedule a check-in before deadlines."
          .to_owned(),
        updated_at: None,
      }],
      reminders: vec![Reminder {
        id: "rem-mateo-1".to_owned(),
        due_date: days_ahead(now, 1),
        description: "Confirm UBC supplemental essay topic".to_owned(),
        owner: "Advising Team".to_owned(),
        completed: false,
      }],
      ai_summary: String::new(),
    },
  ];

  for student in &mut students {
    student.sort_collections();
  }
  students
}
