//! Prompt assembly for the counselor briefing.
//!
//! The prompt is a fixed sequence of sections separated by blank lines:
//! instructions, a fact sheet, the four capped collections, and a closing
//! directive asking for prose rather than bullet points.

use chrono::{DateTime, Utc};

use cairn_core::record::{CommunicationEntry, Note, Reminder, TimelineEvent};

use crate::payload::SummaryPayload;

const INSTRUCTIONS: &str = "You are assisting an admissions counselor. \
Summarize the student's current situation in 3-4 sentences, highlighting \
intent, risks, and the next recommended actions.";

const CLOSING: &str = "Respond with a cohesive narrative paragraph in \
natural language without bullet points.";

fn format_date(date: DateTime<Utc>) -> String {
  date.format("%b %-d, %Y").to_string()
}

fn yes_no(value: bool) -> &'static str {
  if value { "Yes" } else { "No" }
}

fn capitalize(value: &str) -> String {
  let mut chars = value.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
  if value.is_empty() { fallback.to_owned() } else { value.to_owned() }
}

fn timeline_section(timeline: &[TimelineEvent]) -> String {
  if timeline.is_empty() {
    return "- No recent timeline events recorded.".to_owned();
  }
  timeline
    .iter()
    .map(|event| {
      let label = non_empty_or(&event.label, "No label");
      let details = if event.details.is_empty() {
        String::new()
      } else {
        format!(" - {}", event.details)
      };
      format!(
        "- {} · {}: {label}{details}",
        format_date(event.date),
        capitalize(event.kind.as_str()),
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn communications_section(communications: &[CommunicationEntry]) -> String {
  if communications.is_empty() {
    return "- No recent communications logged.".to_owned();
  }
  communications
    .iter()
    .map(|entry| {
      let owner = non_empty_or(&entry.owner, "Advising Team");
      let subject = non_empty_or(&entry.subject, "General outreach");
      let notes = if entry.notes.is_empty() {
        String::new()
      } else {
        format!(" - {}", entry.notes)
      };
      format!(
        "- {} · {} by {owner}: {subject}{notes}",
        format_date(entry.date),
        entry.channel.as_str(),
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn notes_section(notes: &[Note]) -> String {
  if notes.is_empty() {
    return "- No internal notes captured.".to_owned();
  }
  notes
    .iter()
    .map(|note| {
      let author = non_empty_or(&note.author, "Admissions Team");
      format!("- {} · {author}: {}", format_date(note.date), note.content)
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn reminders_section(reminders: &[Reminder]) -> String {
  if reminders.is_empty() {
    return "- No upcoming reminders.".to_owned();
  }
  reminders
    .iter()
    .map(|reminder| {
      let owner = non_empty_or(&reminder.owner, "Advising Team");
      let status = if reminder.completed { "Completed" } else { "Pending" };
      let description = non_empty_or(&reminder.description, "Task");
      format!(
        "- {} · {owner} ({status}): {description}",
        format_date(reminder.due_date),
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Render the full briefing prompt for one payload.
pub fn build_prompt(student: &SummaryPayload) -> String {
  let mut facts = vec![
    format!("Student name: {}", student.name),
    format!("Application status: {}", student.status.as_str()),
    format!("Engagement score: {}", student.engagement_score),
    format!("High intent: {}", yes_no(student.high_intent)),
    format!("Needs essay help: {}", yes_no(student.needs_essay_help)),
    format!("Last active: {}", format_date(student.last_active)),
    format!("Last contacted: {}", format_date(student.last_contacted)),
  ];
  if !student.program_interests.is_empty() {
    facts.push(format!(
      "Program interests: {}",
      student.program_interests.join(", ")
    ));
  }
  if !student.tags.is_empty() {
    facts.push(format!("Tags: {}", student.tags.join(", ")));
  }

  [
    INSTRUCTIONS.to_owned(),
    facts.join("\n"),
    "Recent timeline milestones:".to_owned(),
    timeline_section(&student.timeline),
    "Latest communications:".to_owned(),
    communications_section(&student.communications),
    "Key internal notes:".to_owned(),
    notes_section(&student.notes),
    "Upcoming reminders or tasks:".to_owned(),
    reminders_section(&student.reminders),
    CLOSING.to_owned(),
  ]
  .join("\n\n")
}
