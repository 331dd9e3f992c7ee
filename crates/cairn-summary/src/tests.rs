//! Tests for payload trimming, prompt assembly, the summary cache, and the
//! provider's offline failure modes.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use chrono::{Duration as ChronoDuration, Utc};

use cairn_core::{
  record::TimelineEvent,
  seed::demo_students,
  student::Student,
};

use crate::{
  HfSummarizer, Summarize, SummarizerError, SummaryCache, SummaryPayload,
  build_prompt,
};

fn aanya() -> Student {
  demo_students().remove(0)
}

// ─── Payload ─────────────────────────────────────────────────────────────────

#[test]
fn payload_caps_timeline_to_newest_six() {
  let mut student = aanya();
  for i in 0..8 {
    student.timeline.push(TimelineEvent {
      id:      format!("extra-{i}"),
      date:    Utc::now() - ChronoDuration::minutes(i),
      kind:    Default::default(),
      label:   format!("Event {i}"),
      details: String::new(),
    });
  }
  student.sort_collections();

  let payload = SummaryPayload::from_student(&student);
  assert_eq!(payload.timeline.len(), 6);
  for pair in payload.timeline.windows(2) {
    assert!(pair[0].date >= pair[1].date);
  }
}

#[test]
fn payload_sanitizes_free_text() {
  let mut student = aanya();
  student.name = "  Aanya\n\tPatel ".to_owned();
  student.notes[0].content = "line\none\n\n\ttwo".to_owned();
  student.tags = vec!["  STEM  ".to_owned(), "   ".to_owned()];

  let payload = SummaryPayload::from_student(&student);
  assert_eq!(payload.name, "Aanya Patel");
  assert_eq!(payload.notes[0].content, "line one two");
  assert_eq!(payload.tags, vec!["STEM"]);
}

// ─── Prompt ──────────────────────────────────────────────────────────────────

#[test]
fn prompt_contains_fact_sheet_and_all_sections() {
  let payload = SummaryPayload::from_student(&aanya());
  let prompt = build_prompt(&payload);

  assert!(prompt.contains("Student name: Aanya Patel"));
  assert!(prompt.contains("Application status: Shortlisting"));
  assert!(prompt.contains("Recent timeline milestones:"));
  assert!(prompt.contains("Latest communications:"));
  assert!(prompt.contains("Key internal notes:"));
  assert!(prompt.contains("Upcoming reminders or tasks:"));
  assert!(prompt.ends_with("without bullet points."));
}

#[test]
fn prompt_uses_placeholders_for_empty_sections() {
  let mut student = aanya();
  student.timeline.clear();
  student.communications.clear();
  student.notes.clear();
  student.reminders.clear();
  student.tags.clear();
  student.program_interests.clear();

  let prompt = build_prompt(&SummaryPayload::from_student(&student));
  assert!(prompt.contains("- No recent timeline events recorded."));
  assert!(prompt.contains("- No recent communications logged."));
  assert!(prompt.contains("- No internal notes captured."));
  assert!(prompt.contains("- No upcoming reminders."));
  assert!(!prompt.contains("Tags:"));
}

// ─── Cache ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cache_serves_hit_until_payload_changes() {
  let cache = SummaryCache::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let mut payload = SummaryPayload::from_student(&aanya());

  let compute = |calls: Arc<AtomicUsize>| {
    move || async move {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok("briefing".to_owned())
    }
  };

  let first =
    cache.get_or_compute(&payload, compute(calls.clone())).await.unwrap();
  assert!(!first.cached);

  let second =
    cache.get_or_compute(&payload, compute(calls.clone())).await.unwrap();
  assert!(second.cached);
  assert_eq!(second.summary, "briefing");
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  // Any payload change invalidates the signature.
  payload.engagement_score += 1;
  let third =
    cache.get_or_compute(&payload, compute(calls.clone())).await.unwrap();
  assert!(!third.cached);
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cache_entries_expire_after_ttl() {
  let cache = SummaryCache::with_ttl(Duration::from_millis(20));
  let payload = SummaryPayload::from_student(&aanya());

  let first = cache
    .get_or_compute(&payload, || async { Ok("briefing".to_owned()) })
    .await
    .unwrap();
  assert!(!first.cached);

  tokio::time::sleep(Duration::from_millis(40)).await;

  let second = cache
    .get_or_compute(&payload, || async { Ok("briefing".to_owned()) })
    .await
    .unwrap();
  assert!(!second.cached);
}

#[tokio::test]
async fn cache_rejects_payloads_without_an_id() {
  let cache = SummaryCache::new();
  let mut payload = SummaryPayload::from_student(&aanya());
  payload.id = String::new();

  let err = cache
    .get_or_compute(&payload, || async { Ok(String::new()) })
    .await
    .unwrap_err();
  assert!(matches!(err, SummarizerError::BadInput(_)));
  assert_eq!(err.suggested_status(), 400);
}

// ─── Provider ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn provider_without_api_key_is_not_configured() {
  let provider = HfSummarizer::new(None, None);
  let err = provider.summarize("some prompt").await.unwrap_err();
  assert!(matches!(err, SummarizerError::NotConfigured(_)));
  assert_eq!(err.suggested_status(), 503);
}

#[tokio::test]
async fn provider_rejects_blank_prompts_before_any_request() {
  let provider = HfSummarizer::new(Some("key".to_owned()), None);
  let err = provider.summarize("   ").await.unwrap_err();
  assert!(matches!(err, SummarizerError::BadInput(_)));
}
