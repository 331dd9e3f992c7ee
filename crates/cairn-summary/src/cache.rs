//! Per-student summary cache with a content signature and a TTL.
//!
//! Entries expire lazily: an expired or signature-mismatched entry is simply
//! recomputed and overwritten on the next request.

use std::{
  collections::HashMap,
  future::Future,
  sync::Mutex,
  time::{Duration, Instant},
};

use sha2::{Digest, Sha256};

use crate::{
  error::{Result, SummarizerError},
  payload::SummaryPayload,
};

/// How long a cached briefing stays valid for an unchanged payload.
pub const SUMMARY_TTL: Duration = Duration::from_secs(10 * 60);

/// A summary plus whether it was served from cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
  pub summary: String,
  pub cached:  bool,
}

struct CacheEntry {
  summary:    String,
  signature:  String,
  expires_at: Instant,
}

/// Cache keyed by student id. Shared behind an `Arc`; the lock is never held
/// across an await.
pub struct SummaryCache {
  ttl:     Duration,
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for SummaryCache {
  fn default() -> Self {
    Self::new()
  }
}

impl SummaryCache {
  pub fn new() -> Self {
    Self::with_ttl(SUMMARY_TTL)
  }

  /// Custom TTL — used by tests to exercise expiry without waiting.
  pub fn with_ttl(ttl: Duration) -> Self {
    Self { ttl, entries: Mutex::new(HashMap::new()) }
  }

  pub fn clear(&self) {
    self.lock().clear();
  }

  /// Return the cached summary when the payload signature matches and the
  /// entry is fresh; otherwise run `compute` and cache its result.
  pub async fn get_or_compute<F, Fut>(
    &self,
    payload: &SummaryPayload,
    compute: F,
  ) -> Result<SummaryOutcome>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String>>,
  {
    if payload.id.is_empty() {
      return Err(SummarizerError::BadInput(
        "student payload is missing an identifier for caching".to_owned(),
      ));
    }

    let signature = signature_of(payload)?;

    let hit = {
      let entries = self.lock();
      entries
        .get(&payload.id)
        .filter(|e| e.signature == signature && e.expires_at > Instant::now())
        .map(|e| e.summary.clone())
    };
    if let Some(summary) = hit {
      return Ok(SummaryOutcome { summary, cached: true });
    }

    let summary = compute().await?;

    self.lock().insert(payload.id.clone(), CacheEntry {
      summary: summary.clone(),
      signature,
      expires_at: Instant::now() + self.ttl,
    });

    Ok(SummaryOutcome { summary, cached: false })
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }
}

/// Hex SHA-256 over the payload's canonical JSON encoding.
fn signature_of(payload: &SummaryPayload) -> Result<String> {
  let json = serde_json::to_string(payload).map_err(|e| {
    SummarizerError::BadInput(format!("unserializable summary payload: {e}"))
  })?;
  Ok(hex::encode(Sha256::digest(json.as_bytes())))
}
