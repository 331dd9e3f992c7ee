//! Summarizer error taxonomy. Each kind carries its suggested HTTP status so
//! the API boundary can map failures without knowing the provider.

#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
  /// No API key configured, or the provider rejected it.
  #[error("{0}")]
  NotConfigured(String),

  /// The payload cannot produce a usable prompt.
  #[error("{0}")]
  BadInput(String),

  /// The provider failed: unreachable, rate-limited, or a bad response.
  #[error("{message}")]
  Upstream { message: String, status: u16 },
}

impl SummarizerError {
  pub fn suggested_status(&self) -> u16 {
    match self {
      Self::NotConfigured(_) => 503,
      Self::BadInput(_) => 400,
      Self::Upstream { status, .. } => *status,
    }
  }
}

pub type Result<T, E = SummarizerError> = std::result::Result<T, E>;
