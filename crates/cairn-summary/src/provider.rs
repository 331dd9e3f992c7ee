//! The summarization provider seam and its Hugging Face implementation.

use std::{future::Future, pin::Pin};

use serde::Deserialize;

use crate::error::{Result, SummarizerError};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

const INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

/// Object-safe summarization seam so the API layer can hold
/// `Arc<dyn Summarize>` and tests can substitute a canned provider.
pub trait Summarize: Send + Sync {
  fn summarize<'a>(
    &'a self,
    prompt: &'a str,
  ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Hugging Face Inference API client for summarization models.
pub struct HfSummarizer {
  client:  reqwest::Client,
  api_key: Option<String>,
  model:   String,
}

#[derive(Deserialize)]
struct SummaryRow {
  summary_text: String,
}

impl HfSummarizer {
  /// A missing `api_key` is allowed at construction; every summarize call
  /// then fails with [`SummarizerError::NotConfigured`].
  pub fn new(api_key: Option<String>, model: Option<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_key,
      model: model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
    }
  }

  async fn call(&self, prompt: &str) -> Result<String> {
    let api_key = self.api_key.as_deref().ok_or_else(|| {
      SummarizerError::NotConfigured(
        "Hugging Face API key is not configured. Set CAIRN_HF_API_KEY to \
         enable AI summaries."
          .to_owned(),
      )
    })?;
    if prompt.trim().is_empty() {
      return Err(SummarizerError::BadInput(
        "insufficient context to generate a summary for this student"
          .to_owned(),
      ));
    }

    let url = format!("{INFERENCE_BASE}/{}", self.model);
    let body = serde_json::json!({
      "inputs": prompt,
      "parameters": { "max_length": 220, "min_length": 80 },
    });

    let response = self
      .client
      .post(&url)
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| SummarizerError::Upstream {
        message: format!("failed to reach the summarization provider: {e}"),
        status:  502,
      })?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
      return Err(SummarizerError::NotConfigured(
        "the summarization provider rejected the API key".to_owned(),
      ));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
      return Err(SummarizerError::Upstream {
        message: "summarization provider rate limit reached; try again \
                  shortly"
          .to_owned(),
        status:  429,
      });
    }
    if !status.is_success() {
      return Err(SummarizerError::Upstream {
        message: format!("summarization provider returned {status}"),
        status:  502,
      });
    }

    let rows: Vec<SummaryRow> =
      response.json().await.map_err(|e| SummarizerError::Upstream {
        message: format!("unreadable summarization response: {e}"),
        status:  502,
      })?;

    let summary = rows
      .into_iter()
      .next()
      .map(|row| row.summary_text.trim().to_owned())
      .unwrap_or_default();
    if summary.is_empty() {
      return Err(SummarizerError::Upstream {
        message: "summarization provider returned an empty response"
          .to_owned(),
        status:  502,
      });
    }
    Ok(summary)
  }
}

impl Summarize for HfSummarizer {
  fn summarize<'a>(
    &'a self,
    prompt: &'a str,
  ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
    Box::pin(self.call(prompt))
  }
}
