//! AI summary subsystem: the trimmed counselor-briefing payload, the prompt
//! builder, the TTL'd summary cache, and the Hugging Face provider.
//!
//! The cache is keyed by student id and guarded by a content signature, so a
//! cached briefing is reused only while the underlying payload is unchanged
//! and younger than the TTL.

mod cache;
mod error;
mod payload;
mod prompt;
mod provider;

pub use cache::{SUMMARY_TTL, SummaryCache, SummaryOutcome};
pub use error::{Result, SummarizerError};
pub use payload::SummaryPayload;
pub use prompt::build_prompt;
pub use provider::{DEFAULT_MODEL, HfSummarizer, Summarize};

#[cfg(test)]
mod tests;
