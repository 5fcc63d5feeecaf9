//! Text-generation port: trait boundary for the external narrative service.

use async_trait::async_trait;

/// Failure of a single text-generation attempt.
///
/// These never cross the narrative boundary; the caller of the narrative
/// service only ever sees text (generated or fallback).
#[derive(Debug, thiserror::Error)]
pub enum TextGenError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Trait for the external text-generation service.
///
/// One call is one bounded network request: implementations must enforce a
/// timeout so a slow upstream cannot stall the request task.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Request a completion for a system instruction plus user prompt.
    ///
    /// # Errors
    /// Returns [`TextGenError`] on transport failure, non-success status, or
    /// a response body that does not carry generated text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, TextGenError>;
}
