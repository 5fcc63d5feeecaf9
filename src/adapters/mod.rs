//! Adapters layer: concrete implementations of ports.
//!
//! - `model`: classifier backed by an offline-exported JSON artifact
//! - `llm`: chat-completions client for the text-generation service
//! - `sanitize`: credential/contact redaction for log output

pub mod llm;
pub mod model;
pub mod sanitize;

pub use llm::{ChatClient, LlmConfig};
pub use model::ModelClassifier;
