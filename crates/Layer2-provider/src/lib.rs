//! # localhost-provider
//!
//! Inference boundary for Localhost.
//!
//! The reasoning loop only sees `InferenceEngine::generate(history) -> text`.
//! Everything below that line (HTTP, retry, model options) lives here.
//!
//! ## Features
//! - Non-streaming Ollama `/api/chat` engine
//! - Automatic retry with exponential backoff for transient failures
//! - Every failure surfaces as `localhost_foundation::Error::Inference`

pub mod engine;
pub mod error;
pub mod providers;
pub mod retry;

// Core trait
pub use engine::{GenerationOptions, InferenceEngine};

// Error and retry
pub use error::ProviderError;
pub use retry::{with_retry, FailureKind, InferenceFailure, RetryConfig};

// Engine implementations
pub use providers::ollama::OllamaEngine;
