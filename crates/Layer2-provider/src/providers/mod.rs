//! Inference engine implementations

pub mod ollama;
