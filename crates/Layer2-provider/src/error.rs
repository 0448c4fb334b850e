//! Provider-specific error types
//!
//! ProviderError는 추론 엔진 HTTP 호출의 세부 에러를 관리합니다.
//! 루프로 넘어갈 때는 모두 `localhost_foundation::Error::Inference`로 변환됩니다.

use crate::retry::{FailureKind, InferenceFailure};
use localhost_foundation::Error as FoundationError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to an inference engine
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Rate limit exceeded
    #[error("Rate limit exceeded{}", .retry_after_ms.map(|ms| format!(", retry after {}ms", ms)).unwrap_or_default())]
    RateLimited { retry_after_ms: Option<u64> },

    /// Context length exceeded
    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(String),

    /// Server error (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Network error (connection refused, DNS, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid request (bad parameters)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Engine not configured (bad base URL, client build failure)
    #[error("Engine not configured: {0}")]
    NotConfigured(String),

    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl InferenceFailure for ProviderError {
    fn kind(&self) -> FailureKind {
        match self {
            ProviderError::RateLimited { retry_after_ms } => FailureKind::Throttled {
                wait: retry_after_ms.map(Duration::from_millis),
            },

            // 서버 기동 중
            ProviderError::Network(_) => FailureKind::Unreachable,

            // 모델 로딩 중이거나 과부하
            ProviderError::ServerError(_) | ProviderError::Timeout(_) => FailureKind::Busy,

            ProviderError::ContextLengthExceeded(_)
            | ProviderError::InvalidRequest(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::ModelNotFound(_)
            | ProviderError::NotConfigured(_)
            | ProviderError::Unknown(_) => FailureKind::Fatal,
        }
    }
}

impl ProviderError {
    /// Create from HTTP status code and body
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            429 => ProviderError::RateLimited {
                retry_after_ms: extract_retry_after(body),
            },
            400 => {
                if body.contains("context") || body.contains("too long") || body.contains("token") {
                    ProviderError::ContextLengthExceeded(body.to_string())
                } else {
                    ProviderError::InvalidRequest(body.to_string())
                }
            }
            404 => ProviderError::ModelNotFound(body.to_string()),
            500..=599 => ProviderError::ServerError(body.to_string()),
            _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Map a reqwest transport error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ProviderError::NotConfigured(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Try to extract retry-after value from error body (in milliseconds)
fn extract_retry_after(body: &str) -> Option<u64> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(secs) = json
            .get("error")
            .and_then(|e| e.get("retry_after"))
            .and_then(|v| v.as_f64())
        {
            return Some((secs * 1000.0) as u64);
        }
    }

    if let Some(idx) = body.find("retry") {
        let num_str: String = body[idx..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if let Ok(secs) = num_str.parse::<f64>() {
            return Some((secs * 1000.0) as u64);
        }
    }

    None
}

// ============================================================================
// localhost_foundation::Error 변환
// ============================================================================

impl From<ProviderError> for FoundationError {
    fn from(err: ProviderError) -> Self {
        FoundationError::Inference(err.to_string())
    }
}
