//! Error types for Localhost
//!
//! 모든 에러를 중앙에서 관리

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// 샌드박스 위반 종류
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityViolation {
    /// 시스템 경로 (READ/WRITE 모두 차단)
    #[error("Access DENIED: restricted system path {prefix} (requested: {path})")]
    RestrictedPath { path: PathBuf, prefix: PathBuf },

    /// 프로젝트 루트 미설정 상태에서 쓰기 시도
    #[error("Write denied: no active project set. Use /project <path> first.")]
    NoActiveProject,

    /// 프로젝트 루트 밖으로 쓰기 시도
    #[error("Write denied: {path} is outside the active project ({root})")]
    OutsideProject { path: PathBuf, root: PathBuf },

    /// 심볼릭 링크를 통한 쓰기
    #[error("Write denied: {path} is a symbolic link")]
    SymlinkTarget { path: PathBuf },
}

/// Localhost 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 보안 관련
    // ========================================================================
    #[error("SecurityError: {0}")]
    Security(#[from] SecurityViolation),

    // ========================================================================
    // 파일/대상 관련
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Target block not found in {path}. Use read_file to verify the exact content.")]
    TargetNotFound { path: PathBuf },

    #[error("Target block found in {path} but whitespace differs. Copy the block exactly as it appears in the file.")]
    WhitespaceMismatch { path: PathBuf },

    // ========================================================================
    // Staged edit 관련
    // ========================================================================
    #[error(
        "SAFETY ALERT: You are about to delete {removed_chars} chars (~{percent}% of {path}).\n\
         STOP. Do NOT overwrite the file.\n\
         Use `replace_in_file` to modify specific sections safely."
    )]
    MutationRefused {
        path: PathBuf,
        removed_chars: usize,
        percent: u32,
    },

    // ========================================================================
    // Tool 관련
    // ========================================================================
    #[error("Tool '{0}' not found.")]
    ToolNotRegistered(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Tool error: {0}")]
    Tool(String),

    // ========================================================================
    // 추론 엔진
    // ========================================================================
    #[error("Inference failure: {0}")]
    Inference(String),

    // ========================================================================
    // 설정/입력
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 대화 안에서 observation으로 복구 가능한 에러인지 확인
    ///
    /// 추론 엔진 실패만 쿼리 전체를 중단시킵니다.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Inference(_))
    }

    /// 사용자에게 그대로 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::Security(_)
                | Error::NotFound(_)
                | Error::TargetNotFound { .. }
                | Error::WhitespaceMismatch { .. }
                | Error::MutationRefused { .. }
                | Error::ToolNotRegistered(_)
                | Error::InvalidArguments { .. }
                | Error::InvalidInput(_)
        )
    }

    /// 보안 위반인지 확인
    pub fn is_security(&self) -> bool {
        matches!(self, Error::Security(_))
    }

    /// 인자 에러 생성 헬퍼
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// 추론 에러 생성 헬퍼
    pub fn inference(message: impl Into<String>) -> Self {
        Error::Inference(message.into())
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_inference_is_fatal() {
        assert!(!Error::inference("model crashed").is_recoverable());
        assert!(Error::NotFound("x".into()).is_recoverable());
        assert!(Error::from(SecurityViolation::NoActiveProject).is_recoverable());
    }

    #[test]
    fn test_mutation_refused_message() {
        let err = Error::MutationRefused {
            path: PathBuf::from("/p/a.txt"),
            removed_chars: 80,
            percent: 80,
        };
        let msg = err.to_string();
        assert!(msg.contains("80 chars"));
        assert!(msg.contains("~80%"));
        assert!(msg.contains("replace_in_file"));
    }

    #[test]
    fn test_security_message_is_prefixed() {
        let err: Error = SecurityViolation::OutsideProject {
            path: PathBuf::from("/a/b"),
            root: PathBuf::from("/p"),
        }
        .into();
        assert!(err.is_security());
        assert!(err.is_user_facing());
        assert!(err.to_string().starts_with("SecurityError:"));
        assert!(err.to_string().contains("/p"));
    }
}
