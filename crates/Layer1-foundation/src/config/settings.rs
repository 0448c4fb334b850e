//! Localhost Config - 통합 설정
//!
//! 모든 필드에 기본값이 있으므로 `{}`도 유효한 설정입니다.

use crate::permission::DEFAULT_BLOCKED_PREFIXES;
use serde::{Deserialize, Serialize};

/// 설정 파일명
pub const SETTINGS_FILE: &str = "settings.json";

/// 로컬 오버라이드 파일명 (gitignored)
pub const LOCAL_SETTINGS_FILE: &str = "settings.local.json";

/// Ollama 호스트 환경 변수
pub const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

// ============================================================================
// LocalhostConfig (통합)
// ============================================================================

/// 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalhostConfig {
    pub agent: AgentSettings,
    pub sandbox: SandboxSettings,
    pub files: FileSettings,
    pub provider: ProviderSettings,
}

impl LocalhostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 환경 변수 적용 (`OLLAMA_HOST`)
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var(OLLAMA_HOST_ENV) {
            let host = host.trim();
            if !host.is_empty() {
                self.provider.base_url = normalize_host(host);
            }
        }
        self
    }
}

/// `OLLAMA_HOST`는 스킴 없이 `host:port`로 설정되는 경우가 많습니다
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

// ============================================================================
// Agent
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentSettings {
    /// 쿼리당 최대 추론 단계
    pub max_steps: usize,
    /// 응답 최대 토큰 (엔진에 전달)
    pub max_tokens: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: 15,
            max_tokens: 200,
        }
    }
}

// ============================================================================
// Sandbox
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SandboxSettings {
    /// 시스템 차단 경로
    pub blocked_prefixes: Vec<String>,
    /// 사용자 추가 차단 경로
    pub extra_blocked_prefixes: Vec<String>,
    /// 시작 시 설정할 프로젝트 루트
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_project: Option<String>,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            blocked_prefixes: DEFAULT_BLOCKED_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extra_blocked_prefixes: Vec::new(),
            default_project: None,
        }
    }
}

// ============================================================================
// Files
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileSettings {
    /// read_file 최대 파일 크기 (bytes)
    pub max_read_bytes: u64,
    /// read_file 출력 최대 문자 수
    pub max_read_chars: usize,
    /// find_files 최대 결과 수
    pub find_limit: usize,
    /// 덮어쓰기 보호 비율 (새 길이 < 기존 길이 * ratio 이면 거부)
    pub shrink_guard_ratio: f64,
    /// 검색 시 건너뛸 디렉토리
    pub ignore_dirs: Vec<String>,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            max_read_bytes: 10 * 1024 * 1024,
            max_read_chars: 10_000,
            find_limit: 20,
            shrink_guard_ratio: 0.70,
            ignore_dirs: [
                "node_modules",
                ".git",
                "venv",
                "__pycache__",
                "DerivedData",
                "Library",
                ".vscode",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub retry: RetrySettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: 600,
            temperature: 0.2,
            retry: RetrySettings::default(),
        }
    }
}

/// 재시도 정책
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
            backoff_multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LocalhostConfig::default();
        assert_eq!(config.agent.max_steps, 15);
        assert_eq!(config.files.max_read_chars, 10_000);
        assert_eq!(config.files.find_limit, 20);
        assert!(config.sandbox.blocked_prefixes.contains(&"/etc".to_string()));
        assert_eq!(config.provider.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_empty_object_is_valid() {
        let config: LocalhostConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LocalhostConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config: LocalhostConfig =
            serde_json::from_str(r#"{"agent": {"maxSteps": 5}}"#).unwrap();
        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.agent.max_tokens, 200);
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("127.0.0.1:11434"), "http://127.0.0.1:11434");
        assert_eq!(normalize_host("https://gpu.local/"), "https://gpu.local");
    }
}
