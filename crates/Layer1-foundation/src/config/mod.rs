//! Config - 통합 설정 관리
//!
//! - `settings.rs` - LocalhostConfig (섹션별 기본값)
//! - `loader.rs` - user/project/local settings.json 병합

mod loader;
mod settings;

pub use loader::{merge_values, ConfigLoader};
pub use settings::{
    AgentSettings, FileSettings, LocalhostConfig, ProviderSettings, RetrySettings,
    SandboxSettings, LOCAL_SETTINGS_FILE, OLLAMA_HOST_ENV, SETTINGS_FILE,
};
