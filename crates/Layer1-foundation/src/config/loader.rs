//! Configuration Loader
//!
//! ## 검색 우선순위
//!
//! 1. User-level: `~/.localhost/settings.json`
//! 2. Project-level: `.localhost/settings.json`
//! 3. Local (gitignored): `.localhost/settings.local.json`
//!
//! 각 레벨의 설정이 이전 레벨을 오버라이드합니다. 객체는 재귀적으로
//! 병합되고, 그 외 값(배열 포함)은 통째로 교체됩니다.

use super::settings::{LocalhostConfig, LOCAL_SETTINGS_FILE, SETTINGS_FILE};
use crate::storage::JsonStore;
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 설정 파일 위치
#[derive(Debug, Clone)]
struct ConfigSource {
    store: JsonStore,
    filename: String,
    description: &'static str,
}

impl ConfigSource {
    fn path(&self) -> PathBuf {
        self.store.file_path(&self.filename)
    }
}

/// 설정 로더
pub struct ConfigLoader {
    /// 낮은 우선순위부터
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// 기본 검색 경로
    pub fn new(working_dir: &Path) -> Self {
        let mut sources = Vec::new();

        if let Ok(user) = JsonStore::user() {
            sources.push(ConfigSource {
                store: user,
                filename: SETTINGS_FILE.to_string(),
                description: "User settings",
            });
        }

        let project = JsonStore::project(working_dir);
        sources.push(ConfigSource {
            store: project.clone(),
            filename: SETTINGS_FILE.to_string(),
            description: "Project settings",
        });
        sources.push(ConfigSource {
            store: project,
            filename: LOCAL_SETTINGS_FILE.to_string(),
            description: "Local settings",
        });

        Self { sources }
    }

    /// 커스텀 파일 목록 (앞쪽이 낮은 우선순위)
    pub fn with_paths(paths: Vec<PathBuf>) -> Result<Self> {
        let sources = paths
            .into_iter()
            .map(|path| {
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                let filename = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| Error::Config(format!("Invalid config path: {}", path.display())))?;
                Ok(ConfigSource {
                    store: JsonStore::new(dir),
                    filename: filename.to_string(),
                    description: "Custom",
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sources })
    }

    /// 모든 경로에서 로드하여 병합
    ///
    /// 읽을 수 없는 파일은 경고 후 건너뜁니다.
    pub fn load_all(&self) -> Result<LocalhostConfig> {
        let mut merged = Value::Object(Default::default());

        for source in &self.sources {
            if !source.store.exists(&source.filename) {
                continue;
            }
            match source.store.load_value(&source.filename) {
                Ok(value) => {
                    info!("Loaded {} from: {}", source.description, source.path().display());
                    merge_values(&mut merged, value);
                }
                Err(e) => warn!("Failed to load settings from {}: {}", source.path().display(), e),
            }
        }

        debug!("Merged settings: {}", merged);
        serde_json::from_value(merged)
            .map_err(|e| Error::Config(format!("Invalid settings: {}", e)))
    }

    /// 존재하는 설정 파일 목록
    pub fn existing_files(&self) -> Vec<PathBuf> {
        self.sources
            .iter()
            .filter(|s| s.store.exists(&s.filename))
            .map(ConfigSource::path)
            .collect()
    }
}

/// 재귀 병합 (later가 earlier를 오버라이드)
pub fn merge_values(earlier: &mut Value, later: Value) {
    match (earlier, later) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
