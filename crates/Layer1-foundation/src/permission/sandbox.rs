//! PathSandbox - READ/WRITE 신뢰 경계
//!
//! - 시스템 경로 차단 (READ/WRITE 공통)
//! - WRITE는 활성 프로젝트 루트 하위만 허용
//! - 프로젝트 루트가 없으면 WRITE는 항상 실패 (fail closed)
//!
//! 모든 도구가 같은 루트를 보도록 `Arc<PathSandbox>`로 공유합니다.

use super::path;
use crate::config::SandboxSettings;
use crate::error::SecurityViolation;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 기본 차단 경로
pub const DEFAULT_BLOCKED_PREFIXES: &[&str] = &[
    "/etc",
    "/var",
    "/private",
    "/sbin",
    "/usr/sbin",
    "/boot",
    "/root",
    "/.ssh",
];

/// 파일 시스템 작업 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => f.write_str("READ"),
            Operation::Write => f.write_str("WRITE"),
        }
    }
}

/// 프로젝트 루트 변경 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootChange {
    Set(PathBuf),
    Cleared,
}

impl fmt::Display for RootChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootChange::Set(root) => write!(f, "{}", root.display()),
            RootChange::Cleared => f.write_str("Context Cleared"),
        }
    }
}

/// 경로 샌드박스
pub struct PathSandbox {
    /// 활성 프로젝트 루트 (WRITE 허용 범위)
    root: RwLock<Option<PathBuf>>,
    /// 차단된 시스템 경로
    blocked: Vec<PathBuf>,
}

impl PathSandbox {
    /// 기본 차단 목록으로 생성
    pub fn new() -> Self {
        Self::with_blocked_prefixes(DEFAULT_BLOCKED_PREFIXES.iter().map(PathBuf::from))
    }

    /// 커스텀 차단 목록으로 생성
    pub fn with_blocked_prefixes<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            root: RwLock::new(None),
            blocked: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// 설정에서 생성 (기본 + 추가 차단 경로)
    pub fn from_settings(settings: &SandboxSettings) -> Self {
        let prefixes = settings
            .blocked_prefixes
            .iter()
            .chain(settings.extra_blocked_prefixes.iter())
            .map(|p| path::expand_home(Path::new(p)));
        Self::with_blocked_prefixes(prefixes)
    }

    pub fn blocked_prefixes(&self) -> &[PathBuf] {
        &self.blocked
    }

    /// 현재 프로젝트 루트
    pub fn project_root(&self) -> Option<PathBuf> {
        self.root.read().clone()
    }

    pub fn has_project(&self) -> bool {
        self.root.read().is_some()
    }

    /// 프로젝트 루트 설정 (`None`이면 해제)
    ///
    /// 인덱스/컨텍스트 초기화는 호출하는 쪽(Workspace)의 책임입니다.
    pub fn set_project_root(&self, target: Option<&Path>) -> Result<RootChange> {
        let Some(target) = target else {
            *self.root.write() = None;
            info!("Project root cleared");
            return Ok(RootChange::Cleared);
        };

        let resolved = path::resolve(target)?;
        if !resolved.exists() {
            return Err(Error::NotFound(format!(
                "Project path does not exist: {}",
                resolved.display()
            )));
        }
        if !resolved.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Project root must be a directory: {}",
                resolved.display()
            )));
        }
        self.check_blocked(&resolved)?;

        info!(root = %resolved.display(), "Project root set");
        *self.root.write() = Some(resolved.clone());
        Ok(RootChange::Set(resolved))
    }

    /// 경로 검증
    ///
    /// 성공 시 심볼릭 링크까지 해석된 절대 경로를 반환합니다.
    pub fn validate_path(&self, target: impl AsRef<Path>, operation: Operation) -> Result<PathBuf> {
        let resolved = path::resolve(target.as_ref())?;

        // 1. 전역 차단 목록 (READ/WRITE 공통)
        self.check_blocked(&resolved)?;

        // 2. WRITE 범위 검사
        if operation == Operation::Write {
            let root = self.root.read();
            let Some(root) = root.as_ref() else {
                warn!(target = %resolved.display(), "Write denied: no active project");
                return Err(SecurityViolation::NoActiveProject.into());
            };

            if !resolved.starts_with(root) {
                // 대소문자 무시 파일시스템 (macOS/Windows) 허용
                if path::starts_with_ignore_case(&resolved, root) {
                    debug!(target = %resolved.display(), "Write allowed by case-insensitive match");
                    return Ok(resolved);
                }

                warn!(
                    target = %resolved.display(),
                    root = %root.display(),
                    "SECURITY ALERT: write denied outside project"
                );
                return Err(SecurityViolation::OutsideProject {
                    path: resolved,
                    root: root.clone(),
                }
                .into());
            }
        }

        Ok(resolved)
    }

    fn check_blocked(&self, resolved: &Path) -> Result<()> {
        if let Some(prefix) = self.blocked.iter().find(|p| resolved.starts_with(p)) {
            warn!(path = %resolved.display(), prefix = %prefix.display(), "Restricted system path");
            return Err(SecurityViolation::RestrictedPath {
                path: resolved.to_path_buf(),
                prefix: prefix.clone(),
            }
            .into());
        }
        Ok(())
    }
}

impl Default for PathSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PathSandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathSandbox")
            .field("root", &*self.root.read())
            .field("blocked", &self.blocked)
            .finish()
    }
}
