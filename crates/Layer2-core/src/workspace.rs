//! Workspace - 프로세스 전체에서 공유하는 작업 컨텍스트
//!
//! PathSandbox + StagedEditStore + (선택) CodebaseIndex를 묶습니다.
//! 한 번 생성해서 `Arc`로 모든 도구와 host bridge에 전달합니다.
//!
//! 프로젝트 루트 변경은 항상 이 타입을 통해야 합니다. 루트가 바뀌면
//! 이전 루트 기준으로 검증된 draft는 모두 폐기됩니다.

use crate::edit::{ApprovalReport, DefaultFormatter, StagedEditStore};
use crate::index::CodebaseIndex;
use localhost_foundation::config::FileSettings;
use localhost_foundation::{LocalhostConfig, PathSandbox, Result, RootChange};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 루트 변경 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSwitch {
    pub change: RootChange,
    /// 폐기된 draft 수
    pub discarded: usize,
}

impl fmt::Display for RootSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change {
            RootChange::Set(root) => write!(f, "Project root set to: {}", root.display())?,
            RootChange::Cleared => f.write_str("Context Cleared")?,
        }
        if self.discarded > 0 {
            write!(f, " ({} pending draft(s) discarded)", self.discarded)?;
        }
        Ok(())
    }
}

/// 공유 작업 컨텍스트
pub struct Workspace {
    sandbox: Arc<PathSandbox>,
    staging: StagedEditStore,
    index: Option<Arc<dyn CodebaseIndex>>,
    files: FileSettings,
}

impl Workspace {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self {
            staging: StagedEditStore::new(Arc::clone(&sandbox)),
            sandbox,
            index: None,
            files: FileSettings::default(),
        }
    }

    /// 설정에서 생성
    ///
    /// `sandbox.default_project`가 있으면 루트로 설정합니다. 실패해도
    /// 경고만 남기고 루트 없이 시작합니다.
    pub fn from_config(config: &LocalhostConfig) -> Self {
        let sandbox = Arc::new(PathSandbox::from_settings(&config.sandbox));
        let staging = StagedEditStore::new(Arc::clone(&sandbox))
            .with_formatter(Arc::new(DefaultFormatter::new()))
            .with_shrink_guard_ratio(config.files.shrink_guard_ratio);

        if let Some(project) = &config.sandbox.default_project {
            if let Err(e) = sandbox.set_project_root(Some(Path::new(project))) {
                warn!("Ignoring default project {}: {}", project, e);
            }
        }

        Self {
            sandbox,
            staging,
            index: None,
            files: config.files.clone(),
        }
    }

    pub fn with_index(mut self, index: Arc<dyn CodebaseIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_file_settings(mut self, files: FileSettings) -> Self {
        self.staging = self
            .staging
            .with_shrink_guard_ratio(files.shrink_guard_ratio);
        self.files = files;
        self
    }

    pub fn sandbox(&self) -> &Arc<PathSandbox> {
        &self.sandbox
    }

    pub fn staging(&self) -> &StagedEditStore {
        &self.staging
    }

    pub fn index(&self) -> Option<&Arc<dyn CodebaseIndex>> {
        self.index.as_ref()
    }

    pub fn files(&self) -> &FileSettings {
        &self.files
    }

    pub fn project_root(&self) -> Option<PathBuf> {
        self.sandbox.project_root()
    }

    // ========================================================================
    // Root lifecycle
    // ========================================================================

    /// 프로젝트 루트 설정/해제
    ///
    /// 루트 변경과 draft 폐기는 staging 큐 잠금 안에서 함께 일어납니다.
    /// 루트가 해제되면 인덱스도 비웁니다.
    pub async fn set_project_root(&self, path: Option<&Path>) -> Result<RootSwitch> {
        let (change, discarded) = self
            .staging
            .discard_after(|| self.sandbox.set_project_root(path))?;

        if change == RootChange::Cleared {
            self.clear_index().await;
        }

        info!(root = %change, discarded, "Project context switched");
        Ok(RootSwitch { change, discarded })
    }

    /// 전체 초기화: draft 폐기, 루트 해제, 인덱스 삭제
    pub async fn reset(&self) -> Result<RootSwitch> {
        self.set_project_root(None).await
    }

    /// 모든 draft 적용
    pub fn approve(&self) -> ApprovalReport {
        self.staging.approve_all()
    }

    async fn clear_index(&self) {
        if let Some(index) = &self.index {
            if let Err(e) = index.clear().await {
                warn!("Failed to clear codebase index: {}", e);
            }
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("sandbox", &self.sandbox)
            .field("staging", &self.staging)
            .field("has_index", &self.index.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexSummary, SearchHit};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingIndex {
        clears: AtomicUsize,
    }

    #[async_trait]
    impl CodebaseIndex for CountingIndex {
        async fn index_directory(&self, _root: &Path) -> Result<IndexSummary> {
            Ok(IndexSummary::default())
        }

        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }

        async fn clear(&self) -> Result<()> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_root_change_discards_drafts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(Arc::new(PathSandbox::new()));

        let switch = workspace.set_project_root(Some(first.path())).await.unwrap();
        assert_eq!(switch.discarded, 0);

        let root = workspace.project_root().unwrap();
        workspace
            .staging()
            .propose_write(root.join("a.txt"), "hello")
            .unwrap();

        let switch = workspace.set_project_root(Some(second.path())).await.unwrap();
        assert_eq!(switch.discarded, 1);
        assert!(switch.to_string().contains("1 pending draft(s) discarded"));
        assert!(workspace.staging().is_empty());
    }

    #[tokio::test]
    async fn test_failed_root_change_keeps_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(Arc::new(PathSandbox::new()));
        workspace.set_project_root(Some(dir.path())).await.unwrap();
        let root = workspace.project_root().unwrap();
        workspace
            .staging()
            .propose_write(root.join("a.txt"), "hello")
            .unwrap();

        assert!(workspace
            .set_project_root(Some(Path::new("/no/such/dir/anywhere")))
            .await
            .is_err());
        assert_eq!(workspace.staging().len(), 1);
        assert_eq!(workspace.project_root(), Some(root));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(CountingIndex::default());
        let workspace =
            Workspace::new(Arc::new(PathSandbox::new())).with_index(index.clone());
        workspace.set_project_root(Some(dir.path())).await.unwrap();
        let root = workspace.project_root().unwrap();
        workspace
            .staging()
            .propose_write(root.join("a.txt"), "hello")
            .unwrap();

        let switch = workspace.reset().await.unwrap();
        assert_eq!(switch.change, RootChange::Cleared);
        assert_eq!(switch.discarded, 1);
        assert!(workspace.project_root().is_none());
        assert_eq!(index.clears.load(Ordering::SeqCst), 1);
        assert!(!root.join("a.txt").exists());
    }

    #[test]
    fn test_from_config_default_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LocalhostConfig::default();
        config.sandbox.default_project = Some(dir.path().display().to_string());
        config.files.find_limit = 5;

        let workspace = Workspace::from_config(&config);
        assert!(workspace.project_root().is_some());
        assert_eq!(workspace.files().find_limit, 5);
    }
}
