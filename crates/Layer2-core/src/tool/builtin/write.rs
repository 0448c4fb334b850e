//! Staged Write Tools - 파일 변경 제안 도구
//!
//! 두 도구 모두 디스크를 직접 수정하지 않습니다. StagedEditStore에
//! draft를 쌓고 diff가 담긴 보고서를 돌려줍니다. 실제 적용은 사용자의
//! `/approve` 명령으로만 일어납니다.
//!
//! - `write_file`: 전체 내용 교체 (포맷 + 덮어쓰기 보호)
//! - `replace_in_file`: 첫 번째 일치 블록만 치환

use crate::workspace::Workspace;
use async_trait::async_trait;
use localhost_foundation::{Arity, Result, Tool, ToolArgs, ToolMeta, ToolOutput};
use std::sync::Arc;

// ============================================================================
// write_file
// ============================================================================

pub struct WriteFileTool {
    workspace: Arc<Workspace>,
}

impl WriteFileTool {
    pub const NAME: &'static str = "write_file";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("write_file(path, content)")
            .description(
                "Propose the full new content of a file inside the active project. \
                 Creates a DRAFT; the user must type /approve to apply it",
            )
            .category("staging")
            .arity(Arity::exactly(2))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let path = args.text(0, "path")?;
        let content = args.text(1, "content")?;
        let report = self.workspace.staging().propose_write(path, content)?;
        Ok(ToolOutput::text(report.to_string()))
    }
}

// ============================================================================
// replace_in_file
// ============================================================================

pub struct ReplaceInFileTool {
    workspace: Arc<Workspace>,
}

impl ReplaceInFileTool {
    pub const NAME: &'static str = "replace_in_file";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ReplaceInFileTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("replace_in_file(path, search_block, replacement_block)")
            .description(
                "Propose replacing the first exact occurrence of search_block. \
                 Prefer this over write_file for small edits. Requires /approve",
            )
            .category("staging")
            .arity(Arity::exactly(3))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let path = args.text(0, "path")?;
        let search = args.text(1, "search_block")?;
        let replacement = args.text(2, "replacement_block")?;
        let report = self
            .workspace
            .staging()
            .propose_partial_replace(path, search, replacement)?;
        Ok(ToolOutput::text(report.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localhost_foundation::{Error, PathSandbox, ToolArg};
    use std::fs;

    async fn project() -> (tempfile::TempDir, Arc<Workspace>, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Arc::new(Workspace::new(Arc::new(PathSandbox::new())));
        workspace.set_project_root(Some(dir.path())).await.unwrap();
        let root = workspace.project_root().unwrap();
        (dir, workspace, root)
    }

    #[tokio::test]
    async fn test_write_file_stages_only() {
        let (_dir, workspace, root) = project().await;
        let path = root.join("hello.py");

        let out = WriteFileTool::new(Arc::clone(&workspace))
            .execute(ToolArgs::new(
                "write_file",
                vec![path.display().to_string().into(), "print('hi')".into()],
            ))
            .await
            .unwrap()
            .to_string();

        assert!(out.contains("DRAFT CREATED for hello.py"));
        assert!(out.contains("+print('hi')"));
        assert!(!path.exists());
        assert_eq!(workspace.staging().len(), 1);

        workspace.approve();
        assert_eq!(fs::read_to_string(&path).unwrap(), "print('hi')\n");
    }

    #[tokio::test]
    async fn test_write_file_rejects_list_content() {
        let (_dir, workspace, root) = project().await;
        let err = WriteFileTool::new(workspace)
            .execute(ToolArgs::new(
                "write_file",
                vec![
                    root.join("a.txt").display().to_string().into(),
                    ToolArg::list(["a", "b"]),
                ],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_replace_in_file() {
        let (_dir, workspace, root) = project().await;
        let path = root.join("lib.rs");
        fs::write(&path, "fn a() {}\nfn b() {}\n").unwrap();

        let out = ReplaceInFileTool::new(Arc::clone(&workspace))
            .execute(ToolArgs::new(
                "replace_in_file",
                vec![
                    path.display().to_string().into(),
                    "fn b() {}".into(),
                    "fn b() { todo!() }".into(),
                ],
            ))
            .await
            .unwrap()
            .to_string();
        assert!(out.contains("-fn b() {}"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn a() {}\nfn b() {}\n");

        workspace.approve();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn a() {}\nfn b() { todo!() }\n"
        );
    }
}
