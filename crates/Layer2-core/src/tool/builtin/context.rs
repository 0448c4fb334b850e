//! Context Tools - 코드베이스 인덱스 도구
//!
//! Workspace에 `CodebaseIndex`가 주입된 경우에만 등록됩니다.

use crate::index::CodebaseIndex;
use crate::workspace::Workspace;
use async_trait::async_trait;
use localhost_foundation::{
    Arity, Error, Operation, Result, Tool, ToolArgs, ToolMeta, ToolOutput,
};
use std::sync::Arc;

/// search_codebase 기본 결과 수
const SEARCH_LIMIT: usize = 5;

fn require_index(workspace: &Workspace) -> Result<Arc<dyn CodebaseIndex>> {
    workspace
        .index()
        .cloned()
        .ok_or_else(|| Error::Tool("Codebase index is not available".to_string()))
}

// ============================================================================
// index_directory
// ============================================================================

pub struct IndexDirectoryTool {
    workspace: Arc<Workspace>,
}

impl IndexDirectoryTool {
    pub const NAME: &'static str = "index_directory";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for IndexDirectoryTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("index_directory(path)")
            .description("Index a directory for semantic code search")
            .category("context")
            .arity(Arity::exactly(1))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let raw = args.text(0, "path")?;
        let root = self
            .workspace
            .sandbox()
            .validate_path(raw, Operation::Read)?;
        if !root.is_dir() {
            return Err(Error::NotFound(format!("Path not found: {}", raw)));
        }

        let summary = require_index(&self.workspace)?
            .index_directory(&root)
            .await?;
        Ok(ToolOutput::text(summary.to_string()))
    }
}

// ============================================================================
// search_codebase
// ============================================================================

pub struct SearchCodebaseTool {
    workspace: Arc<Workspace>,
}

impl SearchCodebaseTool {
    pub const NAME: &'static str = "search_codebase";

    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for SearchCodebaseTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn meta(&self) -> ToolMeta {
        ToolMeta::new(Self::NAME)
            .usage("search_codebase(query)")
            .description("Semantic search over the indexed codebase")
            .category("context")
            .arity(Arity::exactly(1))
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput> {
        let query = args.text(0, "query")?;
        let hits = require_index(&self.workspace)?
            .search(query, SEARCH_LIMIT)
            .await?;

        if hits.is_empty() {
            return Ok(ToolOutput::text(format!("No results for '{}'.", query)));
        }

        let sections: Vec<String> = hits
            .iter()
            .map(|hit| {
                format!(
                    "## {} (chunk {})\n{}",
                    hit.path.display(),
                    hit.chunk_id,
                    hit.text
                )
            })
            .collect();
        Ok(ToolOutput::text(sections.join("\n\n")))
    }
}
