//! localhost-core: Core Runtime for Localhost
//!
//! Layer2 - Agent 도구 구현 레이어
//!
//! # 주요 모듈
//!
//! - `edit`: 내용 포맷, unified diff, draft → approve 큐 (StagedEditStore)
//! - `workspace`: 공유 작업 컨텍스트 (sandbox + staging + index)
//! - `index`: 코드베이스 인덱스 연동 지점 (CodebaseIndex)
//! - `tool`: ToolRegistry 및 Builtin 도구들
//!
//! # 사용 예시
//!
//! ```ignore
//! use localhost_core::{ToolRegistry, Workspace};
//!
//! let workspace = Arc::new(Workspace::from_config(&config));
//! workspace.set_project_root(Some(Path::new("~/code/app"))).await?;
//!
//! let registry = ToolRegistry::with_builtins(Arc::clone(&workspace));
//! let draft = registry
//!     .execute("write_file", vec!["README.md".into(), "# App".into()])
//!     .await?;
//!
//! // 사용자가 /approve 입력 시
//! let report = workspace.approve();
//! ```

pub mod edit;
pub mod index;
pub mod tool;
pub mod workspace;

// Re-exports: Edit
pub use edit::{
    ApplyResult, ApplyStatus, ApprovalReport, ContentFormatter, DefaultFormatter, DraftReport,
    EditKind, FileDiff, PendingEdit, StagedEditStore,
};

// Re-exports: Index
pub use index::{CodebaseIndex, IndexSummary, SearchHit};

// Re-exports: Tool
pub use tool::ToolRegistry;

// Re-exports: Workspace
pub use workspace::{RootSwitch, Workspace};
