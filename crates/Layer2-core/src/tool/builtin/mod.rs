//! Builtin Tools - 내장 도구들
//!
//! Agent가 사용하는 핵심 도구 구현
//!
//! ## 도구 목록
//!
//! ### 파일시스템 (Filesystem, READ 검증)
//! - `list_directory` - 디렉토리 목록
//! - `read_file` - 파일 읽기 (크기 제한, 자르기)
//! - `read_multiple_files` - 여러 파일 읽기
//! - `find_files` - 이름 패턴 검색
//!
//! ### 스테이징 (Staging, WRITE 검증 + draft)
//! - `write_file` - 전체 내용 교체 제안
//! - `replace_in_file` - 블록 치환 제안
//!
//! ### 컨텍스트 (Context, 인덱스 주입 시에만)
//! - `index_directory` - 코드베이스 인덱싱
//! - `search_codebase` - 시맨틱 검색
//!
//! ## Layer1 연동
//! - 모든 도구는 `localhost_foundation::Tool` trait 구현
//! - 경로 검사는 `PathSandbox::validate_path`로 일원화

// Filesystem tools
pub mod find;
pub mod list;
pub mod read;

// Staging tools
pub mod write;

// Context tools
pub mod context;

// Re-exports
pub use context::{IndexDirectoryTool, SearchCodebaseTool};
pub use find::{find_entries, FindFilesTool, FindReport, FoundEntry};
pub use list::ListDirectoryTool;
pub use read::{read_text, FileContent, ReadFileTool, ReadMultipleFilesTool, TRUNCATION_MARKER};
pub use write::{ReplaceInFileTool, WriteFileTool};

use crate::workspace::Workspace;
use localhost_foundation::Tool;
use std::sync::Arc;

/// 모든 builtin 도구 인스턴스 생성 (프롬프트에 표시될 순서)
pub fn all_tools(workspace: Arc<Workspace>) -> Vec<Arc<dyn Tool>> {
    let mut tools: Vec<Arc<dyn Tool>> = vec![
        // Filesystem
        Arc::new(ListDirectoryTool::new(Arc::clone(&workspace))),
        Arc::new(ReadFileTool::new(Arc::clone(&workspace))),
        Arc::new(ReadMultipleFilesTool::new(Arc::clone(&workspace))),
        Arc::new(FindFilesTool::new(Arc::clone(&workspace))),
        // Staging
        Arc::new(WriteFileTool::new(Arc::clone(&workspace))),
        Arc::new(ReplaceInFileTool::new(Arc::clone(&workspace))),
    ];

    // Context
    if workspace.index().is_some() {
        tools.push(Arc::new(IndexDirectoryTool::new(Arc::clone(&workspace))));
        tools.push(Arc::new(SearchCodebaseTool::new(workspace)));
    }

    tools
}
