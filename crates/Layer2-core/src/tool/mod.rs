//! Tool System - Agent가 사용하는 도구 시스템
//!
//! Layer1의 Tool trait을 구현하고, ToolRegistry로 도구를 관리합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ToolRegistry                                               │
//! │  ├── register(tool) - 도구 등록 (순서 유지)                 │
//! │  ├── descriptions() - 시스템 프롬프트용 설명                │
//! │  └── execute(name, args) - 인자 개수 검사 후 실행           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Workspace (모든 도구가 공유)                               │
//! │  ├── PathSandbox - READ/WRITE 검증                          │
//! │  ├── StagedEditStore - draft 큐                             │
//! │  └── CodebaseIndex (선택)                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Builtin Tools (Tool trait 구현)                            │
//! │  ├── list_directory / read_file / read_multiple_files       │
//! │  ├── find_files                                             │
//! │  ├── write_file / replace_in_file (draft)                   │
//! │  └── index_directory / search_codebase                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use localhost_core::{ToolRegistry, Workspace};
//! use std::sync::Arc;
//!
//! let workspace = Arc::new(Workspace::from_config(&config));
//! let registry = ToolRegistry::with_builtins(Arc::clone(&workspace));
//!
//! let output = registry.execute("list_directory", vec!["~/code".into()]).await?;
//! ```

pub mod builtin;
mod registry;

pub use registry::ToolRegistry;
