//! # localhost-foundation
//!
//! Foundation layer for Localhost:
//! - Core: 핵심 Trait 및 타입 (Tool, ToolArgs, Message)
//! - Permission: PathSandbox (시스템 경로 차단, 프로젝트 루트 쓰기 제한)
//! - Storage: JsonStore (설정 파일)
//! - Config: 통합 설정 (LocalhostConfig, ConfigLoader)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Tool Registry (Layer2-core)                            │
//! │  ├── Read tools (list/read/find)                        │
//! │  └── Staged tools (write_file, replace_in_file)         │
//! │                     │                                   │
//! │                     ▼                                   │
//! │          PathSandbox (READ / WRITE)                     │
//! │                     │                                   │
//! │          ┌─────────┴─────────┐                          │
//! │          ▼                   ▼                          │
//! │     Filesystem        StagedEditStore                   │
//! │                       (draft → /approve)                │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod permission;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result, SecurityViolation};

// ============================================================================
// Core (핵심 Trait 및 타입)
// ============================================================================
pub use core::{
    // Types (types.rs)
    Message,
    MessageRole,
    ToolArg,
    ToolArgs,
    // Traits (traits.rs)
    Arity,
    Tool,
    ToolMeta,
    ToolOutput,
};

// ============================================================================
// Permission
// ============================================================================
pub use permission::{Operation, PathSandbox, RootChange};

// ============================================================================
// Storage & Config
// ============================================================================
pub use config::{ConfigLoader, LocalhostConfig};
pub use storage::JsonStore;
