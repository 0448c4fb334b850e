//! Permission system for Localhost
//!
//! - `sandbox`: READ/WRITE 경로 경계 (PathSandbox)
//! - `path`: 경로 해석 유틸리티 (`~` 확장, 심볼릭 링크 해석)
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use localhost_foundation::permission::{Operation, PathSandbox};
//!
//! let sandbox = PathSandbox::new();
//! sandbox.set_project_root(Some(Path::new("~/code/app")))?;
//!
//! // 프로젝트 밖 쓰기는 SecurityError
//! let target = sandbox.validate_path("src/main.rs", Operation::Write)?;
//! ```

pub mod path;
mod sandbox;

pub use sandbox::{Operation, PathSandbox, RootChange, DEFAULT_BLOCKED_PREFIXES};
