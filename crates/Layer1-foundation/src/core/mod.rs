//! Core Module - 핵심 인터페이스 및 타입
//!
//! ## 타입 계층
//!
//! - `types.rs`: 데이터 타입 (Message, ToolArg, ToolArgs)
//! - `traits.rs`: 인터페이스 (Tool, ToolMeta, Arity)

pub mod traits;
pub mod types;

// Message & Role
pub use types::{Message, MessageRole};

// Tool Arguments
pub use types::{ToolArg, ToolArgs};

// Tool trait & related
pub use traits::{Arity, Tool, ToolMeta, ToolOutput};
