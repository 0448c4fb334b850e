//! Edit - 파일 변경 파이프라인
//!
//! - `format`: 쓰기 전 내용 정리 (ContentFormatter)
//! - `diff`: unified diff 생성
//! - `staging`: draft → approve 큐 (StagedEditStore)

pub mod diff;
pub mod format;
mod staging;

pub use diff::{unified_diff, FileDiff};
pub use format::{ContentFormatter, DefaultFormatter};
pub use staging::{
    ApplyResult, ApplyStatus, ApprovalReport, DraftReport, EditKind, PendingEdit,
    StagedEditStore, DEFAULT_SHRINK_GUARD_RATIO,
};
