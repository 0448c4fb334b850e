//! Unified diff 생성

use similar::{ChangeTag, TextDiff};

/// 줄 단위 diff 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// unified diff 본문 (변경 없으면 빈 문자열)
    pub text: String,
    pub added: usize,
    pub removed: usize,
}

impl FileDiff {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// `a/<name>` → `b/<name>` 헤더의 unified diff
pub fn unified_diff(old: &str, new: &str, file_name: &str) -> FileDiff {
    let diff = TextDiff::from_lines(old, new);

    let (mut added, mut removed) = (0, 0);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }

    let text = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", file_name), &format!("b/{}", file_name))
        .to_string();

    FileDiff {
        text,
        added,
        removed,
    }
}
