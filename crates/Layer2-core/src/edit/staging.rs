//! StagedEditStore - draft → approve 변경 프로토콜
//!
//! 쓰기 도구는 디스크를 직접 건드리지 않고 `PendingEdit`을 큐에 쌓습니다.
//! 사용자가 `/approve`를 입력해야 큐의 내용이 순서대로 디스크에 반영됩니다.
//!
//! ## 불변식
//!
//! - 승인 전에는 어떤 편집도 디스크에 닿지 않음
//! - 같은 경로에 여러 편집이 쌓일 수 있고, 승인 시 삽입 순서대로 적용
//! - 승인은 파일별로 독립적 (N번째 실패가 1..N-1을 되돌리지 않음)
//! - 승인 후 큐는 성공/실패와 무관하게 비워짐

use super::diff::{unified_diff, FileDiff};
use super::format::{ContentFormatter, DefaultFormatter};
use chrono::{DateTime, Utc};
use localhost_foundation::permission::path;
use localhost_foundation::{Error, Operation, PathSandbox, Result, SecurityViolation};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 기본 덮어쓰기 보호 비율
pub const DEFAULT_SHRINK_GUARD_RATIO: f64 = 0.70;

// ============================================================================
// Types
// ============================================================================

/// 편집 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// 전체 내용 교체 (write_file)
    Write,
    /// 블록 치환 (replace_in_file)
    PartialReplace,
}

/// 승인 대기 중인 편집
#[derive(Debug, Clone)]
pub struct PendingEdit {
    /// 검증된 절대 경로
    pub path: PathBuf,
    /// 승인 시 쓰여질 전체 내용
    pub content: String,
    pub kind: EditKind,
    pub diff: FileDiff,
    pub proposed_at: DateTime<Utc>,
}

impl PendingEdit {
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// 제안 결과 (모델에게 보여줄 draft 보고서)
#[derive(Debug, Clone)]
pub struct DraftReport {
    pub path: PathBuf,
    pub kind: EditKind,
    pub diff: FileDiff,
    /// 제안 후 큐 길이
    pub pending: usize,
}

impl fmt::Display for DraftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = display_name(&self.path);
        match self.kind {
            EditKind::Write => writeln!(f, "📝 DRAFT CREATED for {}", name)?,
            EditKind::PartialReplace => writeln!(f, "📝 DRAFT (Partial) CREATED for {}", name)?,
        }
        writeln!(f, "TYPE: /approve TO APPLY.")?;
        writeln!(f)?;
        writeln!(f, "DIFF:")?;
        if self.diff.is_empty() {
            writeln!(f, "(no changes)")?;
        } else {
            write!(f, "{}", self.diff.text)?;
        }
        writeln!(f)?;
        write!(
            f,
            "[SYSTEM WARNING: This is a DRAFT. Do NOT tell the user it is applied. \
             Tell them it is PENDING approval.]"
        )
    }
}

/// 파일별 승인 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStatus {
    Applied,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub path: PathBuf,
    pub status: ApplyStatus,
}

impl ApplyResult {
    pub fn is_applied(&self) -> bool {
        self.status == ApplyStatus::Applied
    }
}

/// 승인 결과 전체
#[derive(Debug, Clone, Default)]
pub struct ApprovalReport {
    pub results: Vec<ApplyResult>,
}

impl ApprovalReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn applied(&self) -> usize {
        self.results.iter().filter(|r| r.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.applied()
    }
}

impl fmt::Display for ApprovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.results.is_empty() {
            return f.write_str("No pending edits.");
        }
        let lines: Vec<String> = self
            .results
            .iter()
            .map(|r| match &r.status {
                ApplyStatus::Applied => format!("✅ Applied: {}", display_name(&r.path)),
                ApplyStatus::Failed(reason) => {
                    format!("❌ Failed: {} ({})", display_name(&r.path), reason)
                }
            })
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

// ============================================================================
// StagedEditStore
// ============================================================================

/// 승인 대기 편집 저장소
pub struct StagedEditStore {
    sandbox: Arc<PathSandbox>,
    formatter: Arc<dyn ContentFormatter>,
    shrink_guard_ratio: f64,
    queue: Mutex<Vec<PendingEdit>>,
}

impl StagedEditStore {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self {
            sandbox,
            formatter: Arc::new(DefaultFormatter::new()),
            shrink_guard_ratio: DEFAULT_SHRINK_GUARD_RATIO,
            queue: Mutex::new(Vec::new()),
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn ContentFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_shrink_guard_ratio(mut self, ratio: f64) -> Self {
        self.shrink_guard_ratio = ratio;
        self
    }

    pub fn sandbox(&self) -> &Arc<PathSandbox> {
        &self.sandbox
    }

    // ========================================================================
    // Propose
    // ========================================================================

    /// 전체 내용 교체 제안
    ///
    /// 포맷 → diff → 덮어쓰기 보호 → 큐 추가. 보호에 걸리면 큐는 그대로입니다.
    pub fn propose_write(&self, target: impl AsRef<Path>, content: &str) -> Result<DraftReport> {
        let mut queue = self.queue.lock();
        let path = self.sandbox.validate_path(target, Operation::Write)?;

        let content = self.formatter.format(content, &path);
        let old = if path.exists() {
            let old = read_existing(&path)?;
            self.check_shrink(&path, &old, &content)?;
            old
        } else {
            String::new()
        };

        let diff = unified_diff(&old, &content, &display_name(&path));
        Ok(Self::enqueue(&mut queue, path, content, EditKind::Write, diff))
    }

    /// 블록 치환 제안 (첫 번째 일치만)
    pub fn propose_partial_replace(
        &self,
        target: impl AsRef<Path>,
        search: &str,
        replacement: &str,
    ) -> Result<DraftReport> {
        let mut queue = self.queue.lock();
        let path = self.sandbox.validate_path(target.as_ref(), Operation::Write)?;

        if !path.is_file() {
            return Err(Error::NotFound(format!(
                "File not found: {}",
                target.as_ref().display()
            )));
        }
        if search.is_empty() {
            return Err(Error::InvalidInput(
                "Search block must not be empty".to_string(),
            ));
        }

        let original = read_existing(&path)?;
        if !original.contains(search) {
            if matches_ignoring_whitespace(&original, search) {
                return Err(Error::WhitespaceMismatch { path });
            }
            return Err(Error::TargetNotFound { path });
        }

        let updated = original.replacen(search, replacement, 1);
        let diff = unified_diff(&original, &updated, &display_name(&path));
        Ok(Self::enqueue(
            &mut queue,
            path,
            updated,
            EditKind::PartialReplace,
            diff,
        ))
    }

    fn enqueue(
        queue: &mut Vec<PendingEdit>,
        path: PathBuf,
        content: String,
        kind: EditKind,
        diff: FileDiff,
    ) -> DraftReport {
        info!(
            path = %path.display(),
            added = diff.added,
            removed = diff.removed,
            "Draft staged"
        );
        queue.push(PendingEdit {
            path: path.clone(),
            content,
            kind,
            diff: diff.clone(),
            proposed_at: Utc::now(),
        });
        DraftReport {
            path,
            kind,
            diff,
            pending: queue.len(),
        }
    }

    fn check_shrink(&self, path: &Path, old: &str, new: &str) -> Result<()> {
        let old_len = old.chars().count();
        let new_len = new.chars().count();

        if (new_len as f64) < (old_len as f64) * self.shrink_guard_ratio {
            let removed_chars = old_len - new_len;
            let percent = ((1.0 - new_len as f64 / old_len as f64) * 100.0) as u32;
            warn!(
                path = %path.display(),
                removed_chars,
                percent,
                "Refusing destructive overwrite"
            );
            return Err(Error::MutationRefused {
                path: path.to_path_buf(),
                removed_chars,
                percent,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Approve / Discard
    // ========================================================================

    /// 큐의 모든 편집을 순서대로 적용
    ///
    /// 각 경로는 적용 직전 WRITE 범위를 다시 검증합니다.
    pub fn approve_all(&self) -> ApprovalReport {
        let mut queue = self.queue.lock();
        let edits: Vec<PendingEdit> = queue.drain(..).collect();

        let results = edits
            .into_iter()
            .map(|edit| {
                let status = match self.apply(&edit) {
                    Ok(()) => {
                        info!(path = %edit.path.display(), "Edit applied");
                        ApplyStatus::Applied
                    }
                    Err(e) => {
                        warn!(path = %edit.path.display(), error = %e, "Edit failed");
                        ApplyStatus::Failed(e.to_string())
                    }
                };
                ApplyResult {
                    path: edit.path,
                    status,
                }
            })
            .collect();

        ApprovalReport { results }
    }

    fn apply(&self, edit: &PendingEdit) -> Result<()> {
        let path = self.sandbox.validate_path(&edit.path, Operation::Write)?;
        // 검증 이후 링크로 바뀐 경로는 따라가지 않음
        for candidate in [&edit.path, &path] {
            if path::is_symlink(candidate) {
                return Err(SecurityViolation::SymlinkTarget {
                    path: candidate.clone(),
                }
                .into());
            }
        }
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&path, &edit.content)?;
        Ok(())
    }

    /// 쓰지 않고 큐 비우기
    pub fn discard_all(&self) -> usize {
        let mut queue = self.queue.lock();
        Self::discard_locked(&mut queue)
    }

    fn discard_locked(queue: &mut Vec<PendingEdit>) -> usize {
        let dropped = queue.len();
        queue.clear();
        if dropped > 0 {
            info!(dropped, "Pending edits discarded");
        }
        dropped
    }

    /// 큐 잠금 상태에서 실행 후 큐 비우기
    ///
    /// 루트 변경과 큐 변경을 직렬화할 때 사용합니다.
    pub fn discard_after<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<(R, usize)> {
        let mut queue = self.queue.lock();
        let value = f()?;
        Ok((value, Self::discard_locked(&mut queue)))
    }

    // ========================================================================
    // Inspect
    // ========================================================================

    pub fn pending(&self) -> Vec<PendingEdit> {
        self.queue.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl fmt::Debug for StagedEditStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedEditStore")
            .field("pending", &self.len())
            .field("shrink_guard_ratio", &self.shrink_guard_ratio)
            .finish()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_existing(path: &Path) -> Result<String> {
    if path.is_dir() {
        return Err(Error::InvalidInput(format!(
            "{} is a directory",
            path.display()
        )));
    }
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => Error::InvalidInput(format!(
            "Cannot read existing file {} (binary?)",
            path.display()
        )),
        _ => Error::Io(e),
    })
}

/// 공백을 무시하면 일치하는지
fn matches_ignoring_whitespace(haystack: &str, needle: &str) -> bool {
    let trimmed = needle.trim();
    if trimmed.is_empty() {
        return false;
    }
    if haystack.contains(trimmed) {
        return true;
    }
    let collapse = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapse(haystack).contains(&collapse(needle))
}
