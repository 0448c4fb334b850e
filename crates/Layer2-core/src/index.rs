//! Codebase Index - 시맨틱 검색 연동 지점
//!
//! 임베딩/벡터 DB는 외부 구현입니다. 이 crate는 인터페이스만 정의하고,
//! 구현이 주입된 경우에만 `index_directory`/`search_codebase` 도구를
//! 등록합니다.

use async_trait::async_trait;
use localhost_foundation::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 인덱싱 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub files: usize,
    pub chunks: usize,
}

impl fmt::Display for IndexSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chunks == 0 {
            f.write_str("No text files found to index.")
        } else {
            write!(
                f,
                "Indexed {} chunks from {} files.",
                self.chunks, self.files
            )
        }
    }
}

/// 검색 결과 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: PathBuf,
    pub chunk_id: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// 코드베이스 인덱스 인터페이스
#[async_trait]
pub trait CodebaseIndex: Send + Sync {
    /// 디렉토리를 재귀적으로 인덱싱 (기존 인덱스 교체)
    async fn index_directory(&self, root: &Path) -> Result<IndexSummary>;

    /// 시맨틱 검색
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// 인덱스 삭제
    async fn clear(&self) -> Result<()>;
}
