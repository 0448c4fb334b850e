//! Inference engine trait
//!
//! 추론 엔진은 대화 기록 전체를 받아 자유 텍스트 하나를 돌려주는
//! 불투명한 함수로 취급됩니다. 스트리밍은 없습니다.
//!
//! ## 에러 규약
//!
//! `generate`가 실패하면 `Error::Inference`를 반환하며, 이는
//! 추론 루프 전체를 중단시키는 유일한 에러입니다.

use async_trait::async_trait;
use localhost_foundation::config::{AgentSettings, ProviderSettings};
use localhost_foundation::{Message, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 생성 옵션 (엔진에 그대로 전달)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// 응답 최대 토큰
    pub max_tokens: u32,
    /// 샘플링 온도
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.2,
        }
    }
}

impl GenerationOptions {
    pub fn from_settings(agent: &AgentSettings, provider: &ProviderSettings) -> Self {
        Self {
            max_tokens: agent.max_tokens,
            temperature: provider.temperature,
        }
    }
}

/// 추론 엔진
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// 엔진 이름 (로그용)
    fn name(&self) -> &str;

    /// 대화 기록으로부터 completion 생성
    async fn generate(&self, history: &[Message]) -> Result<String>;
}

#[async_trait]
impl<E: InferenceEngine + ?Sized> InferenceEngine for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, history: &[Message]) -> Result<String> {
        (**self).generate(history).await
    }
}

#[async_trait]
impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, history: &[Message]) -> Result<String> {
        (**self).generate(history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl InferenceEngine for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, history: &[Message]) -> Result<String> {
            Ok(history
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_arc_dyn_engine() {
        let engine: Arc<dyn InferenceEngine> = Arc::new(Echo);
        let out = engine.generate(&[Message::user("ping")]).await.unwrap();
        assert_eq!(out, "ping");
        assert_eq!(engine.name(), "echo");
    }

    #[test]
    fn test_options_from_settings() {
        let opts = GenerationOptions::from_settings(
            &AgentSettings::default(),
            &ProviderSettings::default(),
        );
        assert_eq!(opts, GenerationOptions::default());
    }
}
