//! Inference retry policy
//!
//! 로컬 추론 서버는 막 시작했을 때 연결을 거부하고, 모델을 메모리에 올리는
//! 동안에는 5xx나 타임아웃을 돌려줍니다. 이런 실패만 지수 backoff로 다시
//! 시도하고, 모델 없음/컨텍스트 초과/잘못된 요청은 바로 실패시킵니다.

use localhost_foundation::config::RetrySettings;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 추론 호출 실패의 성격
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 서버에 닿지 않음 (기동 중, 연결 거부)
    Unreachable,

    /// 서버가 바쁨 (모델 로딩, 5xx, 타임아웃)
    Busy,

    /// 서버가 대기를 요청함 (429)
    Throttled { wait: Option<Duration> },

    /// 다시 시도해도 결과가 같음
    Fatal,
}

impl FailureKind {
    pub fn is_transient(&self) -> bool {
        !matches!(self, FailureKind::Fatal)
    }
}

/// 재시도 판단을 위해 실패를 분류할 수 있는 에러
pub trait InferenceFailure {
    fn kind(&self) -> FailureKind;
}

/// Backoff 설정
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// 첫 시도 이후 추가 시도 횟수
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// 지연에 ±20% 흔들림 추가
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// 한 번만 시도
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// `attempt`번째 실패(0부터) 뒤의 대기 시간
    pub fn backoff(&self, attempt: u32) -> Duration {
        let scale = self.backoff_multiplier.max(1.0).powi(attempt as i32);
        let delay = self.initial_delay.mul_f64(scale).min(self.max_delay);
        if self.jitter {
            delay.mul_f64(jitter_factor())
        } else {
            delay
        }
    }

    /// 실패 종류에 맞는 대기 시간. 서버가 알려준 값이 있으면 그대로 따름
    fn delay_for(&self, kind: FailureKind, attempt: u32) -> Duration {
        match kind {
            FailureKind::Throttled { wait: Some(wait) } => wait.min(self.max_delay),
            _ => self.backoff(attempt),
        }
    }
}

/// 0.8 ~ 1.2
fn jitter_factor() -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    0.8 + f64::from(nanos % 1000) / 1000.0 * 0.4
}

/// 추론 호출을 정책에 따라 반복
///
/// 마지막 실패(또는 처음 만난 `Fatal`)를 그대로 돌려줍니다.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, label: &str, mut call: F) -> Result<T, E>
where
    E: InferenceFailure + fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let kind = err.kind();
        if !kind.is_transient() {
            debug!(label, attempt = attempt + 1, error = %err, "inference failed, not retrying");
            return Err(err);
        }
        if attempt >= config.max_retries {
            warn!(label, retries = config.max_retries, error = %err, "inference still failing, giving up");
            return Err(err);
        }

        let delay = config.delay_for(kind, attempt);
        warn!(
            label,
            attempt = attempt + 1,
            ?kind,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "inference failed, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(3000),
            jitter: false,
            ..fixed()
        };
        assert_eq!(config.backoff(0), Duration::from_millis(500));
        assert_eq!(config.backoff(1), Duration::from_millis(1000));
        assert_eq!(config.backoff(2), Duration::from_millis(2000));
        assert_eq!(config.backoff(5), Duration::from_millis(3000));
    }

    #[test]
    fn test_throttled_wait_is_honoured_but_capped() {
        let config = fixed();
        let wait = FailureKind::Throttled {
            wait: Some(Duration::from_millis(3)),
        };
        assert_eq!(config.delay_for(wait, 0), Duration::from_millis(3));

        let long = FailureKind::Throttled {
            wait: Some(Duration::from_secs(60)),
        };
        assert_eq!(config.delay_for(long, 0), Duration::from_millis(5));
    }

    #[test]
    fn test_from_settings() {
        let config = RetryConfig::from(&RetrySettings::default());
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.initial_delay, Duration::from_millis(500));
        assert_eq!(config.max_delay, Duration::from_millis(8_000));
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
    }

    #[derive(Debug)]
    struct Failure(FailureKind);

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl InferenceFailure for Failure {
        fn kind(&self) -> FailureKind {
            self.0
        }
    }

    #[tokio::test]
    async fn test_server_warming_up_then_answers() {
        let mut calls = 0;
        let result: Result<u32, Failure> = with_retry(&fixed(), "chat", || {
            calls += 1;
            let n = calls;
            async move {
                match n {
                    1 => Err(Failure(FailureKind::Unreachable)),
                    2 => Err(Failure(FailureKind::Busy)),
                    _ => Ok(n),
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), Failure> = with_retry(&fixed(), "chat", || {
            calls += 1;
            async { Err(Failure(FailureKind::Busy)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_fatal_failure_not_retried() {
        let mut calls = 0;
        let result: Result<(), Failure> = with_retry(&fixed(), "chat", || {
            calls += 1;
            async { Err(Failure(FailureKind::Fatal)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
