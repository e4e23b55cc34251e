//! 供功能实现使用的异步重试（指数退避）

use log::warn;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryPolicy;
use crate::error::{FeatResult, PageFeatError};

/// 退避上限
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 第 attempt 次重试前的等待时间：base * 2^attempt，不超过 MAX_BACKOFF
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

/// 按策略重试异步操作，返回成功结果或最后一次错误
pub async fn retry_with_backoff<F, Fut, T>(policy: RetryPolicy, base_delay: Duration, mut func: F) -> FeatResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FeatResult<T>>,
{
    let max_retries = policy.max_retries();
    let mut last_err: Option<PageFeatError> = None;

    for attempt in 0..=max_retries {
        match func().await {
            Ok(res) => return Ok(res),
            Err(e) => {
                if attempt < max_retries {
                    let delay = backoff_delay(base_delay, attempt as u32);
                    warn!("操作失败：{}，{:?} 后重试（{}/{}）", e, delay, attempt + 1, max_retries);
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| PageFeatError::AsyncTaskError("重试次数已耗尽".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_backoff_grows_and_caps() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
        assert_eq!(backoff_delay(base, 40), MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_failures() {
        let calls = AtomicUsize::new(0);
        let result = retry_with_backoff(RetryPolicy::Times(3), Duration::from_millis(10), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PageFeatError::CollaboratorError("busy".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_never_policy_returns_first_error() {
        let calls = AtomicUsize::new(0);
        let result: FeatResult<()> = retry_with_backoff(RetryPolicy::Never, Duration::from_millis(10), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(PageFeatError::CollaboratorError("down".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(PageFeatError::CollaboratorError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
