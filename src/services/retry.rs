//! 重试装饰器 - 业务能力层
//!
//! 为任意异步调用提供两层可组合的重试能力：
//!
//! - `retry_on_error`：有界重试，只重试匹配器认可的错误，
//!   最多尝试 `max_attempts` 次，之后返回最后一次的错误
//! - `retry_on_rate_limit`：限流重试，按等待提示无限重试，
//!   没有等待提示的错误立即返回
//!
//! 组合顺序固定：限流重试在外层，有界重试在内层。限流可能出现在
//! 任何一次尝试上（包括格式错误的重试中），限流等待不消耗
//! 格式重试的次数预算。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// 有界重试
///
/// # 参数
/// - `max_attempts`: 最大尝试次数（含第一次调用）
/// - `callback`: 被包装的异步调用
/// - `error_matcher`: 返回 true 表示该错误可以重试
///
/// 匹配器不认可的错误立即返回，不消耗剩余的尝试次数；
/// 次数耗尽后返回最后一次的错误。
pub async fn retry_on_error<T, F, Fut, M>(
    max_attempts: usize,
    mut callback: F,
    error_matcher: M,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
    M: Fn(&AppError) -> bool,
{
    let mut attempts = 0;
    loop {
        match callback().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !error_matcher(&e) {
                    return Err(e);
                }
                attempts += 1;
                if attempts >= max_attempts {
                    warn!("重试 {} 次后仍然失败: {}", attempts, e);
                    return Err(e);
                }
                warn!("调用失败 (尝试 {}/{}): {}", attempts, max_attempts, e);
            }
        }
    }
}

/// 限流重试
///
/// # 参数
/// - `callback`: 被包装的异步调用
/// - `wait_provider`: 从错误中提取等待时长；返回正时长则等待后重试，
///   返回 None 或零时长则立即返回错误
///
/// 重试次数没有上限，限流等待不计入任何次数预算。
pub async fn retry_on_rate_limit<T, F, Fut, W>(mut callback: F, wait_provider: W) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
    W: Fn(&AppError) -> Option<Duration>,
{
    loop {
        match callback().await {
            Ok(value) => return Ok(value),
            Err(e) => match wait_provider(&e) {
                Some(wait) if !wait.is_zero() => {
                    info!("触发限流，等待 {:.1} 秒后重试...", wait.as_secs_f64());
                    sleep(wait).await;
                }
                _ => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn format_error() -> AppError {
        AppError::Provider(ProviderError::EmptyContent)
    }

    fn rate_limit_error(retry_after_ms: u64) -> AppError {
        AppError::Provider(ProviderError::RateLimited {
            retry_after_ms: Some(retry_after_ms),
        })
    }

    #[tokio::test]
    async fn test_retry_on_error_exhausts_attempts() {
        let calls = AtomicUsize::new(0);

        let result: AppResult<()> = retry_on_error(
            3,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(format_error()) }
            },
            AppError::is_transient_format,
        )
        .await;

        // 恰好调用 max_attempts 次
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_on_error_succeeds_mid_way() {
        let calls = AtomicUsize::new(0);

        let result = retry_on_error(
            3,
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 1 {
                        Err(format_error())
                    } else {
                        Ok(42)
                    }
                }
            },
            AppError::is_transient_format,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_on_error_rethrows_unmatched_immediately() {
        let calls = AtomicUsize::new(0);

        // 限流错误不在格式重试的范围内，第一次就应该被抛出
        let result: AppResult<()> = retry_on_error(
            5,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(rate_limit_error(100)) }
            },
            AppError::is_transient_format,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_rate_limit_waits_and_recovers() {
        let calls = AtomicUsize::new(0);
        let wait = Duration::from_secs(2);
        let started = tokio::time::Instant::now();

        // 前 5 次限流，第 6 次成功
        let result = retry_on_rate_limit(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 5 {
                        Err(rate_limit_error(2000))
                    } else {
                        Ok("done")
                    }
                }
            },
            |e: &AppError| e.rate_limit_wait(wait),
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        // 每次重试前都等满了提示的时长（模拟时钟）
        assert!(started.elapsed() >= wait * 5);
    }

    #[tokio::test]
    async fn test_retry_on_rate_limit_rethrows_without_wait() {
        let calls = AtomicUsize::new(0);

        let result: AppResult<()> = retry_on_rate_limit(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(format_error()) }
            },
            |e: &AppError| e.rate_limit_wait(Duration::from_secs(2)),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// 组合验证：限流在外、有界在内，限流不消耗格式重试预算
    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_outside_bounded_retry() {
        let calls = AtomicUsize::new(0);

        // 调用序列: 格式错误 → 限流 → 格式错误 → 成功
        // 若限流消耗了预算 (max_attempts=2)，第 3 次格式错误就会终止
        let result = retry_on_rate_limit(
            || {
                retry_on_error(
                    2,
                    || {
                        let attempt = calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            match attempt {
                                0 => Err(format_error()),
                                1 => Err(rate_limit_error(1000)),
                                2 => Err(format_error()),
                                _ => Ok("done"),
                            }
                        }
                    },
                    AppError::is_transient_format,
                )
            },
            |e: &AppError| e.rate_limit_wait(Duration::from_secs(1)),
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
