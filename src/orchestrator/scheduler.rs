//! 任务调度器 - 编排层
//!
//! 共享队列 + N 个 worker 循环的有界并发：每个 worker 取走下一个
//! 待处理文件，跑完整个 FileFlow 后立刻取下一个；队列取空且所有
//! worker 结束后调度完成。单个文件失败不会取消或阻塞其他文件。

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::error;

use crate::error::{AppError, AppResult, ConfigError};
use crate::workflow::{FileCtx, FileFlow, ProcessResult};

/// 运行统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

/// 任务调度器
pub struct TaskScheduler {
    concurrency: usize,
}

impl TaskScheduler {
    /// 创建调度器
    ///
    /// 并发数必须大于 0，否则是配置错误。
    pub fn new(concurrency: usize) -> AppResult<Self> {
        if concurrency == 0 {
            return Err(AppError::Config(ConfigError::InvalidConcurrency {
                value: concurrency,
            }));
        }
        Ok(Self { concurrency })
    }

    /// 处理整个文件列表
    ///
    /// 每个文件恰好被取走一次；同一时刻最多 `concurrency` 个文件
    /// 在处理中。空列表立即完成，不触碰状态存储。
    pub async fn run(&self, files: Vec<String>, flow: Arc<FileFlow>) -> RunStats {
        let total = files.len();
        if total == 0 {
            return RunStats::default();
        }

        let queue: Arc<Mutex<VecDeque<FileCtx>>> = Arc::new(Mutex::new(
            files
                .into_iter()
                .enumerate()
                .map(|(index, path)| FileCtx::new(path, index + 1))
                .collect(),
        ));

        let worker_count = self.concurrency.min(total);
        let mut handles = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let flow = Arc::clone(&flow);

            handles.push(tokio::spawn(async move {
                let mut stats = RunStats::default();
                loop {
                    // 锁只覆盖出队操作，处理过程不持锁
                    let next = { queue.lock().await.pop_front() };
                    let ctx = match next {
                        Some(ctx) => ctx,
                        None => break,
                    };

                    match flow.run(&ctx).await {
                        Ok(ProcessResult::Migrated { .. }) => stats.migrated += 1,
                        Ok(ProcessResult::Skipped) => stats.skipped += 1,
                        Ok(ProcessResult::Failed) => stats.failed += 1,
                        Err(e) => {
                            error!(
                                "[worker {}] 文件 {} 状态落盘失败: {}",
                                worker_id, ctx.file_path, e
                            );
                            stats.failed += 1;
                        }
                    }
                }
                stats
            }));
        }

        let mut stats = RunStats {
            total,
            ..RunStats::default()
        };

        for joined in join_all(handles).await {
            match joined {
                Ok(worker_stats) => {
                    stats.migrated += worker_stats.migrated;
                    stats.skipped += worker_stats.skipped;
                    stats.failed += worker_stats.failed;
                }
                Err(e) => error!("worker 任务执行失败: {}", e),
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_concurrency_is_config_error() {
        let result = TaskScheduler::new(0);
        assert!(matches!(
            result.err(),
            Some(AppError::Config(ConfigError::InvalidConcurrency { value: 0 }))
        ));
    }

    #[test]
    fn test_positive_concurrency_accepted() {
        assert!(TaskScheduler::new(1).is_ok());
        assert!(TaskScheduler::new(100).is_ok());
    }
}
