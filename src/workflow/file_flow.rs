//! 单文件迁移流程 - 流程层
//!
//! 核心职责：定义"一个文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 查询迁移状态，已完成的文件直接跳过（零次提供方调用）
//! 2. 读取源文件 → 组装器分块转换 → 全部分块成功才写回
//! 3. 无论成功失败，把结果记入状态存储
//!
//! 源文件只在整个分块序列全部校验通过后才会被改写；
//! 不存在产生"半个文件"的路径。

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{FileOutcome, TranslationKey};
use crate::services::{KeyArchive, ResponseAssembler, StatusStore};
use crate::utils::logging;
use crate::workflow::FileCtx;

/// 文件处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 迁移成功
    Migrated { key_count: usize },
    /// 已处理过，本次跳过
    Skipped,
    /// 迁移失败（源文件保持原样）
    Failed,
}

/// 单文件迁移流程
pub struct FileFlow {
    assembler: ResponseAssembler,
    status_store: Arc<StatusStore>,
    key_archive: Arc<KeyArchive>,
    verbose_logging: bool,
}

impl FileFlow {
    /// 创建文件迁移流程
    pub fn new(
        assembler: ResponseAssembler,
        status_store: Arc<StatusStore>,
        key_archive: Arc<KeyArchive>,
        config: &Config,
    ) -> Self {
        Self {
            assembler,
            status_store,
            key_archive,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理单个文件
    ///
    /// 文件内部的所有错误都在这里收口：转换失败只产生一条
    /// `migrated=false` 的记录，绝不中断调度器或其他文件。
    /// 返回 `Err` 仅代表状态落盘本身失败。
    pub async fn run(&self, ctx: &FileCtx) -> Result<ProcessResult> {
        // 幂等检查：已迁移的文件零次提供方调用
        if self.status_store.is_migrated(&ctx.file_path).await {
            info!("[文件 {}] ⏭️ 已迁移过，跳过: {}", ctx.file_index, ctx.file_path);
            return Ok(ProcessResult::Skipped);
        }

        match self.migrate_file(ctx).await {
            Ok(keys) => {
                let key_count = keys.len();

                // 归档失败不影响文件结果，只记录告警
                if let Err(e) = self.key_archive.save(&ctx.file_path, &keys).await {
                    tracing::warn!("[文件 {}] ⚠️ 键归档失败: {}", ctx.file_index, e);
                }

                self.status_store
                    .update(vec![FileOutcome::succeeded(ctx.file_path.clone(), keys)])
                    .await
                    .context("无法持久化迁移状态")?;

                info!(
                    "[文件 {}] ✅ 迁移完成，共提取 {} 个键",
                    ctx.file_index, key_count
                );
                Ok(ProcessResult::Migrated { key_count })
            }
            Err(e) => {
                error!("[文件 {}] ❌ 迁移失败: {}", ctx.file_index, e);

                self.status_store
                    .update(vec![FileOutcome::failed(ctx.file_path.clone())])
                    .await
                    .context("无法持久化迁移状态")?;

                Ok(ProcessResult::Failed)
            }
        }
    }

    /// 执行读取-转换-写回
    ///
    /// 任何一步失败，源文件保持原样。
    async fn migrate_file(&self, ctx: &FileCtx) -> AppResult<Vec<TranslationKey>> {
        let file_content = fs::read_to_string(&ctx.file_path)
            .await
            .map_err(|e| AppError::file_read_failed(&ctx.file_path, e))?;

        if self.verbose_logging {
            debug!(
                "[文件 {}] 源文件 {} 字符, 预览: {}",
                ctx.file_index,
                file_content.len(),
                logging::truncate_text(&file_content, 80)
            );
        }

        let assembled = self.assembler.assemble(&file_content, ctx).await?;

        fs::write(&ctx.file_path, &assembled.content)
            .await
            .map_err(|e| AppError::file_write_failed(&ctx.file_path, e))?;

        info!("[文件 {}] ✓ 文件已写回: {}", ctx.file_index, ctx.file_path);

        Ok(assembled.keys)
    }
}
