//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：构造提供方、预设、状态存储等所有部件；
//!    配置错误（凭据缺失、预设非法、并发数为 0）在这里立刻失败，
//!    不处理任何文件
//! 2. **迁移命令**：git 检查 → 扫描文件 → 加载状态 → 调度处理 →
//!    输出全局统计
//! 3. **状态命令**：查看单个文件或全部迁移记录
//! 4. **上传命令**：把归档的键导入翻译后台

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::orchestrator::scheduler::TaskScheduler;
use crate::presets::resolve_preset;
use crate::providers::{create_response_provider, PromptsProvider};
use crate::services::{FileFinder, KeyArchive, ResponseAssembler, StatusStore, UploadClient};
use crate::utils::{git, logging};
use crate::workflow::FileFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<FileFlow>,
    status_store: Arc<StatusStore>,
    scheduler: TaskScheduler,
    finder: FileFinder,
}

impl App {
    /// 初始化应用
    ///
    /// 提供方选择、预设校验和并发数校验都发生在这里（快速失败）。
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        // 一次性构造提供方：凭据不完整立即失败
        let provider = create_response_provider(&config)?;

        // 加载并校验预设（内置名称或 .toml 文件路径）
        let preset = resolve_preset(&config.preset)?;
        info!("使用预设: {}", preset.name);

        let prompt_appendix = load_prompt_appendix(config.prompt_appendix_path.as_deref())?;
        let prompts = PromptsProvider::new(preset, prompt_appendix);

        let status_store = Arc::new(StatusStore::new(&config.status_dir));
        let key_archive = Arc::new(KeyArchive::new(&config.status_dir));
        let assembler = ResponseAssembler::new(provider, prompts, &config);
        let flow = Arc::new(FileFlow::new(
            assembler,
            Arc::clone(&status_store),
            key_archive,
            &config,
        ));
        let scheduler = TaskScheduler::new(config.max_concurrent_files)?;
        let finder = FileFinder::new(&config);

        Ok(Self {
            config,
            flow,
            status_store,
            scheduler,
            finder,
        })
    }

    /// 执行迁移
    pub async fn run_migrate(&self) -> Result<()> {
        logging::log_startup(
            self.config.max_concurrent_files,
            self.config.chunk_size_lines,
        );

        // 迁移会直接改写源文件，要求工作区干净以便随时回滚
        if self.config.require_clean_git {
            if !git::check_git_clean()? {
                anyhow::bail!("迁移要求干净的 git 工作区，请先提交或暂存当前改动");
            }
        }
        git::ensure_dir_ignored(&self.config.status_dir)?;

        // 扫描待迁移文件
        let files = self
            .finder
            .find_files(&self.config.scan_root)
            .context("扫描待迁移文件失败")?;

        if files.is_empty() {
            warn!("⚠️ 没有找到待迁移的文件，程序结束");
            return Ok(());
        }

        // 启动时整体加载一次迁移状态（损坏的状态文件在这里直接报错）
        self.status_store.load().await?;

        logging::log_files_found(files.len(), self.config.max_concurrent_files);

        // 调度处理全部文件
        let stats = self.scheduler.run(files, Arc::clone(&self.flow)).await;

        logging::print_final_stats(
            stats.migrated,
            stats.skipped,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(())
    }
}

/// 查看迁移状态
///
/// 独立于 `App`：状态查询不需要模型凭据。
pub async fn show_status(config: &Config, target: Option<&str>, show_all: bool) -> Result<()> {
    let status_store = StatusStore::new(&config.status_dir);
    let status = status_store.load().await?;

    if show_all {
        info!("完整迁移状态（共 {} 个文件）:", status.len());
        let mut file_paths: Vec<&String> = status.keys().collect();
        file_paths.sort();
        for file_path in file_paths {
            let record = &status[file_path];
            info!(
                "  {} → migrated={}, 键数量={}",
                file_path,
                record.migrated,
                record.keys.len()
            );
        }
        return Ok(());
    }

    match target {
        Some(file_path) => match status.get(file_path) {
            Some(record) => {
                info!(
                    "{} 的迁移状态: migrated={}, 键数量={}",
                    file_path,
                    record.migrated,
                    record.keys.len()
                );
                for key in &record.keys {
                    info!("  - {} ({})", key.name, key.default);
                }
            }
            None => info!("{} 还没有被迁移", file_path),
        },
        None => info!("请指定要查询的文件，或使用 --all 查看全部状态"),
    }

    Ok(())
}

/// 上传归档的键到翻译后台
pub async fn upload_archived_keys(config: &Config) -> Result<()> {
    let key_archive = KeyArchive::new(&config.status_dir);
    let keys = key_archive.load_all().await?;

    if keys.is_empty() {
        info!("归档中没有键，无需上传");
        return Ok(());
    }

    info!("📤 正在上传 {} 个键...", keys.len());
    let upload_client = UploadClient::new(config);
    let result = upload_client.upload_keys(&keys).await;

    if result.success {
        info!("✅ {}", result.message);
        Ok(())
    } else {
        anyhow::bail!("上传失败: {}", result.message)
    }
}

/// 读取追加提示词文件（未配置时返回空字符串）
fn load_prompt_appendix(path: Option<&str>) -> Result<String> {
    match path {
        None => Ok(String::new()),
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("无法读取追加提示词文件: {}", path)),
    }
}
