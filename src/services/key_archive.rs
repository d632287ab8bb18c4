//! 键归档 - 业务能力层
//!
//! 把每个成功文件提取出的键合并进 all-keys.json，供 `upload`
//! 命令统一导入翻译后台。归档只是辅助产物：内容损坏时重新初始化，
//! 不影响迁移结果的事实来源（状态存储）。

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, StatusError};
use crate::models::TranslationKey;

/// 归档文件名（位于状态目录下）
pub const ALL_KEYS_FILE_NAME: &str = "all-keys.json";

/// 归档的磁盘结构：文件路径 → 该文件的键列表
type ArchiveMap = HashMap<String, Vec<TranslationKey>>;

/// 键归档
pub struct KeyArchive {
    status_dir: PathBuf,
    archive_file: PathBuf,
    lock: Mutex<()>,
}

impl KeyArchive {
    pub fn new(status_dir: impl Into<PathBuf>) -> Self {
        let status_dir = status_dir.into();
        let archive_file = status_dir.join(ALL_KEYS_FILE_NAME);
        Self {
            status_dir,
            archive_file,
            lock: Mutex::new(()),
        }
    }

    /// 合并某个文件的键
    ///
    /// 同一文件内按键名去重，已有条目保留；整个读-改-写过程
    /// 持有锁，并发保存不会互相覆盖。
    pub async fn save(&self, file_path: &str, keys: &[TranslationKey]) -> AppResult<()> {
        let _guard = self.lock.lock().await;

        let mut archive = self.load_map().await;
        let entry = archive.entry(file_path.to_string()).or_default();
        for key in keys {
            if !entry.iter().any(|existing| existing.name == key.name) {
                entry.push(key.clone());
            }
        }

        debug!("归档 {} 的 {} 个键", file_path, keys.len());
        self.persist(&archive).await
    }

    /// 读取归档中的全部键（按文件路径排序后摊平）
    pub async fn load_all(&self) -> AppResult<Vec<TranslationKey>> {
        let _guard = self.lock.lock().await;

        let archive = self.load_map().await;
        let mut file_paths: Vec<&String> = archive.keys().collect();
        file_paths.sort();

        Ok(file_paths
            .into_iter()
            .flat_map(|path| archive[path].iter().cloned())
            .collect())
    }

    /// 读取归档内容；文件缺失视为空，内容损坏时告警并重新初始化
    async fn load_map(&self) -> ArchiveMap {
        let content = match fs::read_to_string(&self.archive_file).await {
            Ok(content) => content,
            Err(_) => return ArchiveMap::new(),
        };

        if content.trim().is_empty() {
            return ArchiveMap::new();
        }

        match serde_json::from_str(&content) {
            Ok(archive) => archive,
            Err(e) => {
                warn!(
                    "归档文件 {} 内容损坏，重新初始化: {}",
                    self.archive_file.display(),
                    e
                );
                ArchiveMap::new()
            }
        }
    }

    async fn persist(&self, archive: &ArchiveMap) -> AppResult<()> {
        fs::create_dir_all(&self.status_dir).await.map_err(|e| {
            AppError::Status(StatusError::StorageUnavailable {
                path: self.status_dir.display().to_string(),
                source: Box::new(e),
            })
        })?;

        let serialized = serde_json::to_string_pretty(archive).map_err(|e| {
            AppError::Status(StatusError::PersistFailed {
                path: self.archive_file.display().to_string(),
                source: Box::new(e),
            })
        })?;

        fs::write(&self.archive_file, serialized).await.map_err(|e| {
            AppError::Status(StatusError::PersistFailed {
                path: self.archive_file.display().to_string(),
                source: Box::new(e),
            })
        })
    }
}
