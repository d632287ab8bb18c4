//! 迁移状态存储 - 业务能力层
//!
//! 迁移结果的唯一事实来源。运行开始时整体加载一次，每个文件
//! 处理完成后应用一批结果并把完整映射整体落盘。所有修改都通过
//! 同一把锁串行化，并发完成的文件不会互相丢失更新。

use std::path::PathBuf;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult, StatusError};
use crate::models::{FileOutcome, MigrationRecord, MigrationStatus};

/// 状态文件名（位于状态目录下）
pub const STATUS_FILE_NAME: &str = "migration-status.json";

/// 迁移状态存储
pub struct StatusStore {
    status_dir: PathBuf,
    status_file: PathBuf,
    state: Mutex<MigrationStatus>,
}

impl StatusStore {
    /// 创建状态存储（不触碰磁盘，加载由 `load` 完成）
    pub fn new(status_dir: impl Into<PathBuf>) -> Self {
        let status_dir = status_dir.into();
        let status_file = status_dir.join(STATUS_FILE_NAME);
        Self {
            status_dir,
            status_file,
            state: Mutex::new(MigrationStatus::new()),
        }
    }

    /// 加载迁移状态
    ///
    /// 目录和状态文件不存在时自动创建；文件为空视为没有历史；
    /// 文件内容损坏则直接报错，绝不伪装成"无历史"。
    pub async fn load(&self) -> AppResult<MigrationStatus> {
        fs::create_dir_all(&self.status_dir)
            .await
            .map_err(|e| self.storage_unavailable(e))?;

        if fs::metadata(&self.status_file).await.is_err() {
            fs::write(&self.status_file, "{}")
                .await
                .map_err(|e| self.persist_failed(e))?;
        }

        let content = fs::read_to_string(&self.status_file)
            .await
            .map_err(|e| self.storage_unavailable(e))?;

        let status: MigrationStatus = if content.trim().is_empty() {
            MigrationStatus::new()
        } else {
            serde_json::from_str(&content).map_err(|e| {
                AppError::Status(StatusError::Corrupted {
                    path: self.status_file.display().to_string(),
                    source: Box::new(e),
                })
            })?
        };

        debug!("已加载迁移状态，共 {} 条记录", status.len());

        let mut state = self.state.lock().await;
        *state = status.clone();
        Ok(status)
    }

    /// 查询某个文件是否已经迁移完成
    pub async fn is_migrated(&self, file_path: &str) -> bool {
        let state = self.state.lock().await;
        state
            .get(file_path)
            .map(|record| record.migrated)
            .unwrap_or(false)
    }

    /// 查询单个文件的迁移记录
    pub async fn record_of(&self, file_path: &str) -> Option<MigrationRecord> {
        let state = self.state.lock().await;
        state.get(file_path).cloned()
    }

    /// 应用一批文件处理结果并整体持久化
    ///
    /// 整个读-改-写-落盘过程持有同一把锁，并发调用之间串行执行。
    pub async fn update(&self, outcomes: Vec<FileOutcome>) -> AppResult<()> {
        let mut state = self.state.lock().await;

        for outcome in outcomes {
            debug!(
                "更新迁移记录: {} (成功: {})",
                outcome.file_path, outcome.success
            );
            state.insert(
                outcome.file_path,
                MigrationRecord {
                    migrated: outcome.success,
                    keys: outcome.keys,
                },
            );
        }

        let serialized =
            serde_json::to_string_pretty(&*state).map_err(|e| self.persist_failed(e))?;
        fs::write(&self.status_file, serialized)
            .await
            .map_err(|e| self.persist_failed(e))?;

        Ok(())
    }

    fn storage_unavailable(&self, source: impl std::error::Error + Send + Sync + 'static) -> AppError {
        AppError::Status(StatusError::StorageUnavailable {
            path: self.status_dir.display().to_string(),
            source: Box::new(source),
        })
    }

    fn persist_failed(&self, source: impl std::error::Error + Send + Sync + 'static) -> AppError {
        AppError::Status(StatusError::PersistFailed {
            path: self.status_file.display().to_string(),
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranslationKey;
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn store_in(dir: &tempfile::TempDir) -> StatusStore {
        StatusStore::new(dir.path().join(".i18n-migrator"))
    }

    #[tokio::test]
    async fn test_load_creates_empty_status_file() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let store = store_in(&dir);

        let status = store.load().await.expect("加载失败");

        assert!(status.is_empty());
        // 状态文件已创建
        let content =
            std::fs::read_to_string(dir.path().join(".i18n-migrator/migration-status.json"))
                .expect("状态文件应当存在");
        assert_eq!(content, "{}");
    }

    #[tokio::test]
    async fn test_load_tolerates_empty_file() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let status_dir = dir.path().join(".i18n-migrator");
        std::fs::create_dir_all(&status_dir).expect("创建目录失败");
        std::fs::write(status_dir.join(STATUS_FILE_NAME), "  \n").expect("写入失败");

        let store = store_in(&dir);
        let status = store.load().await.expect("空文件应当视为无历史");
        assert!(status.is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_corrupted_file() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let status_dir = dir.path().join(".i18n-migrator");
        std::fs::create_dir_all(&status_dir).expect("创建目录失败");
        std::fs::write(status_dir.join(STATUS_FILE_NAME), "{ 这不是合法的 JSON")
            .expect("写入失败");

        let store = store_in(&dir);
        let result = store.load().await;

        // 损坏的状态文件必须显式报错
        assert!(matches!(
            result,
            Err(AppError::Status(StatusError::Corrupted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_update_persists_whole_mapping() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let store = store_in(&dir);
        store.load().await.expect("加载失败");

        let keys = vec![TranslationKey::new("greeting", "Greeting", "Hello")];
        store
            .update(vec![FileOutcome::succeeded("src/App.tsx", keys)])
            .await
            .expect("更新失败");
        store
            .update(vec![FileOutcome::failed("src/Broken.tsx")])
            .await
            .expect("更新失败");

        // 重新加载验证持久化结果
        let reloaded = store_in(&dir);
        let status = reloaded.load().await.expect("加载失败");
        assert_eq!(status.len(), 2);
        assert!(status["src/App.tsx"].migrated);
        assert_eq!(status["src/App.tsx"].keys.len(), 1);
        assert!(!status["src/Broken.tsx"].migrated);
        assert!(status["src/Broken.tsx"].keys.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_existing_record() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let store = store_in(&dir);
        store.load().await.expect("加载失败");

        store
            .update(vec![FileOutcome::failed("src/App.tsx")])
            .await
            .expect("更新失败");
        assert!(!store.is_migrated("src/App.tsx").await);

        store
            .update(vec![FileOutcome::succeeded("src/App.tsx", Vec::new())])
            .await
            .expect("更新失败");
        assert!(store.is_migrated("src/App.tsx").await);
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_records() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let store = Arc::new(store_in(&dir));
        store.load().await.expect("加载失败");

        // 并发写入 20 条记录，锁串行化后一条都不能丢
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(vec![FileOutcome::succeeded(
                        format!("src/File{}.tsx", i),
                        Vec::new(),
                    )])
                    .await
            }));
        }
        for handle in handles {
            tokio_test::assert_ok!(handle.await.expect("任务失败"));
        }

        let reloaded = store_in(&dir);
        let status = reloaded.load().await.expect("加载失败");
        assert_eq!(status.len(), 20);
    }
}
