//! 待迁移文件发现 - 业务能力层
//!
//! 递归扫描配置的根目录，按扩展名筛选出待迁移文件。

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;

/// 文件扫描错误
#[derive(Debug, Error)]
pub enum ScanError {
    /// 扫描根目录不存在
    #[error("扫描根目录不存在: {0}")]
    RootNotFound(PathBuf),

    /// 遍历目录失败
    #[error("扫描失败 ({0}): {1}")]
    WalkFailed(PathBuf, String),
}

/// 待迁移文件发现器
pub struct FileFinder {
    extensions: Vec<String>,
    ignore_dirs: Vec<String>,
}

impl FileFinder {
    /// 创建文件发现器
    ///
    /// 默认跳过版本控制、依赖和构建产物目录，以及状态目录本身。
    pub fn new(config: &Config) -> Self {
        let mut ignore_dirs = vec![
            ".git".to_string(),
            ".svn".to_string(),
            "node_modules".to_string(),
            "target".to_string(),
            "dist".to_string(),
            "build".to_string(),
        ];
        // 状态目录可能配置为路径，按最后一段目录名匹配
        let status_dir_name = Path::new(&config.status_dir)
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| config.status_dir.clone());
        ignore_dirs.push(status_dir_name);

        Self {
            extensions: config.file_extension_list(),
            ignore_dirs,
        }
    }

    /// 递归扫描根目录
    ///
    /// # 返回
    /// 返回按路径排序的待迁移文件列表（保证多次运行顺序一致）
    pub fn find_files(&self, root: &str) -> Result<Vec<String>, ScanError> {
        let root_path = Path::new(root);
        if !root_path.exists() {
            return Err(ScanError::RootNotFound(root_path.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root_path)
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry));

        for entry in walker {
            let entry = entry
                .map_err(|e| ScanError::WalkFailed(root_path.to_path_buf(), e.to_string()))?;
            if entry.file_type().is_file() && self.matches_extension(entry.path()) {
                files.push(entry.path().to_string_lossy().to_string());
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|name| self.ignore_dirs.iter().any(|dir| dir == name))
                .unwrap_or(false)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|wanted| wanted == ext))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("创建目录失败");
        }
        std::fs::write(path, "content").expect("写入失败");
    }

    #[test]
    fn test_find_files_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let root = dir.path();
        touch(&root.join("src/b/Second.tsx"));
        touch(&root.join("src/a/First.tsx"));
        touch(&root.join("src/ignored.rs"));
        touch(&root.join("src/node_modules/dep/Skipped.tsx"));
        touch(&root.join("src/.i18n-migrator/NotSource.tsx"));

        let config = Config {
            file_extensions: "tsx".to_string(),
            ..Config::default()
        };
        let finder = FileFinder::new(&config);
        let files = finder
            .find_files(&root.join("src").to_string_lossy())
            .expect("扫描失败");

        assert_eq!(files.len(), 2);
        // 排序后 a/First 在 b/Second 之前
        assert!(files[0].ends_with("First.tsx"));
        assert!(files[1].ends_with("Second.tsx"));
    }

    #[test]
    fn test_find_files_multiple_extensions() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let root = dir.path();
        touch(&root.join("src/App.tsx"));
        touch(&root.join("src/Legacy.jsx"));
        touch(&root.join("src/README.md"));

        let config = Config {
            file_extensions: "tsx,jsx".to_string(),
            ..Config::default()
        };
        let finder = FileFinder::new(&config);
        let files = finder
            .find_files(&root.join("src").to_string_lossy())
            .expect("扫描失败");

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_find_files_missing_root() {
        let finder = FileFinder::new(&Config::default());
        let result = finder.find_files("不存在的目录");
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }
}
