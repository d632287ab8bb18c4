use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::key::TranslationKey;

/// 迁移记录
///
/// 单个文件的迁移结果，持久化在状态文件中。
/// 失败的文件 `migrated` 为 false、`keys` 为空，源文件保持原样。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// 是否迁移成功
    pub migrated: bool,
    /// 该文件提取出的翻译键（按提取顺序）
    #[serde(default)]
    pub keys: Vec<TranslationKey>,
}

/// 持久化的迁移状态：文件路径 → 迁移记录
pub type MigrationStatus = HashMap<String, MigrationRecord>;

/// 单个文件处理完成后的落库条目
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// 文件路径（状态映射的键）
    pub file_path: String,
    /// 提取出的翻译键
    pub keys: Vec<TranslationKey>,
    /// 是否成功
    pub success: bool,
}

impl FileOutcome {
    /// 成功条目
    pub fn succeeded(file_path: impl Into<String>, keys: Vec<TranslationKey>) -> Self {
        Self {
            file_path: file_path.into(),
            keys,
            success: true,
        }
    }

    /// 失败条目（不携带任何键）
    pub fn failed(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            keys: Vec::new(),
            success: false,
        }
    }
}
