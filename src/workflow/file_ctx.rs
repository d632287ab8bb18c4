//! 文件处理上下文
//!
//! 封装"我正在处理第几个文件、路径是什么"这一信息

use std::fmt::Display;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct FileCtx {
    /// 文件路径（同时是状态映射的键）
    pub file_path: String,

    /// 文件序号（从 1 开始，仅用于日志显示）
    pub file_index: usize,
}

impl FileCtx {
    /// 创建新的文件上下文
    pub fn new(file_path: impl Into<String>, file_index: usize) -> Self {
        Self {
            file_path: file_path.into(),
            file_index,
        }
    }
}

impl Display for FileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 #{} {}]", self.file_index, self.file_path)
    }
}
