use serde::{Deserialize, Serialize};

/// 翻译键
///
/// 从模型响应中提取的单个可本地化文案条目。
/// 键名只在单个文件的结果内要求唯一，不做全局去重。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationKey {
    /// 键名
    pub name: String,
    /// 用途描述（由模型根据上下文生成）
    pub description: String,
    /// 默认语言的原始文案
    pub default: String,
}

impl TranslationKey {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default: default.into(),
        }
    }
}
