use std::fmt;
use std::time::Duration;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文本生成提供方错误
    Provider(ProviderError),
    /// 文件操作错误
    File(FileError),
    /// 迁移状态存储错误
    Status(StatusError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Provider(e) => write!(f, "提供方错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Status(e) => write!(f, "状态存储错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Provider(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Status(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

impl AppError {
    /// 是否属于"响应格式问题"一类的瞬时错误
    ///
    /// 这类错误（空响应、标记缺失、键列表无法解析等）会进入
    /// 有界重试；限流错误不属于此类，走独立的限流重试。
    pub fn is_transient_format(&self) -> bool {
        match self {
            AppError::Provider(e) => !e.is_rate_limited(),
            _ => false,
        }
    }

    /// 限流错误对应的建议等待时长
    ///
    /// 错误本身带 retry-after 提示时使用提示值，否则回退到
    /// `fallback`；非限流错误返回 None（表示不应等待重试）。
    pub fn rate_limit_wait(&self, fallback: Duration) -> Option<Duration> {
        match self {
            AppError::Provider(ProviderError::RateLimited { retry_after_ms }) => Some(
                retry_after_ms
                    .map(Duration::from_millis)
                    .filter(|wait| !wait.is_zero())
                    .unwrap_or(fallback),
            ),
            _ => None,
        }
    }
}

/// 文本生成提供方错误
#[derive(Debug)]
pub enum ProviderError {
    /// 网络请求失败
    RequestFailed {
        provider: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 提供方返回空响应
    EmptyResponse {
        provider: String,
    },
    /// 响应中缺少约定的标记
    MarkerMissing {
        marker: &'static str,
    },
    /// 标记之间的转换内容为空
    EmptyContent,
    /// 键列表的花括号数量无法配平
    UnbalancedBraces {
        open: usize,
        close: usize,
    },
    /// 键列表解析失败
    KeysParseFailed {
        reason: String,
    },
    /// 请求频率限制
    RateLimited {
        retry_after_ms: Option<u64>,
    },
}

impl ProviderError {
    /// 是否是限流错误
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::RequestFailed { provider, source } => {
                write!(f, "请求失败 ({}): {}", provider, source)
            }
            ProviderError::EmptyResponse { provider } => {
                write!(f, "提供方返回空响应 ({})", provider)
            }
            ProviderError::MarkerMissing { marker } => {
                write!(f, "响应中缺少标记: {}", marker)
            }
            ProviderError::EmptyContent => {
                write!(f, "响应中的转换内容为空")
            }
            ProviderError::UnbalancedBraces { open, close } => {
                write!(
                    f,
                    "键列表花括号无法配平: {{ 共 {} 个, }} 共 {} 个",
                    open, close
                )
            }
            ProviderError::KeysParseFailed { reason } => {
                write!(f, "键列表解析失败: {}", reason)
            }
            ProviderError::RateLimited { retry_after_ms } => {
                write!(f, "请求频率限制, 建议等待: {:?} 毫秒", retry_after_ms)
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 迁移状态存储错误
#[derive(Debug)]
pub enum StatusError {
    /// 状态文件内容损坏
    ///
    /// 损坏的状态文件必须显式报错，绝不允许伪装成"无历史"，
    /// 否则已迁移的文件会被重复处理。
    Corrupted {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 状态落盘失败
    PersistFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 状态目录不可用
    StorageUnavailable {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusError::Corrupted { path, source } => {
                write!(f, "状态文件损坏 ({}): {}", path, source)
            }
            StatusError::PersistFailed { path, source } => {
                write!(f, "状态落盘失败 ({}): {}", path, source)
            }
            StatusError::StorageUnavailable { path, source } => {
                write!(f, "状态目录不可用 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for StatusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatusError::Corrupted { source, .. }
            | StatusError::PersistFailed { source, .. }
            | StatusError::StorageUnavailable { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 没有可用的提供方凭据
    MissingProviderCredentials,
    /// 并发数配置非法
    InvalidConcurrency {
        value: usize,
    },
    /// 预设不满足约定
    PresetInvalid {
        name: String,
        reason: String,
    },
    /// 预设文件加载失败
    PresetLoadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingProviderCredentials => {
                write!(
                    f,
                    "没有可用的提供方凭据, 请配置 Azure OpenAI (AZURE_OPENAI_API_KEY / \
                     AZURE_OPENAI_ENDPOINT / AZURE_OPENAI_DEPLOYMENT) 或 OpenAI (OPENAI_API_KEY)"
                )
            }
            ConfigError::InvalidConcurrency { value } => {
                write!(f, "并发数必须大于 0, 当前配置: {}", value)
            }
            ConfigError::PresetInvalid { name, reason } => {
                write!(f, "预设 {} 不满足约定: {}", name, reason)
            }
            ConfigError::PresetLoadFailed { path, source } => {
                write!(f, "预设文件加载失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::PresetLoadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建键列表解析错误
    pub fn keys_parse_failed(reason: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::KeysParseFailed {
            reason: reason.into(),
        })
    }

    /// 创建标记缺失错误
    pub fn marker_missing(marker: &'static str) -> Self {
        AppError::Provider(ProviderError::MarkerMissing { marker })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_format_classification() {
        let format_error = AppError::Provider(ProviderError::EmptyContent);
        assert!(format_error.is_transient_format());

        let rate_limited = AppError::Provider(ProviderError::RateLimited {
            retry_after_ms: Some(500),
        });
        assert!(!rate_limited.is_transient_format());

        let config_error = AppError::Config(ConfigError::MissingProviderCredentials);
        assert!(!config_error.is_transient_format());
    }

    #[test]
    fn test_rate_limit_wait_uses_hint_then_fallback() {
        let fallback = Duration::from_millis(2000);

        // 带提示：使用提示值
        let with_hint = AppError::Provider(ProviderError::RateLimited {
            retry_after_ms: Some(500),
        });
        assert_eq!(
            with_hint.rate_limit_wait(fallback),
            Some(Duration::from_millis(500))
        );

        // 无提示：回退到 fallback
        let without_hint = AppError::Provider(ProviderError::RateLimited {
            retry_after_ms: None,
        });
        assert_eq!(without_hint.rate_limit_wait(fallback), Some(fallback));

        // 提示为 0：同样回退，避免空转
        let zero_hint = AppError::Provider(ProviderError::RateLimited {
            retry_after_ms: Some(0),
        });
        assert_eq!(zero_hint.rate_limit_wait(fallback), Some(fallback));

        // 非限流错误不等待
        let format_error = AppError::Provider(ProviderError::EmptyContent);
        assert_eq!(format_error.rate_limit_wait(fallback), None);
    }
}
