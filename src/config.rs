/// 程序配置文件
///
/// 环境变量只在 `from_env` 中读取一次，之后所有模块都通过
/// `&Config` 显式接收配置，不存在隐式的全局状态。
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的文件数量
    pub max_concurrent_files: usize,
    /// 单个请求分块的行数
    pub chunk_size_lines: usize,
    /// 单个分块的格式错误重试次数上限
    pub max_format_retries: usize,
    /// 限流错误没有携带 retry-after 提示时的等待毫秒数
    pub rate_limit_wait_ms: u64,
    /// 待迁移文件的扫描根目录
    pub scan_root: String,
    /// 待迁移文件的扩展名（逗号分隔）
    pub file_extensions: String,
    /// 提示词预设名称（或 .toml 预设文件路径）
    pub preset: String,
    /// 追加提示词文件路径
    pub prompt_appendix_path: Option<String>,
    /// 迁移状态目录
    pub status_dir: String,
    /// 默认语言
    pub default_locale: String,
    /// 迁移前是否要求干净的 git 工作区
    pub require_clean_git: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub openai_api_key: Option<String>,
    pub openai_api_base_url: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_endpoint: Option<String>,
    pub azure_deployment: Option<String>,
    pub llm_model_name: String,
    pub llm_max_tokens: u32,
    // --- 上传 API 配置 ---
    pub upload_api_base_url: String,
    pub upload_token: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_files: 5,
            chunk_size_lines: 20,
            max_format_retries: 3,
            rate_limit_wait_ms: 2000,
            scan_root: "src".to_string(),
            file_extensions: "tsx".to_string(),
            preset: "react".to_string(),
            prompt_appendix_path: None,
            status_dir: ".i18n-migrator".to_string(),
            default_locale: "en".to_string(),
            require_clean_git: true,
            verbose_logging: false,
            output_log_file: "migration-output.txt".to_string(),
            openai_api_key: None,
            openai_api_base_url: None,
            azure_api_key: None,
            azure_endpoint: None,
            azure_deployment: None,
            llm_model_name: "gpt-4o".to_string(),
            llm_max_tokens: 1024,
            upload_api_base_url: "https://app.tolgee.io".to_string(),
            upload_token: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_files: std::env::var("MAX_CONCURRENT_FILES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_files),
            chunk_size_lines: std::env::var("CHUNK_SIZE_LINES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_size_lines),
            max_format_retries: std::env::var("MAX_FORMAT_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_format_retries),
            rate_limit_wait_ms: std::env::var("RATE_LIMIT_WAIT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.rate_limit_wait_ms),
            scan_root: std::env::var("SCAN_ROOT").unwrap_or(default.scan_root),
            file_extensions: std::env::var("FILE_EXTENSIONS").unwrap_or(default.file_extensions),
            preset: std::env::var("PRESET").unwrap_or(default.preset),
            prompt_appendix_path: std::env::var("PROMPT_APPENDIX_PATH").ok().filter(|v| !v.is_empty()),
            status_dir: std::env::var("STATUS_DIR").unwrap_or(default.status_dir),
            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or(default.default_locale),
            require_clean_git: std::env::var("REQUIRE_CLEAN_GIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.require_clean_git),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            openai_api_base_url: std::env::var("OPENAI_API_BASE_URL").ok().filter(|v| !v.is_empty()),
            azure_api_key: std::env::var("AZURE_OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            azure_endpoint: std::env::var("AZURE_OPENAI_ENDPOINT").ok().filter(|v| !v.is_empty()),
            azure_deployment: std::env::var("AZURE_OPENAI_DEPLOYMENT").ok().filter(|v| !v.is_empty()),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            upload_api_base_url: std::env::var("UPLOAD_API_BASE_URL").unwrap_or(default.upload_api_base_url),
            upload_token: std::env::var("UPLOAD_TOKEN").unwrap_or(default.upload_token),
        }
    }

    /// 拆分扩展名配置（"tsx,jsx" → ["tsx", "jsx"]）
    pub fn file_extension_list(&self) -> Vec<String> {
        self.file_extensions
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.max_concurrent_files, 5);
        assert_eq!(config.chunk_size_lines, 20);
        assert_eq!(config.max_format_retries, 3);
        assert_eq!(config.default_locale, "en");
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_file_extension_list() {
        let config = Config {
            file_extensions: "tsx, .jsx,vue,".to_string(),
            ..Config::default()
        };
        assert_eq!(config.file_extension_list(), vec!["tsx", "jsx", "vue"]);
    }
}
