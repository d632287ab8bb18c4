//! 提示词预设
//!
//! 预设约定了两个能力：`system_prompt()` 与 `user_prompt(文件内容)`。
//! 既可以使用内置预设（模板随二进制嵌入），也可以从 TOML 文件
//! 动态加载用户自定义预设；两种来源都先经过形状校验再投入使用，
//! 不满足约定的预设会带着具体原因被拒绝。

pub mod loader;
pub mod native;

pub use loader::load_preset_file;
pub use native::native_preset;

use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

/// 用户提示词模板中的文件内容占位符
pub const FILE_CONTENT_PLACEHOLDER: &str = "{{file_content}}";

/// 提示词预设
#[derive(Debug, Clone)]
pub struct Preset {
    /// 预设名称
    pub name: String,
    system_template: String,
    user_template: String,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        system_template: impl Into<String>,
        user_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            system_template: system_template.into(),
            user_template: user_template.into(),
        }
    }

    /// 系统提示词
    pub fn system_prompt(&self) -> String {
        self.system_template.trim().to_string()
    }

    /// 用户提示词（把文件内容填入模板占位符）
    pub fn user_prompt(&self, file_content: &str) -> String {
        self.user_template
            .replace(FILE_CONTENT_PLACEHOLDER, file_content)
            .trim()
            .to_string()
    }

    /// 校验预设形状
    ///
    /// 动态加载的预设在这里被拦截：模板为空或缺少占位符的预设
    /// 直接拒绝，附带可读的原因。
    pub fn validate(&self) -> AppResult<()> {
        if self.system_template.trim().is_empty() {
            return Err(self.invalid("系统提示词模板为空"));
        }
        if self.user_template.trim().is_empty() {
            return Err(self.invalid("用户提示词模板为空"));
        }
        if !self.user_template.contains(FILE_CONTENT_PLACEHOLDER) {
            return Err(self.invalid(&format!(
                "用户提示词模板缺少 {} 占位符",
                FILE_CONTENT_PLACEHOLDER
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> AppError {
        AppError::Config(ConfigError::PresetInvalid {
            name: self.name.clone(),
            reason: reason.to_string(),
        })
    }
}

/// 解析并校验预设
///
/// `name_or_path` 以 `.toml` 结尾时按文件路径动态加载，
/// 否则按名称查找内置预设。
pub fn resolve_preset(name_or_path: &str) -> AppResult<Preset> {
    let preset = if name_or_path.ends_with(".toml") {
        load_preset_file(Path::new(name_or_path))?
    } else {
        native_preset(name_or_path).ok_or_else(|| {
            AppError::Config(ConfigError::PresetInvalid {
                name: name_or_path.to_string(),
                reason: "未知的内置预设".to_string(),
            })
        })?
    };
    preset.validate()?;
    Ok(preset)
}
