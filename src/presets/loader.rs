//! 动态预设加载
//!
//! 从 TOML 文件读取用户自定义预设，形状校验由调用方
//! （`resolve_preset`）统一完成。

use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::presets::Preset;

/// 预设文件的 TOML 结构
#[derive(Debug, Deserialize)]
struct PresetFile {
    /// 预设名称（缺省时使用文件名）
    name: Option<String>,
    /// 系统提示词模板
    system_prompt: String,
    /// 用户提示词模板（必须包含 {{file_content}} 占位符）
    user_prompt: String,
}

/// 从 TOML 文件加载预设
pub fn load_preset_file(path: &Path) -> AppResult<Preset> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(ConfigError::PresetLoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    let file: PresetFile = toml::from_str(&content).map_err(|e| {
        AppError::Config(ConfigError::PresetLoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    let name = file.name.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "custom".to_string())
    });

    Ok(Preset::new(name, file.system_prompt, file.user_prompt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_preset_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("创建临时文件失败");
        writeln!(
            file,
            r#"
name = "custom-react"
system_prompt = "系统提示词"
user_prompt = "处理以下内容: {{{{file_content}}}}"
"#
        )
        .expect("写入临时文件失败");

        let preset = load_preset_file(file.path()).expect("加载预设失败");
        assert_eq!(preset.name, "custom-react");
        assert!(preset.validate().is_ok());
        assert!(preset.user_prompt("ABC").contains("ABC"));
    }

    #[test]
    fn test_load_preset_file_missing_field() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("创建临时文件失败");
        writeln!(file, r#"system_prompt = "只有系统提示词""#).expect("写入临时文件失败");

        let result = load_preset_file(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_preset_file_not_found() {
        let result = load_preset_file(Path::new("不存在的预设.toml"));
        assert!(result.is_err());
    }
}
