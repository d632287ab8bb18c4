//! 键列表净化与解析 - 业务能力层
//!
//! 模型返回的键列表 JSON 经常带有代码块围栏、行注释或缺失的
//! 右花括号，解析前先做一轮净化。花括号补齐是尽力而为的修复，
//! 深度损坏的响应可能被误读，修复失败时整个分块按格式错误处理。

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::{AppError, AppResult, ProviderError};
use crate::models::TranslationKey;

/// 净化并解析键列表
///
/// 负载必须是一个 JSON 对象，形状为
/// `键名 → { description, translations: { <默认语言>: 文案 } }`；
/// 任何一个条目不满足形状都视为格式错误。
pub fn sanitize_and_parse_keys(
    payload: &str,
    default_locale: &str,
) -> AppResult<Vec<TranslationKey>> {
    let stripped = strip_code_fences(payload);
    let stripped = strip_line_comments(&stripped);
    let trimmed = stripped.trim();

    if trimmed.is_empty() {
        return Err(AppError::keys_parse_failed("键列表负载为空"));
    }

    let balanced = balance_braces(trimmed)?;

    let value: JsonValue = serde_json::from_str(&balanced)
        .map_err(|e| AppError::keys_parse_failed(format!("JSON 无效: {}", e)))?;

    let object = match value.as_object() {
        Some(object) => object,
        None => return Err(AppError::keys_parse_failed("键列表不是 JSON 对象")),
    };

    let mut keys = Vec::with_capacity(object.len());
    for (name, entry) in object {
        let description = entry
            .get("description")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::keys_parse_failed(format!("键 {} 缺少 description 字段", name))
            })?;

        let default = entry
            .get("translations")
            .and_then(|v| v.get(default_locale))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::keys_parse_failed(format!(
                    "键 {} 缺少 translations.{} 字段",
                    name, default_locale
                ))
            })?;

        keys.push(TranslationKey::new(name.clone(), description, default));
    }

    Ok(keys)
}

/// 去掉 Markdown 代码块围栏
///
/// 首行围栏可能带语言标注（```json 等）。
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    lines.remove(0);
    if matches!(lines.last(), Some(last) if last.trim() == "```") {
        lines.pop();
    }
    lines.join("\n")
}

/// 去掉整行的 // 注释
///
/// 只删除整行注释，避免误伤 JSON 字符串值里的 "https://..."。
fn strip_line_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 花括号配平检查与修复
///
/// 右花括号缺失时补齐（模型截断输出的常见形态）；右花括号
/// 多于左花括号则无法判断截断点，按错误处理。
fn balance_braces(text: &str) -> AppResult<String> {
    let open = text.matches('{').count();
    let close = text.matches('}').count();

    if open == close {
        return Ok(text.to_string());
    }

    if open > close {
        let missing = open - close;
        warn!("键列表缺少 {} 个右花括号，已尝试补齐", missing);
        let mut repaired = String::with_capacity(text.len() + missing);
        repaired.push_str(text);
        for _ in 0..missing {
            repaired.push('}');
        }
        return Ok(repaired);
    }

    Err(AppError::Provider(ProviderError::UnbalancedBraces {
        open,
        close,
    }))
}
