//! 响应组装器 - 业务能力层
//!
//! 把单个文件的全文转换为最终写回的内容和提取出的键列表，
//! 或者让该文件原子性地失败。
//!
//! ## 处理流程
//!
//! 1. 按固定行数把文件切分为有序分块（最后一个分块可以更短）
//! 2. 分块在文件内严格串行处理；文件之间的并发由编排层负责
//! 3. 每个分块经过限流重试（外层）+ 有界格式重试（内层）调用提供方
//! 4. 校验响应标记、净化并解析键列表
//! 5. 任何一个分块最终失败，整个文件已累计的工作全部丢弃
//!
//! 失败策略是严格的全有或全无：组装器返回错误时，调用方绝不能
//! 写回任何内容。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, ProviderError};
use crate::models::TranslationKey;
use crate::providers::{PromptsProvider, ResponseProvider};
use crate::services::key_sanitizer::{sanitize_and_parse_keys, strip_code_fences};
use crate::services::retry::{retry_on_error, retry_on_rate_limit};
use crate::workflow::FileCtx;

/// 响应中转换后内容的起始标记
pub const CONTENT_MARKER: &str = "---CONTENT---";
/// 响应中键列表的起始标记
pub const KEYS_MARKER: &str = "---KEYS---";

/// 组装完成的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledFile {
    /// 最终写回的完整内容（分块按原始顺序以换行拼接）
    pub content: String,
    /// 提取出的键（跨分块按键名合并，后写覆盖）
    pub keys: Vec<TranslationKey>,
}

/// 单个分块的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChunkResult {
    content: String,
    keys: Vec<TranslationKey>,
}

/// 响应组装器
pub struct ResponseAssembler {
    provider: Arc<dyn ResponseProvider>,
    prompts: PromptsProvider,
    chunk_size_lines: usize,
    max_format_retries: usize,
    rate_limit_wait: Duration,
    default_locale: String,
}

impl ResponseAssembler {
    /// 创建响应组装器
    pub fn new(
        provider: Arc<dyn ResponseProvider>,
        prompts: PromptsProvider,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            prompts,
            chunk_size_lines: config.chunk_size_lines,
            max_format_retries: config.max_format_retries,
            rate_limit_wait: Duration::from_millis(config.rate_limit_wait_ms),
            default_locale: config.default_locale.clone(),
        }
    }

    /// 组装单个文件
    ///
    /// 分块严格按原始顺序串行处理；任何一个分块失败时整个文件
    /// 失败，已累计的内容不会泄漏给调用方。
    pub async fn assemble(&self, file_content: &str, ctx: &FileCtx) -> AppResult<AssembledFile> {
        let chunks = split_into_chunks(file_content, self.chunk_size_lines);
        let total = chunks.len();

        let mut content_parts: Vec<String> = Vec::with_capacity(total);
        let mut accumulator = KeyAccumulator::new();

        for (index, chunk) in chunks.iter().enumerate() {
            debug!("[文件 {}] 处理分块 {}/{}", ctx.file_index, index + 1, total);

            let result = self.request_chunk(chunk).await?;
            content_parts.push(result.content);
            accumulator.merge(result.keys);
        }

        Ok(AssembledFile {
            content: content_parts.join("\n"),
            keys: accumulator.into_keys(),
        })
    }

    /// 处理一个分块：重试包装下的调用 + 解析
    ///
    /// 限流重试在外层（等待不消耗格式重试预算），
    /// 有界格式重试在内层。
    async fn request_chunk(&self, chunk: &str) -> AppResult<ChunkResult> {
        let (system_prompt, user_prompt) = self.prompts.build(chunk);
        let fallback = self.rate_limit_wait;

        retry_on_rate_limit(
            || {
                retry_on_error(
                    self.max_format_retries,
                    || self.call_and_parse(&system_prompt, &user_prompt),
                    AppError::is_transient_format,
                )
            },
            move |e: &AppError| e.rate_limit_wait(fallback),
        )
        .await
    }

    /// 发起一次提供方调用并解析响应
    async fn call_and_parse(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<ChunkResult> {
        let raw = self
            .provider
            .get_response(system_prompt, user_prompt)
            .await?;

        let raw = match raw {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(AppError::Provider(ProviderError::EmptyResponse {
                    provider: self.provider.name().to_string(),
                }))
            }
        };

        parse_chunk_response(&raw, &self.default_locale)
    }
}

/// 把文件内容按行数切分为有序分块
///
/// 最后一个分块可以不足 `chunk_size_lines` 行；空文件产生零个分块。
pub fn split_into_chunks(text: &str, chunk_size_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    lines
        .chunks(chunk_size_lines.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}

/// 解析单个分块的原始响应
///
/// 约定的响应格式：
///
/// ```text
/// ---CONTENT---
/// <转换后的代码片段>
/// ---KEYS---
/// { "<键名>": { "description": "...", "translations": { "en": "..." } } }
/// ```
///
/// 两个标记必须按序出现；标记之间去除首尾空白后必须非空。
fn parse_chunk_response(raw: &str, default_locale: &str) -> AppResult<ChunkResult> {
    let body = strip_code_fences(raw);

    let content_start = body
        .find(CONTENT_MARKER)
        .ok_or_else(|| AppError::marker_missing(CONTENT_MARKER))?
        + CONTENT_MARKER.len();

    // KEYS 标记只在 CONTENT 标记之后寻找，保证两个标记的先后顺序
    let keys_offset = body[content_start..]
        .find(KEYS_MARKER)
        .ok_or_else(|| AppError::marker_missing(KEYS_MARKER))?;
    let keys_start = content_start + keys_offset;

    let content = body[content_start..keys_start].trim();
    if content.is_empty() {
        return Err(AppError::Provider(ProviderError::EmptyContent));
    }

    let keys_payload = &body[keys_start + KEYS_MARKER.len()..];
    let keys = sanitize_and_parse_keys(keys_payload, default_locale)?;

    Ok(ChunkResult {
        content: content.to_string(),
        keys,
    })
}

/// 跨分块的键累加器
///
/// 保持首次出现的顺序；同名键后写覆盖，不做进一步去重。
struct KeyAccumulator {
    order: Vec<String>,
    entries: HashMap<String, TranslationKey>,
}

impl KeyAccumulator {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    fn merge(&mut self, keys: Vec<TranslationKey>) {
        for key in keys {
            if !self.entries.contains_key(&key.name) {
                self.order.push(key.name.clone());
            }
            self.entries.insert(key.name.clone(), key);
        }
    }

    fn into_keys(mut self) -> Vec<TranslationKey> {
        self.order
            .iter()
            .filter_map(|name| self.entries.remove(name))
            .collect()
    }
}
