//! 响应提供方 - 模型接入层
//!
//! ## 职责
//!
//! - 定义统一的 `ResponseProvider` 接口
//! - 提供 OpenAI / Azure OpenAI 两种具体实现
//! - 构造期一次性选择实现；凭据不完整立即失败，不处理任何文件
//!
//! 提供方只负责"发一次请求、拿回原始文本"，响应内容的校验和
//! 解析在 `services::response_assembler` 中完成。

pub mod azure;
pub mod openai;
pub mod prompts;

pub use azure::AzureResponseProvider;
pub use openai::OpenAiResponseProvider;
pub use prompts::PromptsProvider;

use std::sync::Arc;

use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, ProviderError};

/// 文本生成服务的统一接口
///
/// 返回值为 `Option<String>`：模型可能合法地不返回任何内容，
/// 是否把"缺失"当作错误由调用方决定。
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// 发送一次对话请求，返回模型的原始文本
    async fn get_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<Option<String>>;

    /// 提供方名称（用于日志和错误信息）
    fn name(&self) -> &'static str;
}

/// 根据配置构造响应提供方
///
/// 选择只发生一次：Azure 三项凭据齐全优先使用 Azure OpenAI，
/// 其次使用 OpenAI；两者都不完整时立即报配置错误。
pub fn create_response_provider(config: &Config) -> AppResult<Arc<dyn ResponseProvider>> {
    if let (Some(api_key), Some(endpoint), Some(deployment)) = (
        &config.azure_api_key,
        &config.azure_endpoint,
        &config.azure_deployment,
    ) {
        info!("使用 Azure OpenAI 提供方 (部署: {})", deployment);
        return Ok(Arc::new(AzureResponseProvider::new(
            api_key, endpoint, deployment, config,
        )));
    }

    if let Some(api_key) = &config.openai_api_key {
        info!("使用 OpenAI 提供方 (模型: {})", config.llm_model_name);
        return Ok(Arc::new(OpenAiResponseProvider::new(api_key, config)));
    }

    Err(AppError::Config(ConfigError::MissingProviderCredentials))
}

/// 发送一次 chat completion 请求（两个提供方共用）
pub(crate) async fn send_chat_request<C>(
    client: &Client<C>,
    model_name: &str,
    max_tokens: u32,
    provider: &'static str,
    system_prompt: &str,
    user_prompt: &str,
) -> AppResult<Option<String>>
where
    C: async_openai::config::Config,
{
    debug!("调用 {} API，模型: {}", provider, model_name);
    debug!("用户消息长度: {} 字符", user_prompt.len());

    // 构建消息列表
    let mut messages = Vec::new();

    let system_msg = ChatCompletionRequestSystemMessageArgs::default()
        .content(system_prompt)
        .build()
        .map_err(|e| map_openai_error(provider, e))?;
    messages.push(ChatCompletionRequestMessage::System(system_msg));

    let user_msg = ChatCompletionRequestUserMessageArgs::default()
        .content(user_prompt)
        .build()
        .map_err(|e| map_openai_error(provider, e))?;
    messages.push(ChatCompletionRequestMessage::User(user_msg));

    // 构建请求
    let request = CreateChatCompletionRequestArgs::default()
        .model(model_name)
        .messages(messages)
        .temperature(0.3)
        .max_tokens(max_tokens)
        .build()
        .map_err(|e| map_openai_error(provider, e))?;

    // 调用 API
    let response = client.chat().create(request).await.map_err(|e| {
        warn!("{} API 调用失败: {}", provider, e);
        map_openai_error(provider, e)
    })?;

    debug!("{} API 调用成功", provider);

    Ok(response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone()))
}

/// 把 async-openai 的错误映射为应用错误
///
/// 限流信号单独成类，供限流重试层识别；其余一律按请求失败处理。
pub(crate) fn map_openai_error(provider: &'static str, err: OpenAIError) -> AppError {
    match err {
        OpenAIError::ApiError(api) => {
            let is_rate_limited = api.r#type.as_deref() == Some("rate_limit_exceeded")
                || api.message.to_lowercase().contains("rate limit");

            if is_rate_limited {
                AppError::Provider(ProviderError::RateLimited {
                    retry_after_ms: parse_retry_after_hint(&api.message),
                })
            } else {
                AppError::Provider(ProviderError::RequestFailed {
                    provider: provider.to_string(),
                    source: Box::new(OpenAIError::ApiError(api)),
                })
            }
        }
        other => AppError::Provider(ProviderError::RequestFailed {
            provider: provider.to_string(),
            source: Box::new(other),
        }),
    }
}

/// 从限流错误信息中提取建议等待时长（毫秒）
///
/// 限流错误信息通常形如 "Please try again in 20s" 或 "... in 350ms"。
fn parse_retry_after_hint(message: &str) -> Option<u64> {
    let re = Regex::new(r"(?i)try again in\s*([0-9]+(?:\.[0-9]+)?)\s*(ms|s)").ok()?;
    let caps = re.captures(message)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str().to_lowercase().as_str() {
        "ms" => Some(amount.round() as u64),
        _ => Some((amount * 1000.0).round() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after_hint_seconds() {
        assert_eq!(
            parse_retry_after_hint("Rate limit reached. Please try again in 20s."),
            Some(20_000)
        );
        assert_eq!(
            parse_retry_after_hint("Please try again in 6.5s"),
            Some(6_500)
        );
    }

    #[test]
    fn test_parse_retry_after_hint_millis() {
        assert_eq!(
            parse_retry_after_hint("Please try again in 350ms."),
            Some(350)
        );
    }

    #[test]
    fn test_parse_retry_after_hint_absent() {
        assert_eq!(parse_retry_after_hint("Too many requests"), None);
    }

    #[test]
    fn test_provider_selection_fails_without_credentials() {
        let config = Config::default();
        let result = create_response_provider(&config);
        assert!(matches!(
            result.err(),
            Some(AppError::Config(ConfigError::MissingProviderCredentials))
        ));
    }

    #[test]
    fn test_provider_selection_prefers_azure() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            azure_api_key: Some("azure-key".to_string()),
            azure_endpoint: Some("https://example.openai.azure.com".to_string()),
            azure_deployment: Some("gpt-4o".to_string()),
            ..Config::default()
        };
        let provider = create_response_provider(&config).expect("应当选中 Azure");
        assert_eq!(provider.name(), "Azure OpenAI");
    }

    #[test]
    fn test_provider_selection_falls_back_to_openai() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            // Azure 凭据不完整（缺 deployment）时不选 Azure
            azure_api_key: Some("azure-key".to_string()),
            azure_endpoint: Some("https://example.openai.azure.com".to_string()),
            ..Config::default()
        };
        let provider = create_response_provider(&config).expect("应当回退到 OpenAI");
        assert_eq!(provider.name(), "OpenAI");
    }
}
