//! OpenAI 响应提供方
//!
//! 兼容 OpenAI API 的服务都可以通过自定义 base_url 接入。

use async_openai::config::OpenAIConfig;
use async_openai::Client;
use async_trait::async_trait;

use crate::config::Config;
use crate::error::AppResult;
use crate::providers::{send_chat_request, ResponseProvider};

/// OpenAI 响应提供方
pub struct OpenAiResponseProvider {
    client: Client<OpenAIConfig>,
    model_name: String,
    max_tokens: u32,
}

impl OpenAiResponseProvider {
    /// 创建 OpenAI 提供方
    ///
    /// 凭据由调用方（工厂函数）显式传入，这里不读取任何环境变量。
    pub fn new(api_key: &str, config: &Config) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = &config.openai_api_base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl ResponseProvider for OpenAiResponseProvider {
    async fn get_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> AppResult<Option<String>> {
        send_chat_request(
            &self.client,
            &self.model_name,
            self.max_tokens,
            self.name(),
            system_prompt,
            user_prompt,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }
}
