//! Azure OpenAI 响应提供方

use async_openai::config::AzureConfig;
use async_openai::Client;
use async_trait::async_trait;

use crate::config::Config;
use crate::error::AppResult;
use crate::providers::{send_chat_request, ResponseProvider};

/// Azure OpenAI 的 API 版本
const AZURE_API_VERSION: &str = "2024-10-01-preview";

/// Azure OpenAI 响应提供方
pub struct AzureResponseProvider {
    client: Client<AzureConfig>,
    model_name: String,
    max_tokens: u32,
}

impl AzureResponseProvider {
    /// 创建 Azure OpenAI 提供方
    ///
    /// 三项凭据由工厂函数校验齐全后显式传入。
    pub fn new(api_key: &str, endpoint: &str, deployment: &str, config: &Config) -> Self {
        let azure_config = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_key(api_key)
            .with_deployment_id(deployment)
            .with_api_version(AZURE_API_VERSION);

        Self {
            client: Client::with_config(azure_config),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl ResponseProvider for AzureResponseProvider {
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
        "Azure OpenAI"
    }
}
