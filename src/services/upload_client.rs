//! 键上传客户端 - 业务能力层
//!
//! 把累计的键列表导入翻译管理后台。上传属于迁移之后的独立步骤，
//! 失败只影响本次上传，不影响已落盘的迁移结果。

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::TranslationKey;

/// 导入接口路径（拼在 base_url 之后）
const IMPORT_ENDPOINT: &str = "/v2/projects/keys/import";

/// 上传结果
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
}

/// 导入请求里的单个键
#[derive(Debug, Serialize)]
struct ImportKey {
    name: String,
    description: String,
    translations: HashMap<String, String>,
}

/// 导入请求体
#[derive(Debug, Serialize)]
struct ImportRequest {
    keys: Vec<ImportKey>,
}

/// 键上传客户端
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    default_locale: String,
}

impl UploadClient {
    /// 创建上传客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.upload_api_base_url.trim_end_matches('/').to_string(),
            token: config.upload_token.clone(),
            default_locale: config.default_locale.clone(),
        }
    }

    /// 上传键列表
    ///
    /// 不抛出错误：网络失败和非 2xx 响应都折叠为失败的
    /// `UploadResult`，由调用方决定如何呈现。
    pub async fn upload_keys(&self, keys: &[TranslationKey]) -> UploadResult {
        if keys.is_empty() {
            return UploadResult {
                success: true,
                message: "没有需要上传的键".to_string(),
            };
        }

        let request = ImportRequest {
            keys: keys.iter().map(|key| self.to_import_key(key)).collect(),
        };

        let url = format!("{}{}", self.base_url, IMPORT_ENDPOINT);
        debug!("上传 {} 个键到 {}", keys.len(), url);

        match self
            .http
            .post(&url)
            .header("X-API-Key", &self.token)
            .json(&request)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("上传接口返回 {}", response.status());
                UploadResult {
                    success: true,
                    message: format!("成功上传 {} 个键", keys.len()),
                }
            }
            Ok(response) => UploadResult {
                success: false,
                message: format!("上传接口返回 {}", response.status()),
            },
            Err(e) => UploadResult {
                success: false,
                message: format!("上传请求失败: {}", e),
            },
        }
    }

    fn to_import_key(&self, key: &TranslationKey) -> ImportKey {
        let mut translations = HashMap::new();
        translations.insert(self.default_locale.clone(), key.default.clone());
        ImportKey {
            name: key.name.clone(),
            description: key.description.clone(),
            translations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_empty_list_is_noop() {
        let client = UploadClient::new(&Config::default());
        let result = client.upload_keys(&[]).await;
        assert!(result.success);
    }

    #[test]
    fn test_import_key_carries_default_locale() {
        let config = Config {
            default_locale: "cs".to_string(),
            ..Config::default()
        };
        let client = UploadClient::new(&config);
        let import_key = client.to_import_key(&TranslationKey::new("greeting", "Greeting", "Ahoj"));
        assert_eq!(import_key.translations["cs"], "Ahoj");
    }
}
