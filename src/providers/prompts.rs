//! 提示词组装
//!
//! 把预设的系统/用户提示词与调用方的追加说明拼成最终发给
//! 提供方的两段提示词。

use crate::presets::Preset;

/// 提示词组装器
pub struct PromptsProvider {
    preset: Preset,
    prompt_appendix: String,
}

impl PromptsProvider {
    /// 创建提示词组装器
    ///
    /// `prompt_appendix` 为空字符串时不追加任何内容。
    pub fn new(preset: Preset, prompt_appendix: String) -> Self {
        Self {
            preset,
            prompt_appendix,
        }
    }

    /// 组装一个分块的提示词
    ///
    /// # 返回
    /// 返回 (系统提示词, 用户提示词)
    pub fn build(&self, file_content: &str) -> (String, String) {
        let system_prompt = self.preset.system_prompt();

        // 追加调用方的自定义说明（如果提供）
        let complete_system_prompt = if self.prompt_appendix.trim().is_empty() {
            system_prompt
        } else {
            format!("{}\n\n补充要求:\n{}", system_prompt, self.prompt_appendix.trim())
        };

        (complete_system_prompt, self.preset.user_prompt(file_content))
    }
}
