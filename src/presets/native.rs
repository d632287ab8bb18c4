//! 内置预设
//!
//! 模板文件随二进制嵌入，不依赖运行目录。

use super::Preset;

/// 按名称查找内置预设
pub fn native_preset(name: &str) -> Option<Preset> {
    match name {
        "react" => Some(Preset::new(
            "react",
            include_str!("prompts/react/system.txt"),
            include_str!("prompts/react/user.txt"),
        )),
        "vue" => Some(Preset::new(
            "vue",
            include_str!("prompts/vue/system.txt"),
            include_str!("prompts/vue/user.txt"),
        )),
        _ => None,
    }
}
