use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志输出
///
/// 日志级别通过 RUST_LOG 环境变量控制，默认 info。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n迁移处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发数
/// - `chunk_size_lines`: 分块行数
pub fn log_startup(max_concurrent: usize, chunk_size_lines: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量文件迁移模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!("📄 分块行数: {}", chunk_size_lines);
    info!("{}", "=".repeat(60));
}

/// 记录文件扫描结果
///
/// # 参数
/// - `total`: 文件总数
/// - `max_concurrent`: 最大并发数
pub fn log_files_found(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待迁移的文件", total);
    info!("📋 最多同时处理 {} 个文件", max_concurrent);
    info!("💡 已迁移过的文件会自动跳过\n");
}

/// 打印最终统计信息
///
/// # 参数
/// - `migrated`: 成功数量
/// - `skipped`: 跳过数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    migrated: usize,
    skipped: usize,
    failed: usize,
    total: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", migrated, total);
    info!("⏭️ 跳过: {}", skipped);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("0123456789AB", 10), "0123456789...");
        // 按字符截断，多字节字符不会被劈开
        assert_eq!(truncate_text("你好世界你好世界", 4), "你好世界...");
    }
}
