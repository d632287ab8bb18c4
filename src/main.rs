use anyhow::Result;

use ai_i18n_migrator::orchestrator::{self, App};
use ai_i18n_migrator::utils::logging;
use ai_i18n_migrator::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（环境变量只在这里读取一次）
    let config = Config::from_env();

    // 命令分发：migrate（默认）/ status / upload
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("migrate") => App::initialize(config)?.run_migrate().await,
        Some("status") => {
            let show_all = args.iter().any(|arg| arg == "--all");
            let target = args
                .iter()
                .skip(1)
                .find(|arg| !arg.starts_with("--"))
                .map(String::as_str);
            orchestrator::show_status(&config, target, show_all).await
        }
        Some("upload") => orchestrator::upload_archived_keys(&config).await,
        Some(other) => {
            anyhow::bail!("未知命令: {} (可用命令: migrate / status / upload)", other)
        }
    }
}
