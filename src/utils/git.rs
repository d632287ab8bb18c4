//! git 工作区检查
//!
//! 迁移会直接改写源文件，要求工作区干净，保证改动可以随时回滚。

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::info;

/// 检查 git 工作区是否干净
pub fn check_git_clean() -> Result<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .context("无法执行 git status")?;

    if !output.status.success() {
        anyhow::bail!(
            "git status 执行失败: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.trim().is_empty())
}

/// 确保状态目录已写入 .gitignore
///
/// 状态目录属于工具的工作产物，不应该进入版本控制。
pub fn ensure_dir_ignored(status_dir: &str) -> Result<()> {
    let gitignore = Path::new(".gitignore");

    if gitignore.exists() {
        let content = std::fs::read_to_string(gitignore).context("无法读取 .gitignore")?;
        if !content.lines().any(|line| line.trim() == status_dir) {
            std::fs::write(
                gitignore,
                format!("{}\n{}\n", content.trim_end(), status_dir),
            )
            .context("无法更新 .gitignore")?;
            info!("已把 {} 追加到 .gitignore", status_dir);
        }
    } else {
        std::fs::write(gitignore, format!("{}\n", status_dir)).context("无法创建 .gitignore")?;
        info!("已创建 .gitignore 并写入 {}", status_dir);
    }

    Ok(())
}
