//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `scheduler` - 任务调度器
//! - 共享队列 + N 个 worker 循环的有界并发
//! - 每个文件恰好被处理一次
//! - 单个文件失败不影响其他文件
//! - 汇总全局统计信息
//!
//! ### `app` - 应用编排
//! - 管理应用生命周期（初始化、命令分发）
//! - 快速失败的配置校验（提供方凭据、预设形状、并发数）
//! - migrate / status / upload 三个命令入口
//!
//! ## 层次关系
//!
//! ```text
//! app (生命周期 + 命令)
//!     ↓
//! scheduler (处理 Vec<文件路径>)
//!     ↓
//! workflow::FileFlow (处理单个文件)
//!     ↓
//! services (能力层：assembler / retry / status / archive)
//!     ↓
//! providers (模型接入：OpenAI / Azure OpenAI)
//! ```

pub mod app;
pub mod scheduler;

// 重新导出主要类型
pub use app::{show_status, upload_archived_keys, App};
pub use scheduler::{RunStats, TaskScheduler};
