pub mod file_ctx;
pub mod file_flow;

pub use file_ctx::FileCtx;
pub use file_flow::{FileFlow, ProcessResult};
