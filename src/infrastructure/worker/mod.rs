//! Worker Layer - Background Job Processing
//!
//! 实现 CloneWorkerPool（处理声音克隆任务）和 RetentionSweeper（清理过期任务）

mod clone_worker;
mod retention;
mod stats;

pub use clone_worker::{CloneWorkerConfig, CloneWorkerPool};
pub use retention::{RetentionConfig, RetentionSweeper};
pub use stats::{BusyGuard, WorkerPoolStats};
