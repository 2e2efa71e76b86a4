//! Memory Layer - In-Memory State Management
//!
//! 实现 JobStore 和 JobQueue，管理克隆任务的内存状态与调度队列

mod job_queue;
mod job_store;

pub use job_queue::BoundedJobQueue;
pub use job_store::InMemoryJobStore;
