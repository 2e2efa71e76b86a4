//! Events - 任务事件广播

mod publisher;

pub use publisher::{JobEvent, JobEventPublisher};
