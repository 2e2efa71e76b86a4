//! Job Context - 克隆任务限界上下文
//!
//! 职责:
//! - Job 聚合及其生命周期
//! - 输入、产出、失败分类等值对象

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{Job, JobTransition};
pub use errors::JobError;
pub use value_objects::{
    AudioFormat, AudioRef, CloneInput, FailureKind, JobFailure, JobId, JobResult, JobStatus,
};
