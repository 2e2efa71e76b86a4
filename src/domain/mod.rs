//! Domain Layer - 领域层
//!
//! - Job Context: 克隆任务及其生命周期
//! - Language: 支持的合成语言目录

pub mod job;

mod language;

pub use job::{
    AudioFormat, AudioRef, CloneInput, FailureKind, Job, JobError, JobFailure, JobId, JobResult,
    JobStatus, JobTransition,
};
pub use language::Language;
