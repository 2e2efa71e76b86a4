//! Job Context - Errors

use thiserror::Error;

use super::{JobId, JobStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("无效的状态转换: job {id} {from} -> {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}
