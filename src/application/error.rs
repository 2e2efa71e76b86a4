//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{JobStorageError, JobStoreError, QueueError};
use crate::domain::{JobFailure, JobId};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入校验失败，任务未创建
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 队列或任务表已满
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// 任务不存在或已被淘汰
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// 任务尚未结束
    #[error("Job {id} is not ready (status: {status})")]
    NotReady { id: JobId, status: String },

    /// 任务已失败
    #[error("Job {id} failed: {failure}")]
    Failed { id: JobId, failure: JobFailure },

    /// 同步等待超时（任务仍在处理）
    #[error("Timed out waiting for job {0}")]
    WaitTimeout(JobId),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建输入校验错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<JobStoreError> for ApplicationError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(id) => Self::NotFound(id),
            JobStoreError::CapacityExceeded { .. } => Self::CapacityExceeded(err.to_string()),
            JobStoreError::NotTerminal(id) => Self::NotReady {
                id,
                status: "unfinished".to_string(),
            },
            JobStoreError::InvalidTransition(e) => Self::InternalError(e.to_string()),
        }
    }
}

impl From<QueueError> for ApplicationError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Full { .. } => Self::CapacityExceeded(err.to_string()),
            QueueError::Closed => Self::InternalError(err.to_string()),
        }
    }
}

impl From<JobStorageError> for ApplicationError {
    fn from(err: JobStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}
