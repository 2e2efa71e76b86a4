//! Job Queue Port - 有界任务队列
//!
//! 准入控制：先预留队列位置，再创建任务，最后投递 ID。
//! 队列满时立即拒绝，不会留下半成品任务

use thiserror::Error;

use crate::domain::JobId;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Job queue is full ({capacity} jobs)")]
    Full { capacity: usize },

    #[error("Job queue is closed")]
    Closed,
}

/// 已预留的队列位置
///
/// 调用 `dispatch` 投递任务 ID；未投递即被丢弃时位置自动释放
pub struct QueueSlot {
    dispatch: Box<dyn FnOnce(JobId) + Send>,
}

impl QueueSlot {
    pub fn new(dispatch: impl FnOnce(JobId) + Send + 'static) -> Self {
        Self {
            dispatch: Box::new(dispatch),
        }
    }

    /// 投递任务
    pub fn dispatch(self, job_id: JobId) {
        (self.dispatch)(job_id)
    }
}

impl std::fmt::Debug for QueueSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSlot").finish_non_exhaustive()
    }
}

/// Job Queue Port
///
/// FIFO，无优先级
pub trait JobQueuePort: Send + Sync {
    /// 预留一个位置，队列满时返回 `QueueError::Full`
    fn try_reserve(&self) -> Result<QueueSlot, QueueError>;

    /// 当前排队（含已预留）数量
    fn depth(&self) -> usize;

    /// 队列容量
    fn capacity(&self) -> usize;
}
