//! Job Store Port - 任务注册表
//!
//! 任务状态的唯一权威来源，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{CloneInput, Job, JobError, JobId, JobTransition};

/// Job Store 错误
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job store is full ({limit} jobs)")]
    CapacityExceeded { limit: usize },

    #[error(transparent)]
    InvalidTransition(#[from] JobError),

    #[error("Job {0} is not finished yet")]
    NotTerminal(JobId),
}

/// 各状态的任务数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl JobStats {
    pub fn total(&self) -> usize {
        self.queued + self.running + self.succeeded + self.failed
    }
}

/// 新建任务的结果
#[derive(Debug, Clone)]
pub struct CreatedJob {
    pub job_id: JobId,
    /// 为腾出容量而淘汰的已结束任务，调用方负责清理它的文件
    pub evicted: Option<Job>,
}

/// Job Store Port
///
/// 所有对 Job 的修改都必须经过 `create` / `transition`，
/// 单条记录上的读写是原子的
pub trait JobStorePort: Send + Sync {
    /// 分配新 ID 并插入 queued 状态的任务
    fn create(&self, input: CloneInput) -> Result<CreatedJob, JobStoreError>;

    /// 获取任务快照
    fn get(&self, id: JobId) -> Result<Job, JobStoreError>;

    /// 原子地执行状态转换，返回转换后的快照
    fn transition(&self, id: JobId, transition: JobTransition) -> Result<Job, JobStoreError>;

    /// 按创建顺序返回所有任务
    fn list(&self) -> Vec<Job>;

    /// 删除一个已结束的任务
    fn remove(&self, id: JobId) -> Result<Job, JobStoreError>;

    /// 淘汰 `cutoff` 之前结束的任务，返回被淘汰的任务
    fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> Vec<Job>;

    /// 标记有调用方在等待该任务；持有期间任务不会被容量淘汰或过期清理
    fn hold(&self, id: JobId) -> Result<(), JobStoreError>;

    /// 释放一次 `hold`
    fn release(&self, id: JobId);

    /// 各状态计数
    fn stats(&self) -> JobStats;
}
