//! Event Publisher Implementation
//!
//! 任务状态事件广播，供同步接口等待和 WebSocket 推送使用

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::{Job, JobFailure, JobId, JobStatus};

/// 任务事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum JobEvent {
    /// 任务状态变更
    JobStatusChanged {
        job_id: JobId,
        status: JobStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<JobFailure>,
    },
    /// 任务被淘汰或删除
    JobRemoved { job_id: JobId },
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::JobStatusChanged { job_id, .. } => *job_id,
            JobEvent::JobRemoved { job_id } => *job_id,
        }
    }
}

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// 事件发布器
pub struct JobEventPublisher {
    channel: broadcast::Sender<JobEvent>,
}

impl JobEventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅所有任务事件
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.channel.subscribe()
    }

    /// 发布任务当前状态
    pub fn publish_status(&self, job: &Job) {
        self.publish(JobEvent::JobStatusChanged {
            job_id: job.id(),
            status: job.status(),
            duration_ms: job.result().and_then(|r| r.duration_ms),
            error: job.error().cloned(),
        });
    }

    /// 发布任务删除事件
    pub fn publish_removed(&self, job_id: JobId) {
        self.publish(JobEvent::JobRemoved { job_id });
    }

    fn publish(&self, event: JobEvent) {
        let job_id = event.job_id();
        if let Err(e) = self.channel.send(event) {
            tracing::trace!(
                job_id = %job_id,
                error = %e,
                "Failed to publish job event (no receivers)"
            );
        }
    }
}

impl Default for JobEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
