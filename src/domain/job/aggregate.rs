//! Job Context - Aggregate Root

use chrono::{DateTime, Utc};

use super::{CloneInput, JobError, JobFailure, JobId, JobResult, JobStatus};

/// 状态转换请求
///
/// 每个目标状态携带它所需的载荷，保证 result / error 只能在对应状态下写入
#[derive(Debug, Clone)]
pub enum JobTransition {
    Start,
    Succeed(JobResult),
    Fail(JobFailure),
}

impl JobTransition {
    pub fn target(&self) -> JobStatus {
        match self {
            JobTransition::Start => JobStatus::Running,
            JobTransition::Succeed(_) => JobStatus::Succeeded,
            JobTransition::Fail(_) => JobStatus::Failed,
        }
    }
}

/// Job 聚合根
///
/// 不变量:
/// - 状态只能单调前进: Queued -> Running -> {Succeeded | Failed}
/// - 每个时间戳只在对应转换时写入一次
/// - 终态时 result 与 error 恰有一个存在，之后不再改变
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    input: CloneInput,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    result: Option<JobResult>,
    error: Option<JobFailure>,
}

impl Job {
    /// 创建排队中的新任务
    pub fn new(input: CloneInput) -> Self {
        Self::with_id(JobId::new(), input)
    }

    pub fn with_id(id: JobId, input: CloneInput) -> Self {
        Self {
            id,
            status: JobStatus::Queued,
            input,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            result: None,
            error: None,
        }
    }

    /// 应用状态转换
    pub fn apply(&mut self, transition: JobTransition) -> Result<(), JobError> {
        let target = transition.target();
        if !self.status.can_transition_to(target) {
            return Err(JobError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: target,
            });
        }

        let now = Utc::now();
        match transition {
            JobTransition::Start => {
                self.started_at = Some(now);
            }
            JobTransition::Succeed(result) => {
                self.result = Some(result);
                self.finished_at = Some(now);
            }
            JobTransition::Fail(failure) => {
                self.error = Some(failure);
                self.finished_at = Some(now);
            }
        }
        self.status = target;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // Getters
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn input(&self) -> &CloneInput {
        &self.input
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&JobFailure> {
        self.error.as_ref()
    }
}
