//! Clone Command Handlers

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;

use crate::application::commands::clone_commands::*;
use crate::application::commands::handlers::upload_handler::UploadHandler;
use crate::application::error::ApplicationError;
use crate::application::ports::{JobQueuePort, JobStoragePort, JobStorePort};
use crate::domain::{Job, JobFailure, JobId, JobStatus, JobTransition};
use crate::infrastructure::events::JobEventPublisher;

/// SubmitClone Handler - 提交异步克隆任务
///
/// 顺序: 校验 -> 预留队列位置 -> 创建任务 -> 写入参考音频 -> 投递
pub struct SubmitCloneHandler {
    upload_handler: UploadHandler,
    job_store: Arc<dyn JobStorePort>,
    job_queue: Arc<dyn JobQueuePort>,
    storage: Arc<dyn JobStoragePort>,
    event_publisher: Arc<JobEventPublisher>,
}

impl SubmitCloneHandler {
    pub fn new(
        upload_handler: UploadHandler,
        job_store: Arc<dyn JobStorePort>,
        job_queue: Arc<dyn JobQueuePort>,
        storage: Arc<dyn JobStoragePort>,
        event_publisher: Arc<JobEventPublisher>,
    ) -> Self {
        Self {
            upload_handler,
            job_store,
            job_queue,
            storage,
            event_publisher,
        }
    }

    pub fn upload_handler(&self) -> &UploadHandler {
        &self.upload_handler
    }

    pub async fn handle(&self, cmd: SubmitClone) -> Result<SubmitCloneResponse, ApplicationError> {
        self.submit(cmd, false).await.map(|(response, _)| response)
    }

    /// `hold` 为 true 时返回任务持有凭证，持有期间任务不会被淘汰
    async fn submit(
        &self,
        cmd: SubmitClone,
        hold: bool,
    ) -> Result<(SubmitCloneResponse, Option<JobHold>), ApplicationError> {
        let upload = self.upload_handler.validate(cmd)?;

        let slot = self.job_queue.try_reserve().map_err(|e| {
            tracing::warn!(
                depth = self.job_queue.depth(),
                capacity = self.job_queue.capacity(),
                "Rejecting clone request: queue full"
            );
            ApplicationError::from(e)
        })?;

        let created = self.job_store.create(upload.to_input())?;
        let job_id = created.job_id;

        // 任务尚未投递，不可能已结束，因此 hold 前不会被淘汰
        let hold = if hold {
            Some(JobHold::new(self.job_store.clone(), job_id)?)
        } else {
            None
        };

        if let Some(evicted) = created.evicted {
            self.discard_evicted(evicted.id()).await;
        }

        if let Err(e) = self.upload_handler.persist(job_id, &upload).await {
            tracing::error!(job_id = %job_id, error = %e, "Failed to store reference audio");
            self.fail_undispatched(job_id);
            return Err(e);
        }

        slot.dispatch(job_id);

        tracing::info!(
            job_id = %job_id,
            language = %upload.language,
            text_len = upload.text.chars().count(),
            "Clone job queued"
        );

        Ok((
            SubmitCloneResponse {
                job_id,
                status: JobStatus::Queued,
            },
            hold,
        ))
    }

    /// 清理因容量被淘汰的任务
    async fn discard_evicted(&self, job_id: JobId) {
        match self.storage.delete_job_files(job_id).await {
            Ok(count) => {
                tracing::info!(job_id = %job_id, files = count, "Evicted finished job to make room")
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to delete evicted job files")
            }
        }
        self.event_publisher.publish_removed(job_id);
    }

    /// 任务未投递就失败：按正常生命周期走到 failed，保持状态序列完整
    fn fail_undispatched(&self, job_id: JobId) {
        let result = self
            .job_store
            .transition(job_id, JobTransition::Start)
            .and_then(|_| {
                self.job_store
                    .transition(job_id, JobTransition::Fail(JobFailure::storage_failure()))
            });

        match result {
            Ok(job) => self.event_publisher.publish_status(&job),
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as failed")
            }
        }
    }
}

/// 任务持有凭证，drop 时释放
pub struct JobHold {
    job_store: Arc<dyn JobStorePort>,
    job_id: JobId,
}

impl JobHold {
    fn new(job_store: Arc<dyn JobStorePort>, job_id: JobId) -> Result<Self, ApplicationError> {
        job_store.hold(job_id)?;
        Ok(Self { job_store, job_id })
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }
}

impl Drop for JobHold {
    fn drop(&mut self) {
        self.job_store.release(self.job_id);
    }
}

impl std::fmt::Debug for JobHold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHold").field("job_id", &self.job_id).finish()
    }
}

/// 同步等待的轮询间隔（事件丢失时兜底）
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// CloneAndWait Handler - 同步克隆
///
/// 提交任务后等待其进入终态，等待时间受请求级超时限制，
/// 与引擎超时相互独立
pub struct CloneAndWaitHandler {
    submit_handler: Arc<SubmitCloneHandler>,
    job_store: Arc<dyn JobStorePort>,
    event_publisher: Arc<JobEventPublisher>,
    wait_timeout: Duration,
}

impl CloneAndWaitHandler {
    pub fn new(
        submit_handler: Arc<SubmitCloneHandler>,
        job_store: Arc<dyn JobStorePort>,
        event_publisher: Arc<JobEventPublisher>,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            submit_handler,
            job_store,
            event_publisher,
            wait_timeout,
        }
    }

    /// 返回成功的任务及其持有凭证；失败的任务转换为 `ApplicationError::Failed`
    ///
    /// 调用方读取完产出文件后再 drop 凭证
    pub async fn handle(&self, cmd: SubmitClone) -> Result<(Job, JobHold), ApplicationError> {
        // 先订阅再提交，避免错过状态事件
        let mut events = self.event_publisher.subscribe();
        // 等待期间持有任务，避免结束后被容量淘汰
        let (submitted, hold) = self.submit_handler.submit(cmd, true).await?;
        let hold = hold.ok_or_else(|| ApplicationError::internal("Job hold was not taken"))?;
        let job_id = submitted.job_id;
        let deadline = Instant::now() + self.wait_timeout;

        loop {
            let job = self.job_store.get(job_id)?;
            match job.status() {
                JobStatus::Succeeded => return Ok((job, hold)),
                JobStatus::Failed => {
                    let failure = job
                        .error()
                        .cloned()
                        .unwrap_or_else(JobFailure::engine_failure);
                    return Err(ApplicationError::Failed { id: job_id, failure });
                }
                JobStatus::Queued | JobStatus::Running => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(
                    job_id = %job_id,
                    timeout_secs = self.wait_timeout.as_secs(),
                    "Synchronous clone wait timed out"
                );
                return Err(ApplicationError::WaitTimeout(job_id));
            }

            let wait = remaining.min(WAIT_POLL_INTERVAL);
            match tokio::time::timeout(wait, events.recv()).await {
                Ok(Ok(_)) | Ok(Err(RecvError::Lagged(_))) | Err(_) => {}
                Ok(Err(RecvError::Closed)) => tokio::time::sleep(wait).await,
            }
        }
    }
}

/// DeleteJob Handler - 删除已结束的任务及其文件
pub struct DeleteJobHandler {
    job_store: Arc<dyn JobStorePort>,
    storage: Arc<dyn JobStoragePort>,
    event_publisher: Arc<JobEventPublisher>,
}

impl DeleteJobHandler {
    pub fn new(
        job_store: Arc<dyn JobStorePort>,
        storage: Arc<dyn JobStoragePort>,
        event_publisher: Arc<JobEventPublisher>,
    ) -> Self {
        Self {
            job_store,
            storage,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: DeleteJob) -> Result<(), ApplicationError> {
        let job = self.job_store.get(cmd.job_id)?;
        if !job.is_terminal() {
            return Err(ApplicationError::NotReady {
                id: cmd.job_id,
                status: job.status().to_string(),
            });
        }

        self.job_store.remove(cmd.job_id)?;

        if let Err(e) = self.storage.delete_job_files(cmd.job_id).await {
            tracing::warn!(job_id = %cmd.job_id, error = %e, "Failed to delete job files");
        }
        self.event_publisher.publish_removed(cmd.job_id);

        tracing::info!(job_id = %cmd.job_id, "Job deleted");
        Ok(())
    }
}
