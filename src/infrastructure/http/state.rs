//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    CloneAndWaitHandler, DeleteJobHandler, SubmitCloneHandler, UploadHandler, UploadPolicy,
    // Query handlers
    GetHealthHandler, GetJobHandler, GetJobResultHandler, ListJobsHandler, ListLanguagesHandler,
    // Ports
    JobQueuePort, JobStoragePort, JobStorePort, SynthesisEnginePort,
};
use crate::infrastructure::events::JobEventPublisher;
use crate::infrastructure::worker::WorkerPoolStats;

/// 请求处理相关的设置
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub upload_policy: UploadPolicy,
    /// 同步接口的等待上限
    pub sync_wait_timeout: Duration,
    /// 对外 URL 前缀，为空时返回相对路径
    pub base_url: String,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            upload_policy: UploadPolicy::default(),
            sync_wait_timeout: Duration::from_secs(300),
            base_url: String::new(),
        }
    }
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub job_store: Arc<dyn JobStorePort>,
    pub event_publisher: Arc<JobEventPublisher>,
    pub base_url: String,

    // ========== Command Handlers ==========
    pub submit_clone_handler: Arc<SubmitCloneHandler>,
    pub clone_and_wait_handler: CloneAndWaitHandler,
    pub delete_job_handler: DeleteJobHandler,

    // ========== Query Handlers ==========
    pub get_job_handler: GetJobHandler,
    pub list_jobs_handler: ListJobsHandler,
    pub get_job_result_handler: GetJobResultHandler,
    pub get_health_handler: GetHealthHandler,
    pub list_languages_handler: ListLanguagesHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        job_store: Arc<dyn JobStorePort>,
        job_queue: Arc<dyn JobQueuePort>,
        storage: Arc<dyn JobStoragePort>,
        engine: Arc<dyn SynthesisEnginePort>,
        event_publisher: Arc<JobEventPublisher>,
        worker_stats: Arc<WorkerPoolStats>,
        options: StateOptions,
    ) -> Self {
        let languages = options.upload_policy.languages.clone();
        let submit_clone_handler = Arc::new(SubmitCloneHandler::new(
            UploadHandler::new(options.upload_policy, storage.clone()),
            job_store.clone(),
            job_queue.clone(),
            storage.clone(),
            event_publisher.clone(),
        ));

        Self {
            // Ports
            job_store: job_store.clone(),
            event_publisher: event_publisher.clone(),
            base_url: options.base_url,

            // Command handlers
            clone_and_wait_handler: CloneAndWaitHandler::new(
                submit_clone_handler.clone(),
                job_store.clone(),
                event_publisher.clone(),
                options.sync_wait_timeout,
            ),
            submit_clone_handler,
            delete_job_handler: DeleteJobHandler::new(
                job_store.clone(),
                storage,
                event_publisher,
            ),

            // Query handlers
            get_job_handler: GetJobHandler::new(job_store.clone()),
            list_jobs_handler: ListJobsHandler::new(job_store.clone()),
            get_job_result_handler: GetJobResultHandler::new(job_store.clone()),
            get_health_handler: GetHealthHandler::new(job_store, job_queue, engine, worker_stats),
            list_languages_handler: ListLanguagesHandler::new(languages),
        }
    }
}
