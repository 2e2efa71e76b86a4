//! Job Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{JobQueuePort, JobStorePort, SynthesisEnginePort};
use crate::application::queries::job_queries::*;
use crate::domain::{Job, JobFailure, JobStatus};
use crate::infrastructure::worker::WorkerPoolStats;

/// GetJob Handler - 获取任务快照
pub struct GetJobHandler {
    job_store: Arc<dyn JobStorePort>,
}

impl GetJobHandler {
    pub fn new(job_store: Arc<dyn JobStorePort>) -> Self {
        Self { job_store }
    }

    pub fn handle(&self, query: GetJob) -> Result<Job, ApplicationError> {
        Ok(self.job_store.get(query.job_id)?)
    }
}

/// ListJobs Handler - 列出最近的任务
pub struct ListJobsHandler {
    job_store: Arc<dyn JobStorePort>,
}

impl ListJobsHandler {
    pub fn new(job_store: Arc<dyn JobStorePort>) -> Self {
        Self { job_store }
    }

    pub fn handle(&self, query: ListJobs) -> JobList {
        let mut jobs = self.job_store.list();
        let total = jobs.len();
        if total > query.limit {
            jobs.drain(..total - query.limit);
        }
        JobList { jobs, total }
    }
}

/// GetJobResult Handler - 获取成功任务的音频文件
pub struct GetJobResultHandler {
    job_store: Arc<dyn JobStorePort>,
}

impl GetJobResultHandler {
    pub fn new(job_store: Arc<dyn JobStorePort>) -> Self {
        Self { job_store }
    }

    pub fn handle(&self, query: GetJobResult) -> Result<JobResultFile, ApplicationError> {
        let job = self.job_store.get(query.job_id)?;

        match job.status() {
            JobStatus::Queued | JobStatus::Running => Err(ApplicationError::NotReady {
                id: query.job_id,
                status: job.status().to_string(),
            }),
            JobStatus::Failed => Err(ApplicationError::Failed {
                id: query.job_id,
                failure: job
                    .error()
                    .cloned()
                    .unwrap_or_else(JobFailure::engine_failure),
            }),
            JobStatus::Succeeded => {
                let result = job.result().ok_or_else(|| {
                    ApplicationError::internal(format!(
                        "Job {} succeeded without a result",
                        query.job_id
                    ))
                })?;

                Ok(JobResultFile {
                    job_id: query.job_id,
                    path: result.audio_path.clone(),
                    size_bytes: result.size_bytes,
                    duration_ms: result.duration_ms,
                    content_type: "audio/wav",
                })
            }
        }
    }
}

/// GetHealth Handler - 运行状态
pub struct GetHealthHandler {
    job_store: Arc<dyn JobStorePort>,
    job_queue: Arc<dyn JobQueuePort>,
    engine: Arc<dyn SynthesisEnginePort>,
    worker_stats: Arc<WorkerPoolStats>,
}

impl GetHealthHandler {
    pub fn new(
        job_store: Arc<dyn JobStorePort>,
        job_queue: Arc<dyn JobQueuePort>,
        engine: Arc<dyn SynthesisEnginePort>,
        worker_stats: Arc<WorkerPoolStats>,
    ) -> Self {
        Self {
            job_store,
            job_queue,
            engine,
            worker_stats,
        }
    }

    pub async fn handle(&self, _query: GetHealth) -> HealthReport {
        let engine_available = self.engine.health_check().await;

        HealthReport {
            status: if engine_available { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            engine: self.engine.name(),
            engine_available,
            queue_depth: self.job_queue.depth(),
            queue_capacity: self.job_queue.capacity(),
            workers: self.worker_stats.pool_size(),
            busy_workers: self.worker_stats.busy(),
            jobs: self.job_store.stats(),
            average_rtf: self.worker_stats.average_rtf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::JobStorePort;
    use crate::domain::{AudioFormat, CloneInput, JobId, JobResult, JobTransition, Language};
    use crate::infrastructure::memory::InMemoryJobStore;
    use std::path::PathBuf;

    fn input(text: &str) -> CloneInput {
        CloneInput {
            text: text.to_string(),
            language: Language::English,
            reference_format: AudioFormat::Wav,
        }
    }

    #[test]
    fn test_result_not_found() {
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(10));
        let handler = GetJobResultHandler::new(store);
        let result = handler.handle(GetJobResult { job_id: JobId::new() });
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[test]
    fn test_result_not_ready_then_ready() {
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(10));
        let handler = GetJobResultHandler::new(store.clone());
        let job_id = store.create(input("Hello world")).unwrap().job_id;

        let result = handler.handle(GetJobResult { job_id });
        assert!(matches!(result, Err(ApplicationError::NotReady { .. })));

        store.transition(job_id, JobTransition::Start).unwrap();
        let result = handler.handle(GetJobResult { job_id });
        assert!(matches!(result, Err(ApplicationError::NotReady { .. })));

        store
            .transition(
                job_id,
                JobTransition::Succeed(JobResult {
                    audio_path: PathBuf::from("/tmp/output.wav"),
                    size_bytes: 1024,
                    duration_ms: Some(500),
                    processing_ms: 100,
                }),
            )
            .unwrap();
        let file = handler.handle(GetJobResult { job_id }).unwrap();
        assert_eq!(file.path, PathBuf::from("/tmp/output.wav"));
        assert_eq!(file.size_bytes, 1024);
    }

    #[test]
    fn test_result_failed_surfaces_error() {
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(10));
        let handler = GetJobResultHandler::new(store.clone());
        let job_id = store.create(input("Hello world")).unwrap().job_id;
        store.transition(job_id, JobTransition::Start).unwrap();
        store
            .transition(job_id, JobTransition::Fail(JobFailure::timeout(30)))
            .unwrap();

        match handler.handle(GetJobResult { job_id }) {
            Err(ApplicationError::Failed { id, failure }) => {
                assert_eq!(id, job_id);
                assert_eq!(failure, JobFailure::timeout(30));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_list_jobs_limit_keeps_most_recent() {
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(10));
        let handler = ListJobsHandler::new(store.clone());
        let ids: Vec<JobId> = (0..5)
            .map(|i| store.create(input(&format!("text {}", i))).unwrap().job_id)
            .collect();

        let list = handler.handle(ListJobs { limit: 2 });
        assert_eq!(list.total, 5);
        let listed: Vec<JobId> = list.jobs.iter().map(|j| j.id()).collect();
        assert_eq!(listed, ids[3..].to_vec());
    }
}
