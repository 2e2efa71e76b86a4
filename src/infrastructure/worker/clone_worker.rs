//! Clone Worker Pool - Background Voice Cloning Processor
//!
//! 固定数量的长驻 worker 共享同一个队列接收端，按 FIFO 顺序取任务。
//! 单个任务的任何失败（引擎报错、panic、超时、无效输出）只会让该任务进入 failed，
//! worker 本身继续处理下一个任务

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::application::ports::{
    AudioProbePort, JobStoragePort, JobStorePort, SynthesisEnginePort, SynthesisRequest,
};
use crate::domain::{Job, JobFailure, JobId, JobResult, JobTransition};
use crate::infrastructure::events::JobEventPublisher;
use crate::infrastructure::worker::stats::WorkerPoolStats;

/// Worker 池配置
#[derive(Debug, Clone)]
pub struct CloneWorkerConfig {
    /// worker 数量
    pub pool_size: usize,
    /// 单次推理时间上限
    pub engine_timeout: Duration,
}

impl Default for CloneWorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: 1,
            engine_timeout: Duration::from_secs(120),
        }
    }
}

/// 克隆 Worker 池
pub struct CloneWorkerPool {
    config: CloneWorkerConfig,
    queue_receiver: Arc<Mutex<mpsc::Receiver<JobId>>>,
    job_store: Arc<dyn JobStorePort>,
    storage: Arc<dyn JobStoragePort>,
    engine: Arc<dyn SynthesisEnginePort>,
    probe: Arc<dyn AudioProbePort>,
    event_publisher: Arc<JobEventPublisher>,
    stats: Arc<WorkerPoolStats>,
}

impl CloneWorkerPool {
    pub fn new(
        config: CloneWorkerConfig,
        queue_receiver: mpsc::Receiver<JobId>,
        job_store: Arc<dyn JobStorePort>,
        storage: Arc<dyn JobStoragePort>,
        engine: Arc<dyn SynthesisEnginePort>,
        probe: Arc<dyn AudioProbePort>,
        event_publisher: Arc<JobEventPublisher>,
    ) -> Self {
        let stats = Arc::new(WorkerPoolStats::new(config.pool_size.max(1)));
        Self {
            config,
            queue_receiver: Arc::new(Mutex::new(queue_receiver)),
            job_store,
            storage,
            engine,
            probe,
            event_publisher,
            stats,
        }
    }

    /// 运行指标（供健康检查使用）
    pub fn stats(&self) -> Arc<WorkerPoolStats> {
        self.stats.clone()
    }

    /// 启动所有 worker
    ///
    /// 队列发送端全部关闭后 worker 自行退出
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let pool_size = self.stats.pool_size();
        tracing::info!(
            pool_size = pool_size,
            engine = self.engine.name(),
            engine_timeout_secs = self.config.engine_timeout.as_secs(),
            "CloneWorkerPool started"
        );

        let pool = Arc::new(self);
        (0..pool_size)
            .map(|worker_id| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.run_worker(worker_id).await })
            })
            .collect()
    }

    async fn run_worker(&self, worker_id: usize) {
        loop {
            let next = {
                let mut receiver = self.queue_receiver.lock().await;
                receiver.recv().await
            };

            let Some(job_id) = next else {
                break;
            };

            self.process_job(worker_id, job_id).await;
        }

        tracing::info!(worker_id = worker_id, "Clone worker stopped");
    }

    /// 处理单个任务
    async fn process_job(&self, worker_id: usize, job_id: JobId) {
        let job = match self.job_store.transition(job_id, JobTransition::Start) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Cannot start job, skipping");
                return;
            }
        };
        self.event_publisher.publish_status(&job);

        let _busy = self.stats.track_busy();
        let started = Instant::now();

        tracing::info!(
            job_id = %job_id,
            worker_id = worker_id,
            language = %job.input().language,
            text_len = job.input().text.chars().count(),
            "Clone job started"
        );

        let transition = match self.synthesize(&job, started).await {
            Ok(result) => JobTransition::Succeed(result),
            Err(failure) => JobTransition::Fail(failure),
        };

        match self.job_store.transition(job_id, transition) {
            Ok(job) => {
                self.event_publisher.publish_status(&job);
                match (job.result(), job.error()) {
                    (Some(result), _) => tracing::info!(
                        job_id = %job_id,
                        processing_ms = result.processing_ms,
                        duration_ms = ?result.duration_ms,
                        size = result.size_bytes,
                        "Clone job succeeded"
                    ),
                    (_, Some(failure)) => tracing::warn!(
                        job_id = %job_id,
                        kind = %failure.kind,
                        error = %failure.message,
                        "Clone job failed"
                    ),
                    _ => {}
                }
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Failed to finish job");
            }
        }
    }

    /// 调用引擎、校验输出并写入任务目录
    async fn synthesize(&self, job: &Job, started: Instant) -> Result<JobResult, JobFailure> {
        let job_id = job.id();
        let input = job.input();

        let request = SynthesisRequest {
            reference_audio: self.storage.reference_path(job_id, input.reference_format),
            text: input.text.clone(),
            language: input.language,
        };

        let engine = self.engine.clone();
        let mut call = tokio::spawn(async move { engine.synthesize(request).await });

        let output = match tokio::time::timeout(self.config.engine_timeout, &mut call).await {
            Ok(Ok(Ok(output))) => output,
            Ok(Ok(Err(e))) => {
                tracing::error!(job_id = %job_id, error = %e, "Synthesis engine returned an error");
                return Err(JobFailure::engine_failure());
            }
            Ok(Err(e)) => {
                tracing::error!(
                    job_id = %job_id,
                    panicked = e.is_panic(),
                    error = %e,
                    "Synthesis engine call aborted"
                );
                return Err(JobFailure::engine_failure());
            }
            Err(_) => {
                call.abort();
                tracing::error!(
                    job_id = %job_id,
                    timeout_secs = self.config.engine_timeout.as_secs(),
                    "Synthesis engine timed out"
                );
                return Err(JobFailure::timeout(self.config.engine_timeout.as_secs()));
            }
        };

        let info = match self.probe.probe(&output.audio_data) {
            Ok(info) if info.frames > 0 => info,
            Ok(_) => return Err(JobFailure::invalid_output("Engine produced no audio frames")),
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Engine output is not valid audio");
                return Err(JobFailure::invalid_output("Engine output is not valid audio"));
            }
        };

        let audio_path = self
            .storage
            .save_output(job_id, &output.audio_data)
            .await
            .map_err(|e| {
                tracing::error!(job_id = %job_id, error = %e, "Failed to store output audio");
                JobFailure::storage_failure()
            })?;

        let processing_ms = started.elapsed().as_millis() as u64;
        self.stats.record_rtf(processing_ms, info.duration_ms);

        Ok(JobResult {
            audio_path,
            size_bytes: output.audio_data.len() as u64,
            duration_ms: Some(info.duration_ms),
            processing_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::application::ports::{
        JobQueuePort, SynthesisError, SynthesisOutput,
    };
    use crate::domain::{AudioFormat, CloneInput, FailureKind, JobStatus, Language};
    use crate::infrastructure::adapters::{
        silent_wav, FakeEngineMode, FakeSynthesisEngine, FileJobStorage, SymphoniaProbe,
    };
    use crate::infrastructure::events::JobEvent;
    use crate::infrastructure::memory::{BoundedJobQueue, InMemoryJobStore};

    /// 按文本决定行为的测试引擎
    struct ScriptedEngine;

    #[async_trait]
    impl SynthesisEnginePort for ScriptedEngine {
        async fn synthesize(
            &self,
            request: SynthesisRequest,
        ) -> Result<SynthesisOutput, SynthesisError> {
            match request.text.as_str() {
                "hang" => {
                    std::future::pending::<()>().await;
                    Err(SynthesisError::Timeout)
                }
                "panic" => panic!("scripted panic"),
                "error" => Err(SynthesisError::ServiceError("boom".to_string())),
                "garbage" => Ok(SynthesisOutput {
                    audio_data: b"this is plain text, not audio".to_vec(),
                    sample_rate: None,
                }),
                _ => Ok(SynthesisOutput {
                    audio_data: silent_wav(16000, 1, 8000),
                    sample_rate: Some(16000),
                }),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct Harness {
        _dir: TempDir,
        store: Arc<dyn JobStorePort>,
        queue: Arc<BoundedJobQueue>,
        storage: Arc<dyn JobStoragePort>,
        events: Arc<JobEventPublisher>,
        stats: Arc<WorkerPoolStats>,
    }

    impl Harness {
        async fn start(engine: Arc<dyn SynthesisEnginePort>, timeout: Duration) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(100));
            let (queue, receiver) = BoundedJobQueue::new(16);
            let storage: Arc<dyn JobStoragePort> =
                Arc::new(FileJobStorage::new(dir.path()).await.unwrap());
            let events = JobEventPublisher::new().arc();

            let pool = CloneWorkerPool::new(
                CloneWorkerConfig {
                    pool_size: 1,
                    engine_timeout: timeout,
                },
                receiver,
                store.clone(),
                storage.clone(),
                engine,
                Arc::new(SymphoniaProbe::new()),
                events.clone(),
            );
            let stats = pool.stats();
            pool.start();

            Self {
                _dir: dir,
                store,
                queue: queue.arc(),
                storage,
                events,
                stats,
            }
        }

        async fn submit(&self, text: &str) -> JobId {
            let slot = self.queue.try_reserve().unwrap();
            let job_id = self
                .store
                .create(CloneInput {
                    text: text.to_string(),
                    language: Language::English,
                    reference_format: AudioFormat::Wav,
                })
                .unwrap()
                .job_id;
            self.storage
                .save_reference(job_id, AudioFormat::Wav, &silent_wav(16000, 1, 1600))
                .await
                .unwrap();
            slot.dispatch(job_id);
            job_id
        }

        async fn wait_terminal(&self, job_id: JobId) -> Job {
            for _ in 0..200 {
                let job = self.store.get(job_id).unwrap();
                if job.is_terminal() {
                    return job;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            panic!("job {} did not finish", job_id);
        }
    }

    #[tokio::test]
    async fn test_job_succeeds() {
        let h = Harness::start(Arc::new(ScriptedEngine), Duration::from_secs(5)).await;
        let job_id = h.submit("Hello world").await;

        let job = h.wait_terminal(job_id).await;
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert!(job.started_at().is_some());
        assert!(job.error().is_none());

        let result = job.result().unwrap();
        assert_eq!(result.audio_path, h.storage.output_path(job_id));
        assert!(result.audio_path.exists());
        assert_eq!(result.duration_ms, Some(500));
        assert!(h.stats.average_rtf().is_some());
        assert_eq!(h.stats.busy(), 0);
    }

    #[tokio::test]
    async fn test_fifo_dispatch_with_single_worker() {
        let h = Harness::start(Arc::new(ScriptedEngine), Duration::from_secs(5)).await;
        let mut events = h.events.subscribe();

        let mut ids = Vec::new();
        for i in 0..3 {
            ids.push(h.submit(&format!("job number {}", i)).await);
        }
        h.wait_terminal(ids[2]).await;

        let mut started = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let JobEvent::JobStatusChanged {
                job_id,
                status: JobStatus::Running,
                ..
            } = event
            {
                started.push(job_id);
            }
        }
        assert_eq!(started, ids);
    }

    #[tokio::test]
    async fn test_timeout_fails_job_and_worker_continues() {
        let h = Harness::start(Arc::new(ScriptedEngine), Duration::from_millis(100)).await;
        let stuck = h.submit("hang").await;
        let next = h.submit("Hello again").await;

        let job = h.wait_terminal(stuck).await;
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error().unwrap().kind, FailureKind::Timeout);
        assert!(job.result().is_none());

        let job = h.wait_terminal(next).await;
        assert_eq!(job.status(), JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_engine_panic_is_contained() {
        let h = Harness::start(Arc::new(ScriptedEngine), Duration::from_secs(5)).await;
        let crashed = h.submit("panic").await;
        let next = h.submit("still alive").await;

        let job = h.wait_terminal(crashed).await;
        assert_eq!(job.error().unwrap().kind, FailureKind::EngineFailure);

        let job = h.wait_terminal(next).await;
        assert_eq!(job.status(), JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_engine_error() {
        let h = Harness::start(Arc::new(ScriptedEngine), Duration::from_secs(5)).await;
        let job_id = h.submit("error").await;

        let job = h.wait_terminal(job_id).await;
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error().unwrap().kind, FailureKind::EngineFailure);
    }

    #[tokio::test]
    async fn test_empty_output_is_invalid() {
        let engine = Arc::new(FakeSynthesisEngine::with_mode(FakeEngineMode::Empty));
        let h = Harness::start(engine, Duration::from_secs(5)).await;
        let job_id = h.submit("Hello world").await;

        let job = h.wait_terminal(job_id).await;
        assert_eq!(job.error().unwrap().kind, FailureKind::InvalidOutput);
        assert!(!h.storage.output_path(job_id).exists());
    }

    #[tokio::test]
    async fn test_undecodable_output_keeps_fixed_message() {
        let h = Harness::start(Arc::new(ScriptedEngine), Duration::from_secs(5)).await;
        let job_id = h.submit("garbage").await;

        let job = h.wait_terminal(job_id).await;
        let failure = job.error().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidOutput);
        assert_eq!(failure.message, "Engine output is not valid audio");
        assert!(!h.storage.output_path(job_id).exists());
    }

    #[tokio::test]
    async fn test_fake_engine_end_to_end() {
        let engine = Arc::new(FakeSynthesisEngine::with_mode(FakeEngineMode::Succeed));
        let h = Harness::start(engine, Duration::from_secs(5)).await;
        let job_id = h.submit("one two three four five").await;

        let job = h.wait_terminal(job_id).await;
        assert_eq!(job.status(), JobStatus::Succeeded);
        assert_eq!(job.result().unwrap().duration_ms, Some(2000));
    }
}
