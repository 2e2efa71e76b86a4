//! Retention Sweeper - 过期任务清理
//!
//! 周期性淘汰结束时间早于保留窗口的任务，并删除其任务目录

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::application::ports::{JobStoragePort, JobStorePort};
use crate::infrastructure::events::JobEventPublisher;

/// 清理配置
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// 任务结束后保留多久
    pub window: Duration,
    /// 扫描间隔
    pub interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(4 * 3600),
            interval: Duration::from_secs(600),
        }
    }
}

/// 过期任务清理器
pub struct RetentionSweeper {
    config: RetentionConfig,
    job_store: Arc<dyn JobStorePort>,
    storage: Arc<dyn JobStoragePort>,
    event_publisher: Arc<JobEventPublisher>,
}

impl RetentionSweeper {
    pub fn new(
        config: RetentionConfig,
        job_store: Arc<dyn JobStorePort>,
        storage: Arc<dyn JobStoragePort>,
        event_publisher: Arc<JobEventPublisher>,
    ) -> Self {
        Self {
            config,
            job_store,
            storage,
            event_publisher,
        }
    }

    /// 执行一次清理，返回淘汰的任务数
    pub async fn sweep(&self) -> usize {
        let window = chrono::Duration::from_std(self.config.window)
            .unwrap_or_else(|_| chrono::Duration::days(365));
        let cutoff = Utc::now() - window;

        let expired = self.job_store.evict_finished_before(cutoff);
        if expired.is_empty() {
            return 0;
        }

        let mut deleted_files = 0u64;
        for job in &expired {
            match self.storage.delete_job_files(job.id()).await {
                Ok(count) => deleted_files += count,
                Err(e) => {
                    tracing::warn!(job_id = %job.id(), error = %e, "Failed to delete job files")
                }
            }
            self.event_publisher.publish_removed(job.id());
        }

        tracing::info!(
            jobs = expired.len(),
            files = deleted_files,
            "Expired jobs cleaned up"
        );
        expired.len()
    }

    /// 启动后台清理循环
    pub fn start(self) -> JoinHandle<()> {
        tracing::info!(
            window_secs = self.config.window.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "RetentionSweeper started"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioFormat, CloneInput, JobFailure, JobTransition, Language};
    use crate::infrastructure::adapters::FileJobStorage;
    use crate::infrastructure::events::JobEvent;
    use crate::infrastructure::memory::InMemoryJobStore;

    fn input() -> CloneInput {
        CloneInput {
            text: "Hello world".to_string(),
            language: Language::English,
            reference_format: AudioFormat::Wav,
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_finished_jobs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(10));
        let storage: Arc<dyn JobStoragePort> =
            Arc::new(FileJobStorage::new(dir.path()).await.unwrap());
        let events = JobEventPublisher::new().arc();
        let mut rx = events.subscribe();

        let finished = store.create(input()).unwrap().job_id;
        let pending = store.create(input()).unwrap().job_id;
        for id in [finished, pending] {
            storage.save_reference(id, AudioFormat::Wav, b"ref").await.unwrap();
        }
        store.transition(finished, JobTransition::Start).unwrap();
        store
            .transition(finished, JobTransition::Fail(JobFailure::engine_failure()))
            .unwrap();

        let sweeper = RetentionSweeper::new(
            RetentionConfig {
                window: Duration::ZERO,
                interval: Duration::from_secs(60),
            },
            store.clone(),
            storage.clone(),
            events,
        );

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(sweeper.sweep().await, 1);

        assert!(store.get(finished).is_err());
        assert!(!storage.job_dir(finished).exists());
        assert!(store.get(pending).is_ok());
        assert!(storage.job_dir(pending).exists());
        assert_eq!(
            rx.recv().await.unwrap(),
            JobEvent::JobRemoved { job_id: finished }
        );
    }

    #[tokio::test]
    async fn test_sweep_keeps_jobs_inside_window() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(10));
        let storage: Arc<dyn JobStoragePort> =
            Arc::new(FileJobStorage::new(dir.path()).await.unwrap());

        let id = store.create(input()).unwrap().job_id;
        store.transition(id, JobTransition::Start).unwrap();
        store
            .transition(id, JobTransition::Fail(JobFailure::engine_failure()))
            .unwrap();

        let sweeper = RetentionSweeper::new(
            RetentionConfig::default(),
            store.clone(),
            storage,
            JobEventPublisher::new().arc(),
        );
        assert_eq!(sweeper.sweep().await, 0);
        assert!(store.get(id).is_ok());
    }
}
