//! In-Memory Job Store Implementation

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{CreatedJob, JobStats, JobStoreError, JobStorePort};
use crate::domain::{CloneInput, Job, JobId, JobStatus, JobTransition};

struct StoredJob {
    /// 创建序号，用于保持创建顺序
    seq: u64,
    /// 正在等待该任务的调用方数量，大于 0 时不会被淘汰
    holds: usize,
    job: Job,
}

impl StoredJob {
    fn evictable(&self) -> bool {
        self.holds == 0 && self.job.is_terminal()
    }
}

/// 内存任务注册表
///
/// 容量满时淘汰最早结束且无人等待的任务；没有可淘汰的任务则拒绝创建
pub struct InMemoryJobStore {
    /// job_id -> StoredJob
    jobs: DashMap<JobId, StoredJob>,
    next_seq: AtomicU64,
    max_jobs: usize,
    /// 串行化 create，保证容量检查与插入是原子的
    admission: Mutex<()>,
}

impl InMemoryJobStore {
    pub fn new(max_jobs: usize) -> Self {
        Self {
            jobs: DashMap::new(),
            next_seq: AtomicU64::new(0),
            max_jobs: max_jobs.max(1),
            admission: Mutex::new(()),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 找到最早结束的任务
    fn oldest_terminal(&self) -> Option<JobId> {
        self.jobs
            .iter()
            .filter(|entry| entry.evictable())
            .min_by_key(|entry| (entry.job.finished_at(), entry.seq))
            .map(|entry| *entry.key())
    }
}

impl JobStorePort for InMemoryJobStore {
    fn create(&self, input: CloneInput) -> Result<CreatedJob, JobStoreError> {
        let _guard = self.admission.lock().unwrap_or_else(|e| e.into_inner());

        let evicted = if self.jobs.len() >= self.max_jobs {
            let victim = self.oldest_terminal().ok_or(JobStoreError::CapacityExceeded {
                limit: self.max_jobs,
            })?;
            let evicted = self
                .jobs
                .remove_if(&victim, |_, stored| stored.evictable())
                .map(|(_, stored)| stored.job);
            if evicted.is_none() {
                // 被并发 hold 或删除，保守拒绝
                return Err(JobStoreError::CapacityExceeded {
                    limit: self.max_jobs,
                });
            }
            tracing::debug!(job_id = %victim, "Evicted finished job to make room");
            evicted
        } else {
            None
        };

        let job = Job::new(input);
        let job_id = job.id();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.jobs.insert(
            job_id,
            StoredJob {
                seq,
                holds: 0,
                job,
            },
        );

        tracing::debug!(job_id = %job_id, "Job created");
        Ok(CreatedJob { job_id, evicted })
    }

    fn get(&self, id: JobId) -> Result<Job, JobStoreError> {
        self.jobs
            .get(&id)
            .map(|entry| entry.job.clone())
            .ok_or(JobStoreError::NotFound(id))
    }

    fn transition(&self, id: JobId, transition: JobTransition) -> Result<Job, JobStoreError> {
        let mut entry = self.jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;

        let old_status = entry.job.status();
        entry.job.apply(transition)?;

        tracing::debug!(
            job_id = %id,
            old_status = %old_status,
            new_status = %entry.job.status(),
            "Job status changed"
        );
        Ok(entry.job.clone())
    }

    fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<(u64, Job)> = self
            .jobs
            .iter()
            .map(|entry| (entry.seq, entry.job.clone()))
            .collect();
        jobs.sort_by_key(|(seq, _)| *seq);
        jobs.into_iter().map(|(_, job)| job).collect()
    }

    fn remove(&self, id: JobId) -> Result<Job, JobStoreError> {
        let removed = self
            .jobs
            .remove_if(&id, |_, stored| stored.job.is_terminal());

        match removed {
            Some((_, stored)) => Ok(stored.job),
            None if self.jobs.contains_key(&id) => Err(JobStoreError::NotTerminal(id)),
            None => Err(JobStoreError::NotFound(id)),
        }
    }

    fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> Vec<Job> {
        let expired = |stored: &StoredJob| {
            stored.evictable() && stored.job.finished_at().map_or(false, |at| at < cutoff)
        };

        let candidates: Vec<JobId> = self
            .jobs
            .iter()
            .filter(|entry| expired(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        candidates
            .into_iter()
            .filter_map(|id| {
                self.jobs
                    .remove_if(&id, |_, stored| expired(stored))
                    .map(|(_, stored)| stored.job)
            })
            .collect()
    }

    fn hold(&self, id: JobId) -> Result<(), JobStoreError> {
        let mut entry = self.jobs.get_mut(&id).ok_or(JobStoreError::NotFound(id))?;
        entry.holds += 1;
        Ok(())
    }

    fn release(&self, id: JobId) {
        if let Some(mut entry) = self.jobs.get_mut(&id) {
            entry.holds = entry.holds.saturating_sub(1);
        }
    }

    fn stats(&self) -> JobStats {
        let mut stats = JobStats::default();
        for entry in self.jobs.iter() {
            match entry.job.status() {
                JobStatus::Queued => stats.queued += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Succeeded => stats.succeeded += 1,
                JobStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}
