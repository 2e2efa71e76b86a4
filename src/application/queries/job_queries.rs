//! Job Queries - 任务查询

use std::path::PathBuf;

use serde::Serialize;

use crate::application::ports::JobStats;
use crate::domain::{Job, JobId};

/// 获取任务快照
#[derive(Debug, Clone)]
pub struct GetJob {
    pub job_id: JobId,
}

/// 列出最近的任务
#[derive(Debug, Clone)]
pub struct ListJobs {
    pub limit: usize,
}

/// 任务列表
#[derive(Debug, Clone)]
pub struct JobList {
    /// 最近的任务，按创建顺序
    pub jobs: Vec<Job>,
    /// 任务总数
    pub total: usize,
}

/// 获取任务产出
#[derive(Debug, Clone)]
pub struct GetJobResult {
    pub job_id: JobId,
}

/// 任务产出文件
#[derive(Debug, Clone)]
pub struct JobResultFile {
    pub job_id: JobId,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_ms: Option<u64>,
    pub content_type: &'static str,
}

/// 健康检查
#[derive(Debug, Clone)]
pub struct GetHealth;

/// 健康报告
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub engine: &'static str,
    pub engine_available: bool,
    pub queue_depth: usize,
    pub queue_capacity: usize,
    pub workers: usize,
    pub busy_workers: usize,
    pub jobs: JobStats,
    /// 最近几次合成的平均实时率（处理耗时 / 音频时长）
    pub average_rtf: Option<f64>,
}
