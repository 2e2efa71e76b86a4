//! Job Storage Port - 出站端口
//!
//! 按任务划分的文件存储：每个任务一个目录，存放参考音频与生成音频

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{AudioFormat, AudioRef, JobId};

/// 存储错误
#[derive(Debug, Error)]
pub enum JobStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 存储统计
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    /// 已使用空间（字节）
    pub used_bytes: u64,
    /// 文件数量
    pub file_count: u64,
    /// 任务目录数量
    pub job_count: u64,
}

/// Job Storage Port
#[async_trait]
pub trait JobStoragePort: Send + Sync {
    /// 任务目录
    fn job_dir(&self, job_id: JobId) -> PathBuf;

    /// 参考音频路径
    fn reference_path(&self, job_id: JobId, format: AudioFormat) -> PathBuf;

    /// 生成音频路径
    fn output_path(&self, job_id: JobId) -> PathBuf;

    /// 保存参考音频
    async fn save_reference(
        &self,
        job_id: JobId,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<AudioRef, JobStorageError>;

    /// 保存生成音频
    async fn save_output(&self, job_id: JobId, data: &[u8]) -> Result<PathBuf, JobStorageError>;

    /// 删除任务目录，返回删除的文件数
    async fn delete_job_files(&self, job_id: JobId) -> Result<u64, JobStorageError>;

    /// 获取存储统计
    async fn get_stats(&self) -> Result<StorageStats, JobStorageError>;
}
