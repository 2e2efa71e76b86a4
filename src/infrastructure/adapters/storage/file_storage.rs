//! File Storage - 文件系统任务存储实现
//!
//! 实现 JobStoragePort trait，目录布局：
//! `<root>/<job_id>/reference.<ext>` 与 `<root>/<job_id>/output.wav`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{JobStorageError, JobStoragePort, StorageStats};
use crate::domain::{AudioFormat, AudioRef, JobId};

/// 文件系统任务存储
pub struct FileJobStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileJobStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, JobStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn write_into_job_dir(
        &self,
        job_id: JobId,
        path: &Path,
        data: &[u8],
    ) -> Result<(), JobStorageError> {
        fs::create_dir_all(self.job_dir(job_id))
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?;

        fs::write(path, data)
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))
    }
}

#[async_trait]
impl JobStoragePort for FileJobStorage {
    fn job_dir(&self, job_id: JobId) -> PathBuf {
        self.base_dir.join(job_id.to_string())
    }

    fn reference_path(&self, job_id: JobId, format: AudioFormat) -> PathBuf {
        self.job_dir(job_id)
            .join(format!("reference.{}", format.extension()))
    }

    fn output_path(&self, job_id: JobId) -> PathBuf {
        self.job_dir(job_id).join("output.wav")
    }

    async fn save_reference(
        &self,
        job_id: JobId,
        format: AudioFormat,
        data: &[u8],
    ) -> Result<AudioRef, JobStorageError> {
        let path = self.reference_path(job_id, format);
        self.write_into_job_dir(job_id, &path, data).await?;

        tracing::debug!(
            job_id = %job_id,
            format = format.extension(),
            size = data.len(),
            "Saved reference audio"
        );

        Ok(AudioRef::new(path, format))
    }

    async fn save_output(&self, job_id: JobId, data: &[u8]) -> Result<PathBuf, JobStorageError> {
        let path = self.output_path(job_id);
        self.write_into_job_dir(job_id, &path, data).await?;

        tracing::debug!(job_id = %job_id, size = data.len(), "Saved output audio");

        Ok(path)
    }

    async fn delete_job_files(&self, job_id: JobId) -> Result<u64, JobStorageError> {
        let job_dir = self.job_dir(job_id);

        if !job_dir.exists() {
            return Ok(0);
        }

        let mut deleted_count = 0u64;
        let mut entries = fs::read_dir(&job_dir)
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?
        {
            if entry.path().is_file() {
                fs::remove_file(entry.path())
                    .await
                    .map_err(|e| JobStorageError::IoError(e.to_string()))?;
                deleted_count += 1;
            }
        }

        fs::remove_dir(&job_dir)
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?;

        tracing::debug!(job_id = %job_id, files = deleted_count, "Deleted job files");

        Ok(deleted_count)
    }

    async fn get_stats(&self) -> Result<StorageStats, JobStorageError> {
        let mut stats = StorageStats::default();

        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| JobStorageError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.is_dir() {
                stats.job_count += 1;

                if let Ok(mut job_entries) = fs::read_dir(&path).await {
                    while let Ok(Some(file_entry)) = job_entries.next_entry().await {
                        if let Ok(metadata) = file_entry.metadata().await {
                            if metadata.is_file() {
                                stats.file_count += 1;
                                stats.used_bytes += metadata.len();
                            }
                        }
                    }
                }
            }
        }

        Ok(stats)
    }
}
