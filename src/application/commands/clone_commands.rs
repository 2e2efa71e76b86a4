//! Clone Commands - 克隆任务相关命令

use crate::domain::{JobId, JobStatus};

/// 上传的参考音频
#[derive(Debug, Clone, Default)]
pub struct UploadedAudio {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// 提交克隆任务命令
///
/// 字段均为可选：缺失字段在校验阶段报错
#[derive(Debug, Clone, Default)]
pub struct SubmitClone {
    pub text: Option<String>,
    pub language: Option<String>,
    pub audio: Option<UploadedAudio>,
}

/// 提交结果
#[derive(Debug, Clone)]
pub struct SubmitCloneResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// 删除任务命令
#[derive(Debug, Clone)]
pub struct DeleteJob {
    pub job_id: JobId,
}
