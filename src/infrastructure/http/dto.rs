//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FailureKind, Job, JobId, JobStatus, Language};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize, Deserialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Job DTOs
// ============================================================================

/// 任务资源的 URL
pub fn status_url(base_url: &str, job_id: JobId) -> String {
    format!("{}/api/jobs/{}", base_url.trim_end_matches('/'), job_id)
}

pub fn result_url(base_url: &str, job_id: JobId) -> String {
    format!("{}/result", status_url(base_url, job_id))
}

/// 异步提交响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmittedJobResponse {
    pub id: JobId,
    pub status: JobStatus,
    pub status_url: String,
    pub result_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResultDto {
    pub url: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub processing_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobErrorDto {
    pub kind: FailureKind,
    pub message: String,
}

/// 任务快照
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: JobId,
    pub status: JobStatus,
    pub language: String,
    pub text_length: usize,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResultDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobErrorDto>,
}

impl JobResponse {
    pub fn from_job(job: &Job, base_url: &str) -> Self {
        Self {
            id: job.id(),
            status: job.status(),
            language: job.input().language.name().to_string(),
            text_length: job.input().text.chars().count(),
            created_at: job.created_at(),
            started_at: job.started_at(),
            finished_at: job.finished_at(),
            result: job.result().map(|r| JobResultDto {
                url: result_url(base_url, job.id()),
                size_bytes: r.size_bytes,
                duration_ms: r.duration_ms,
                processing_ms: r.processing_ms,
            }),
            error: job.error().map(|e| JobErrorDto {
                kind: e.kind,
                message: e.message.clone(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    pub total: usize,
}

// ============================================================================
// Language DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageDto {
    pub name: String,
    pub code: String,
}

impl From<Language> for LanguageDto {
    fn from(language: Language) -> Self {
        Self {
            name: language.name().to_string(),
            code: language.code().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageDto>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioFormat, CloneInput, JobFailure, JobTransition};

    #[test]
    fn test_urls() {
        let id = JobId::new();
        assert_eq!(status_url("", id), format!("/api/jobs/{}", id));
        assert_eq!(
            result_url("https://voice.example.com/", id),
            format!("https://voice.example.com/api/jobs/{}/result", id)
        );
    }

    #[test]
    fn test_failed_job_response() {
        let mut job = Job::new(CloneInput {
            text: "Bonjour à tous".to_string(),
            language: Language::French,
            reference_format: AudioFormat::Wav,
        });
        job.apply(JobTransition::Start).unwrap();
        job.apply(JobTransition::Fail(JobFailure::timeout(120))).unwrap();

        let json = serde_json::to_value(JobResponse::from_job(&job, "")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["language"], "French");
        assert_eq!(json["text_length"], 14);
        assert_eq!(json["error"]["kind"], "timeout");
        assert!(json.get("result").is_none());
        assert!(json["finished_at"].is_string());
    }
}
