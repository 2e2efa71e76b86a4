//! Job HTTP Handlers

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::fs;
use tokio_util::io::ReaderStream;

use crate::application::{DeleteJob, GetJob, GetJobResult, ListJobs};
use crate::domain::JobId;
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, JobListResponse, JobResponse, ListJobsParams,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

const DEFAULT_LIST_LIMIT: usize = 50;

pub const JOB_ID_HEADER: &str = "X-Job-Id";
pub const DURATION_HEADER: &str = "X-Audio-Duration-Ms";

/// 无法解析的 ID 与不存在的任务同样处理
fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::parse(raw).ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", raw)))
}

/// 以流的方式返回任务产出的 WAV
pub async fn audio_file_response(
    job_id: JobId,
    path: &FsPath,
    duration_ms: Option<u64>,
) -> Result<Response, ApiError> {
    let file = fs::File::open(path).await.map_err(|e| {
        ApiError::Internal(format!("Failed to open output of job {}: {}", job_id, e))
    })?;
    let size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read output metadata: {}", e)))?
        .len();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.wav\"", job_id),
        )
        .header(JOB_ID_HEADER, job_id.to_string());

    if let Some(duration_ms) = duration_ms {
        builder = builder.header(DURATION_HEADER, duration_ms);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 获取任务快照
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<JobResponse>>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let job = state.get_job_handler.handle(GetJob { job_id })?;

    Ok(Json(ApiResponse::success(JobResponse::from_job(
        &job,
        &state.base_url,
    ))))
}

/// 列出最近的任务
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Json<ApiResponse<JobListResponse>> {
    let list = state.list_jobs_handler.handle(ListJobs {
        limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
    });

    Json(ApiResponse::success(JobListResponse {
        jobs: list
            .jobs
            .iter()
            .map(|job| JobResponse::from_job(job, &state.base_url))
            .collect(),
        total: list.total,
    }))
}

/// 下载任务产出
pub async fn get_job_result(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let file = state
        .get_job_result_handler
        .handle(GetJobResult { job_id })?;

    audio_file_response(file.job_id, &file.path, file.duration_ms).await
}

/// 删除已结束的任务
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    state.delete_job_handler.handle(DeleteJob { job_id }).await?;

    Ok(Json(ApiResponse::ok()))
}
