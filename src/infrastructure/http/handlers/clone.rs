//! Clone HTTP Handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{SubmitClone, UploadedAudio};
use crate::infrastructure::http::dto::{
    result_url, status_url, ApiResponse, SubmittedJobResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::handlers::jobs::audio_file_response;
use crate::infrastructure::http::state::AppState;

/// 读取 multipart 表单: text, language, audio
async fn read_clone_form(mut multipart: Multipart) -> Result<SubmitClone, ApiError> {
    let mut cmd = SubmitClone::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "text" => {
                cmd.text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read text: {}", e)))?,
                );
            }
            "language" => {
                cmd.language = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read language: {}", e))
                })?);
            }
            "audio" => {
                let file_name = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read audio: {}", e)))?
                    .to_vec();

                cmd.audio = Some(UploadedAudio {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok(cmd)
}

/// 同步克隆：等待任务结束后直接返回音频
pub async fn clone_sync(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let cmd = read_clone_form(multipart).await?;
    // 打开文件前保持持有，防止产出被淘汰
    let (job, _hold) = state.clone_and_wait_handler.handle(cmd).await?;

    let result = job
        .result()
        .ok_or_else(|| ApiError::Internal(format!("Job {} has no result", job.id())))?;

    audio_file_response(job.id(), &result.audio_path, result.duration_ms).await
}

/// 异步克隆：立即返回任务 ID
pub async fn clone_async(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<SubmittedJobResponse>>), ApiError> {
    let cmd = read_clone_form(multipart).await?;
    let submitted = state.submit_clone_handler.handle(cmd).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(SubmittedJobResponse {
            id: submitted.job_id,
            status: submitted.status,
            status_url: status_url(&state.base_url, submitted.job_id),
            result_url: result_url(&state.base_url, submitted.job_id),
        })),
    ))
}
