//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::application::ApplicationError;
use crate::domain::{JobFailure, JobId};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// 错误码定义（与 HTTP 状态码一致）
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
    pub const GATEWAY_TIMEOUT: i32 = 504;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Conflict(String),
    ServiceUnavailable(String),
    /// 任务以 failed 结束
    JobFailed { job_id: JobId, failure: JobFailure },
    /// 同步等待超时，任务仍在处理
    GatewayTimeout { job_id: JobId },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::JobFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let response = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                ErrorResponse::new(errno::NOT_FOUND, msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg)
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno = errno::CONFLICT, error = %msg, "Resource conflict");
                ErrorResponse::new(errno::CONFLICT, msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg)
            }
            ApiError::JobFailed { job_id, failure } => {
                tracing::warn!(
                    errno = errno::INTERNAL_ERROR,
                    job_id = %job_id,
                    kind = %failure.kind,
                    "Job failed"
                );
                ErrorResponse::new(errno::INTERNAL_ERROR, format!("Job {} failed", job_id))
                    .with_data(json!({
                        "job_id": job_id,
                        "kind": failure.kind,
                        "message": failure.message,
                    }))
            }
            ApiError::GatewayTimeout { job_id } => {
                tracing::warn!(errno = errno::GATEWAY_TIMEOUT, job_id = %job_id, "Job still running");
                ErrorResponse::new(
                    errno::GATEWAY_TIMEOUT,
                    format!("Timed out waiting for job {}", job_id),
                )
                .with_data(json!({
                    "job_id": job_id,
                    "status_url": format!("/api/jobs/{}", job_id),
                }))
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ApplicationError::CapacityExceeded(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::NotFound(id) => ApiError::NotFound(format!("Job not found: {}", id)),
            ApplicationError::NotReady { id, status } => {
                ApiError::Conflict(format!("Job {} is not ready (status: {})", id, status))
            }
            ApplicationError::Failed { id, failure } => ApiError::JobFailed {
                job_id: id,
                failure,
            },
            ApplicationError::WaitTimeout(id) => ApiError::GatewayTimeout { job_id: id },
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}
