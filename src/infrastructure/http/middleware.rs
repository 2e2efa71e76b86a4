//! HTTP Middleware
//!
//! 按状态码记录失败请求

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 失败请求日志中间件
///
/// 4xx 记为 warn，5xx 记为 error，同时记录耗时。
/// 业务错误的详细原因在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "Request failed"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "Request rejected"
        );
    }

    response
}
