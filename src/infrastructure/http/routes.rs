//! HTTP Routes
//!
//! API Endpoints:
//! - /api/clone             POST    同步克隆，直接返回音频
//! - /api/clone/async       POST    异步克隆，返回任务 ID
//! - /api/jobs              GET     列出最近的任务（?limit=N）
//! - /api/jobs/:id          GET     任务状态
//! - /api/jobs/:id          DELETE  删除已结束的任务
//! - /api/jobs/:id/result   GET     下载生成的音频
//! - /api/languages         GET     启用的语言
//! - /api/health            GET     健康检查
//! - /ws/jobs               WS      任务状态事件（?job_id= 过滤）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/jobs", get(handlers::job_events_websocket))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/languages", get(handlers::list_languages))
        .nest("/clone", clone_routes())
        .nest("/jobs", job_routes())
}

/// Clone 路由
fn clone_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::clone_sync))
        .route("/async", post(handlers::clone_async))
}

/// Job 路由
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_jobs))
        .route(
            "/:job_id",
            get(handlers::get_job).delete(handlers::delete_job),
        )
        .route("/:job_id/result", get(handlers::get_job_result))
}
