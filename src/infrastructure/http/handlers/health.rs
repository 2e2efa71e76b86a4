//! Health Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetHealth, HealthReport};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;

/// 健康检查
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthReport>> {
    Json(ApiResponse::success(
        state.get_health_handler.handle(GetHealth).await,
    ))
}
