//! Language Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::ListLanguages;
use crate::infrastructure::http::dto::{ApiResponse, LanguageDto, LanguagesResponse};
use crate::infrastructure::http::state::AppState;

/// 列出启用的语言
pub async fn list_languages(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<LanguagesResponse>> {
    let languages: Vec<LanguageDto> = state
        .list_languages_handler
        .handle(ListLanguages)
        .into_iter()
        .map(LanguageDto::from)
        .collect();

    Json(ApiResponse::success(LanguagesResponse {
        count: languages.len(),
        languages,
    }))
}
