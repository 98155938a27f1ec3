use axum::{extract::State, response::Json as ResponseJson};
use services::services::categories::Category;
use utils::response::ApiResponse;

use crate::AppState;

pub async fn list_categories(State(state): State<AppState>) -> ResponseJson<ApiResponse<Vec<Category>>> {
    ResponseJson(ApiResponse::success(state.categories().to_vec()))
}
