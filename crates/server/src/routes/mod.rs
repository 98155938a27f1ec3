use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub mod batch;
pub mod categories;
pub mod health;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/categories", get(categories::list_categories))
        .route("/batch", post(batch::start_batch));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
