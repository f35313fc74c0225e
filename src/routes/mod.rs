pub mod analysis;

use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/analysis", get(analysis::get_analysis))
        .route("/health", get(analysis::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
