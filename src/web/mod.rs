// src/web/mod.rs
// HTTP surface for change analysis

pub mod api;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let analysis_router = Router::new()
        .route("/analyze", post(api::analyze))
        .route("/analyze-single", post(api::analyze_single))
        .route("/health", get(api::health))
        .with_state(state);

    Router::new()
        .route("/health", get(api::server_health))
        .nest("/api/ai-comments", analysis_router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "Listening");
    axum::serve(listener, create_router(state)).await
}
