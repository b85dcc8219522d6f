use crate::handlers::*;
use crate::ws::ws_handler;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub fn create_app_router(state: Arc<AppState>) -> Router {
    api_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Same API plus the chat page under `/ui`.
pub fn create_app_router_with_ui(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    create_app_router(state).nest_service(
        "/ui",
        ServeDir::new(static_dir.as_ref()).append_index_html_on_directories(true),
    )
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root_handler))
        .route("/agents", get(list_agents))
        .route("/agents/{agent_id}", get(get_agent))
        .route("/agents/{agent_id}/chat", post(chat_with_agent))
        .route("/teams", get(list_teams))
        .route("/teams/{team_id}", get(get_team))
        .route("/teams/{team_id}/chat", post(chat_with_team))
        .route("/health", get(health_check))
        .route("/health/ollama", get(ollama_health))
        .route("/ws", get(ws_handler))
        .route("/ws/status", get(ws_status))
        .route("/webhooks/whatsapp", post(whatsapp_webhook))
}
