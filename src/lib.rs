use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod modules;
pub mod services;

use modules::session::crud::SessionStore;
use services::ModelRegistry;

#[derive(Clone)]
pub struct AppState {
    pub models: ModelRegistry,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Single-origin CORS with cookies allowed.
pub fn cors(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(modules::ask::routes::routes())
        .layer(cors(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
