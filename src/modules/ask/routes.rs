use axum::{routing::post, Router};

use crate::modules::ask::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ask", post(controller::ask))
}
