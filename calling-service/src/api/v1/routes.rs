use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, relay::relay};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/relay", get(relay))
}
