/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は認証なし、/credentials は ID token 必須
 * - 認証が必要な範囲への middleware 適用もここで決める
 */
use axum::{Router, routing::get};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{credentials::credentials, health::health};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/credentials", get(credentials));
    let protected = middleware::auth::access::apply(protected, state);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
}
