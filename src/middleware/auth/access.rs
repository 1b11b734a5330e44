//! service-to-service ID token 検証 → AuthCtx を extensions に入れる
//!
//! - `X-Serverless-Authorization` があればそちらを優先する (署名は proxy が除去済み)
//! - なければ `Authorization` を使い、署名まで検証する
//! - 失敗理由はログにだけ残し、クライアントには一律 401 を返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// 認証が必要なルートに middleware を適用する。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/credentials", get(credentials));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 失敗イベントは verifier が注入された sink に送る
    let authenticated = state
        .verifier
        .authenticate(req.headers(), &state.expected_audience)
        .await
        .map_err(|failure| AppError::unauthorized(&failure, state.expose_auth_detail))?;

    let auth_ctx = AuthCtx::new(authenticated.identity, authenticated.path);

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
