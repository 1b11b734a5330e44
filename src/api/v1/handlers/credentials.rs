/*
 * Responsibility
 * - GET /credentials (認証済みの呼び出し元を返す)
 * - 検証は middleware 済みなので、handler は AuthCtx を受け取るだけ
 */
use axum::Json;

use crate::api::v1::dto::credentials::CredentialsResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn credentials(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<CredentialsResponse> {
    Json(CredentialsResponse {
        message: format!("Credentials: {}", ctx.email()),
        email: ctx.email().to_string(),
        verification: ctx.path.as_str(),
        signature_verified_here: ctx.signature_verified_here(),
    })
}
