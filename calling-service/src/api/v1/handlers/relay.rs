use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::fmt::Display;

use tracing::{error, info, warn};

use crate::api::v1::dto::relay::RelayQuery;
use crate::error::AppError;
use crate::services::service_b::CallError;
use crate::services::token::CredentialHeaderKind;
use crate::state::AppState;

/// Make an authenticated call to the receiving service and relay its answer.
pub async fn relay(
    State(state): State<AppState>,
    Query(query): Query<RelayQuery>,
) -> Result<Response, AppError> {
    let kind = CredentialHeaderKind::from_flag(query.use_x_serverless_authorization);

    let token = state
        .tokens
        .fetch_id_token(&state.audience)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to fetch ID token");
            AppError::TokenFetch { detail: detail(state.expose_error_detail, &e) }
        })?;

    let relayed = state.service_b.call(kind, &token).await.map_err(|e| match e {
        CallError::Status { status, body } => {
            warn!(%status, header = kind.header_name(), "service b rejected the call");
            AppError::Upstream { status, body }
        }
        other => {
            error!(error = %other, "error calling service b");
            AppError::Unreachable {
                detail: detail(state.expose_error_detail, &other),
            }
        }
    })?;

    info!(status = %relayed.status, header = kind.header_name(), "service b call succeeded");

    Ok((
        relayed.status,
        [(header::CONTENT_TYPE, relayed.content_type)],
        relayed.body,
    )
        .into_response())
}

fn detail(expose: bool, e: &impl Display) -> Option<String> {
    expose.then(|| e.to_string())
}
