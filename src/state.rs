/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: verifier: TokenVerifier, expected_audience など
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::TokenVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub expected_audience: Arc<str>,
    pub expose_auth_detail: bool,
}

impl AppState {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        expected_audience: impl Into<Arc<str>>,
        expose_auth_detail: bool,
    ) -> Self {
        Self {
            verifier,
            expected_audience: expected_audience.into(),
            expose_auth_detail,
        }
    }
}
