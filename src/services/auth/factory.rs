/// Factory: build `TokenVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::TokenVerifier;
use crate::services::auth::events::TracingEventSink;
use crate::services::auth::keys::GoogleKeySource;
use crate::services::auth::verifier::VerifierPolicy;

pub fn build_token_verifier(config: &Config) -> Result<Arc<TokenVerifier>, AppError> {
    let keys = GoogleKeySource::new(
        config.google_certs_url.clone(),
        config.key_cache_ttl,
        config.key_min_refresh_interval,
        config.key_fetch_timeout,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to build signing key source");
        AppError::Internal
    })?;

    let policy = VerifierPolicy {
        leeway_seconds: config.token_leeway_seconds,
        key_fetch_timeout: config.key_fetch_timeout,
    };

    Ok(Arc::new(TokenVerifier::new(
        Arc::new(keys),
        Arc::new(TracingEventSink),
        policy,
    )))
}
