//! ID token verification for inbound service-to-service requests.
//!
//! One entry point, one branch. The selected header decides the path:
//!
//! - `Authorization` (signed): full verification against the provider's
//!   signing keys (signature, `exp`, `iss`, `aud`).
//! - `X-Serverless-Authorization` (stripped): the proxy replaced the
//!   signature with a sentinel, so it can never verify here. The payload is
//!   decoded as-is and only `aud` and `iss` are checked.
//!
//! Both paths produce `Claims` and report failures as `AuthFailure`, so the
//! caller does not care which header arrived.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use base64::Engine as _;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::claims::{ACCEPTED_ISSUERS, Claims, VerifiedIdentity, extract_identity};
use super::credential::{parse_credential, select_credential};
use super::events::{
    AuthEventSink, AuthenticatedEvent, RejectedEvent, VerificationPath, token_fingerprint,
};
use super::keys::KeySource;
use super::AuthFailure;

/// Knobs for the strict path.
#[derive(Debug, Clone, Copy)]
pub struct VerifierPolicy {
    // Allowed clock skew for `exp`, seconds.
    pub leeway_seconds: u64,
    // Upper bound on the signing-key lookup (may hit the network).
    pub key_fetch_timeout: Duration,
}

impl Default for VerifierPolicy {
    fn default() -> Self {
        Self {
            leeway_seconds: 60,
            key_fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// A request that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub identity: VerifiedIdentity,
    pub path: VerificationPath,
}

#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeySource>,
    sink: Arc<dyn AuthEventSink>,
    policy: VerifierPolicy,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("policy", &self.policy)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(
        keys: Arc<dyn KeySource>,
        sink: Arc<dyn AuthEventSink>,
        policy: VerifierPolicy,
    ) -> Self {
        Self { keys, sink, policy }
    }

    /// Authenticate a request from its headers and return the caller identity.
    pub async fn verify_request(
        &self,
        headers: &HeaderMap,
        expected_audience: &str,
    ) -> Result<VerifiedIdentity, AuthFailure> {
        self.authenticate(headers, expected_audience)
            .await
            .map(|authenticated| authenticated.identity)
    }

    /// Like `verify_request`, but also says which path accepted the token.
    ///
    /// This is the entry point for middleware. Every outcome is reported to the
    /// event sink exactly once.
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        expected_audience: &str,
    ) -> Result<Authenticated, AuthFailure> {
        let credential = match select_credential(headers) {
            Ok(credential) => credential,
            Err(failure) => {
                self.sink.rejected(&RejectedEvent {
                    path: None,
                    failure: &failure,
                    token_fingerprint: None,
                });
                return Err(failure);
            }
        };

        let path = VerificationPath::from_stripped(credential.signature_already_stripped);
        debug!(path = path.as_str(), "credential header selected");

        let token = match parse_credential(&credential.value) {
            Ok(parsed) => parsed.token,
            Err(failure) => {
                self.sink.rejected(&RejectedEvent {
                    path: Some(path),
                    failure: &failure,
                    token_fingerprint: None,
                });
                return Err(failure);
            }
        };

        let fingerprint = token_fingerprint(&token);

        let outcome = self
            .verify_token(&token, credential.signature_already_stripped, expected_audience)
            .await
            .and_then(|claims| extract_identity(&claims));

        match &outcome {
            Ok(identity) => self.sink.authenticated(&AuthenticatedEvent {
                path,
                identity: identity.as_str(),
                token_fingerprint: fingerprint,
            }),
            Err(failure) => self.sink.rejected(&RejectedEvent {
                path: Some(path),
                failure,
                token_fingerprint: Some(fingerprint),
            }),
        }

        outcome.map(|identity| Authenticated { identity, path })
    }

    async fn verify_token(
        &self,
        token: &str,
        signature_already_stripped: bool,
        expected_audience: &str,
    ) -> Result<Claims, AuthFailure> {
        if expected_audience.is_empty() {
            return Err(AuthFailure::invalid_token("expected audience is not configured"));
        }

        if signature_already_stripped {
            decode_unverified(token, expected_audience)
        } else {
            self.verify_signed(token, expected_audience).await
        }
    }

    async fn verify_signed(&self, token: &str, expected_audience: &str) -> Result<Claims, AuthFailure> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthFailure::invalid_token(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthFailure::invalid_token(format!(
                "unsupported signing algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthFailure::invalid_token("token header has no `kid`"))?;

        let jwk = tokio::time::timeout(self.policy.key_fetch_timeout, self.keys.signing_key(&kid))
            .await
            .map_err(|_| AuthFailure::invalid_token("signing keys unavailable: timed out"))?
            .map_err(|e| AuthFailure::invalid_token(e.to_string()))?;

        let decoding_key =
            DecodingKey::from_jwk(&jwk).map_err(|e| AuthFailure::invalid_token(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&ACCEPTED_ISSUERS);
        validation.set_audience(&[expected_audience]);
        validation.leeway = self.policy.leeway_seconds;

        let data = jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AuthFailure::invalid_token(e.to_string()))?;

        Ok(data.claims)
    }
}

/// Decode a token whose signature was stripped upstream and check `aud`/`iss`.
///
/// Signature and expiry are NOT checked here: the authenticating proxy has
/// already done both, and the signature segment is a sentinel.
pub fn decode_unverified(token: &str, expected_audience: &str) -> Result<Claims, AuthFailure> {
    if expected_audience.is_empty() {
        return Err(AuthFailure::invalid_token("expected audience is not configured"));
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthFailure::invalid_token(format!(
            "expected 3 token segments, found {}",
            segments.len()
        )));
    }

    // The JOSE header must still parse. An `alg` jsonwebtoken does not know
    // (including `none`) is rejected here even though no signature is checked.
    jsonwebtoken::decode_header(token).map_err(|e| AuthFailure::invalid_token(e.to_string()))?;

    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| AuthFailure::invalid_token(format!("payload is not base64url: {e}")))?;

    let claims: Claims = serde_json::from_slice(&payload)
        .map_err(|e| AuthFailure::invalid_token(format!("payload is not a claims object: {e}")))?;

    if claims.aud.is_null() {
        return Err(AuthFailure::invalid_token("missing `aud` claim"));
    }
    if !claims.audience_matches(expected_audience) {
        return Err(AuthFailure::invalid_token("audience mismatch"));
    }

    match claims.iss.as_deref() {
        None => return Err(AuthFailure::invalid_token("missing `iss` claim")),
        Some(iss) if !claims.issuer_accepted() => {
            return Err(AuthFailure::invalid_token(format!("untrusted issuer `{iss}`")));
        }
        Some(_) => {}
    }

    Ok(claims)
}
