//! Authentication outcome events.
//!
//! The verifier reports through an injected `AuthEventSink` instead of calling
//! the global logger directly, so hosts can route or capture the events.

use base64::Engine as _;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::AuthFailure;

/// Which credential path a request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationPath {
    /// `Authorization`: signature checked against the provider keys.
    Strict,
    /// `X-Serverless-Authorization`: signature stripped by the proxy, claims checked only.
    Lenient,
}

impl VerificationPath {
    pub fn from_stripped(signature_already_stripped: bool) -> Self {
        if signature_already_stripped {
            Self::Lenient
        } else {
            Self::Strict
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedEvent<'a> {
    pub path: VerificationPath,
    pub identity: &'a str,
    pub token_fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct RejectedEvent<'a> {
    /// `None` when the request was rejected before a header was selected.
    pub path: Option<VerificationPath>,
    pub failure: &'a AuthFailure,
    pub token_fingerprint: Option<String>,
}

pub trait AuthEventSink: Send + Sync {
    fn authenticated(&self, event: &AuthenticatedEvent<'_>);
    fn rejected(&self, event: &RejectedEvent<'_>);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl AuthEventSink for TracingEventSink {
    fn authenticated(&self, event: &AuthenticatedEvent<'_>) {
        info!(
            path = event.path.as_str(),
            identity = %event.identity,
            token = %event.token_fingerprint,
            "request authenticated"
        );
    }

    fn rejected(&self, event: &RejectedEvent<'_>) {
        warn!(
            path = event.path.map(|p| p.as_str()),
            kind = event.failure.kind(),
            error = %event.failure,
            token = event.token_fingerprint.as_deref(),
            "request authentication failed"
        );
    }
}

/// Short, non-reversible handle for correlating a token across log lines.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded[..16].to_string()
}
