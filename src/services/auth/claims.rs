use serde::Deserialize;
use serde_json::{Map, Value};

use super::AuthFailure;

/// Issuer values the identity provider puts in its ID tokens.
///
/// Both forms show up in practice, with and without the scheme.
pub const ACCEPTED_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Claims of an ID token after one of the verification paths accepted it.
///
/// NOTE:
/// - `aud` is kept as a `Value` because JWT allows a string or an array.
/// - Only the claims a verification path reads are typed. Everything else
///   (`sub`, `exp`, `iat`, ...) stays in `extra` as raw JSON, so the lenient
///   path never rejects a token over a claim it does not check.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Value,
    #[serde(default)]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Exact audience match. An array `aud` matches when one entry equals `expected`.
    pub fn audience_matches(&self, expected: &str) -> bool {
        match &self.aud {
            Value::String(aud) => aud == expected,
            Value::Array(auds) => auds.iter().any(|aud| aud.as_str() == Some(expected)),
            _ => false,
        }
    }

    pub fn issuer_accepted(&self) -> bool {
        self.iss
            .as_deref()
            .is_some_and(|iss| ACCEPTED_ISSUERS.contains(&iss))
    }
}

/// The caller identity (the `email` claim), returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity(String);

impl VerifiedIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VerifiedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn extract_identity(claims: &Claims) -> Result<VerifiedIdentity, AuthFailure> {
    match claims.email.as_deref() {
        Some(email) if !email.is_empty() => Ok(VerifiedIdentity(email.to_string())),
        _ => Err(AuthFailure::MissingIdentityClaim),
    }
}
