//! Credential header selection and `Bearer` parsing.
//!
//! The authenticating proxy only consults `X-Serverless-Authorization` for its
//! own pre-authentication, and it strips the signature of tokens sent that way.
//! When both headers are present the serverless one always governs.

use axum::http::{HeaderMap, HeaderName, header};

use super::AuthFailure;

pub const SERVERLESS_AUTHORIZATION: HeaderName =
    HeaderName::from_static("x-serverless-authorization");

/// The single credential chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHeader {
    pub value: String,
    pub signature_already_stripped: bool,
}

/// `<scheme> <token>` split out of a credential header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCredential {
    pub scheme: String,
    pub token: String,
}

/// Pick the governing credential header.
///
/// Empty (or whitespace-only) values count as absent.
pub fn select_credential(headers: &HeaderMap) -> Result<CredentialHeader, AuthFailure> {
    if let Some(value) = read_header(headers, &SERVERLESS_AUTHORIZATION)? {
        return Ok(CredentialHeader {
            value,
            signature_already_stripped: true,
        });
    }

    if let Some(value) = read_header(headers, &header::AUTHORIZATION)? {
        return Ok(CredentialHeader {
            value,
            signature_already_stripped: false,
        });
    }

    Err(AuthFailure::MissingHeader)
}

fn read_header(headers: &HeaderMap, name: &HeaderName) -> Result<Option<String>, AuthFailure> {
    let Some(raw) = headers.get(name) else {
        return Ok(None);
    };

    let value = raw
        .to_str()
        .map_err(|_| AuthFailure::malformed(format!("{name} is not visible ASCII")))?;

    if value.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(value.to_string()))
}

/// Split `value` on the first space into scheme and token.
pub fn parse_credential(value: &str) -> Result<ParsedCredential, AuthFailure> {
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthFailure::malformed("expected `<scheme> <token>`"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthFailure::UnsupportedScheme(scheme.to_string()));
    }

    if token.is_empty() {
        return Err(AuthFailure::malformed("empty bearer token"));
    }

    Ok(ParsedCredential {
        scheme: scheme.to_string(),
        token: token.to_string(),
    })
}
