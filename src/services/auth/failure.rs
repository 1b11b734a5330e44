use axum::http::StatusCode;
use thiserror::Error;

/// Why an inbound request could not be authenticated.
///
/// All variants are client-input faults. The rendered message is meant for
/// logs; the HTTP boundary maps every variant to the same 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("malformed authorization header: {0}")]
    MalformedHeader(String),

    #[error("unsupported authentication type: {0}")]
    UnsupportedScheme(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("missing or empty `email` claim on token")]
    MissingIdentityClaim,
}

impl AuthFailure {
    pub fn invalid_token(detail: impl Into<String>) -> Self {
        Self::InvalidToken(detail.into())
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedHeader(detail.into())
    }

    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader(_) => "malformed_header",
            Self::UnsupportedScheme(_) => "unsupported_scheme",
            Self::InvalidToken(_) => "invalid_token",
            Self::MissingIdentityClaim => "missing_identity_claim",
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}
