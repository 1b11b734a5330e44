use reqwest::RequestBuilder;

pub const AUTHORIZATION: &str = "authorization";
pub const SERVERLESS_AUTHORIZATION: &str = "X-Serverless-Authorization";

/// Header that carries the ID token on an outbound call.
///
/// - `Authorization`: the receiving service can verify the signature itself.
/// - `ServerlessAuthorization`: the platform proxy verifies it and strips the
///   signature before forwarding; the receiver only sees the claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialHeaderKind {
    #[default]
    Authorization,
    ServerlessAuthorization,
}

impl CredentialHeaderKind {
    pub fn from_flag(use_x_serverless_authorization: bool) -> Self {
        if use_x_serverless_authorization {
            Self::ServerlessAuthorization
        } else {
            Self::Authorization
        }
    }

    pub fn header_name(&self) -> &'static str {
        match self {
            Self::Authorization => AUTHORIZATION,
            Self::ServerlessAuthorization => SERVERLESS_AUTHORIZATION,
        }
    }

    pub fn attach(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(self.header_name(), format!("Bearer {token}"))
    }
}
