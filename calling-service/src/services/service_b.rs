//! Outbound client for the receiving service.

use axum::http::{HeaderValue, StatusCode};
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

use crate::services::token::CredentialHeaderKind;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("service b answered {status}")]
    Status { status: StatusCode, body: String },

    #[error("service b unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("invalid service b url: {0}")]
    Url(#[from] url::ParseError),
}

/// A successful answer, relayed as-is.
#[derive(Debug)]
pub struct Relayed {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ServiceBClient {
    http: reqwest::Client,
    base_url: Url,
    path: String,
}

impl ServiceBClient {
    pub fn new(http: reqwest::Client, base_url: Url, path: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            path: path.into(),
        }
    }

    pub async fn call(&self, kind: CredentialHeaderKind, token: &str) -> Result<Relayed, CallError> {
        let url = self.base_url.join(&self.path)?;
        let request = kind.attach(self.http.get(url), token);

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CallError::Status { status, body });
        }

        Ok(Relayed {
            status,
            content_type,
            body,
        })
    }
}
