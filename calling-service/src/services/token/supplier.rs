//! ID token supply for outbound calls.
//!
//! On the platform, the metadata server mints ID tokens for the workload's
//! service account, scoped to whatever audience we ask for.

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use thiserror::Error;
use tracing::debug;
use url::Url;

const IDENTITY_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/identity";

#[derive(Debug, Error)]
pub enum TokenSupplyError {
    #[error("metadata server request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("metadata server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("metadata server returned an empty token")]
    EmptyToken,

    #[error("invalid metadata url: {0}")]
    Url(#[from] url::ParseError),
}

#[async_trait]
pub trait TokenSupplier: Send + Sync {
    /// Fetch a signed ID token whose `aud` is `audience`.
    async fn fetch_id_token(&self, audience: &str) -> Result<String, TokenSupplyError>;
}

#[derive(Debug, Clone)]
pub struct MetadataTokenSupplier {
    http: reqwest::Client,
    metadata_url: Url,
}

impl MetadataTokenSupplier {
    pub fn new(http: reqwest::Client, metadata_url: Url) -> Self {
        Self { http, metadata_url }
    }
}

#[async_trait]
impl TokenSupplier for MetadataTokenSupplier {
    async fn fetch_id_token(&self, audience: &str) -> Result<String, TokenSupplyError> {
        let mut url = self.metadata_url.join(IDENTITY_PATH)?;
        url.query_pairs_mut()
            .append_pair("audience", audience)
            .append_pair("format", "full");

        debug!(%audience, "requesting ID token from metadata server");

        let response = self
            .http
            .get(url)
            .header("Metadata-Flavor", HeaderValue::from_static("Google"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TokenSupplyError::Status(response.status()));
        }

        let token = response.text().await?.trim().to_string();
        if token.is_empty() {
            return Err(TokenSupplyError::EmptyToken);
        }

        Ok(token)
    }
}
