use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt};

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub app_name: String,
    // Receiving service base URL; also the audience of the tokens we fetch.
    pub service_b_url: Url,
    pub service_b_path: String,
    // Metadata server that hands out ID tokens for this workload.
    pub metadata_url: Url,
    pub request_timeout: Duration,
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));
        let app_name = lookup("APP_NAME").unwrap_or_else(|| "calling-service".to_string());

        let service_b_url = lookup("SERVICE_B_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("SERVICE_B_URL"))?;
        let service_b_url =
            Url::parse(service_b_url.trim()).map_err(|_| ConfigError::Invalid("SERVICE_B_URL"))?;

        let service_b_path =
            lookup("SERVICE_B_PATH").unwrap_or_else(|| "/api/v1/credentials".to_string());

        let metadata_url = lookup("METADATA_URL")
            .unwrap_or_else(|| "http://metadata.google.internal".to_string());
        let metadata_url =
            Url::parse(&metadata_url).map_err(|_| ConfigError::Invalid("METADATA_URL"))?;

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            ),
            None => Duration::from_secs(10),
        };

        let debug = lookup("DEBUG")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            addr,
            app_env,
            app_name,
            service_b_url,
            service_b_path,
            metadata_url,
            request_timeout,
            debug,
        })
    }

    /// Audience for the ID tokens this service attaches.
    ///
    /// `Url` normalizes a bare origin to end in `/`; the proxy compares the
    /// audience literally, so strip it again.
    pub fn audience(&self) -> String {
        self.service_b_url.as_str().trim_end_matches('/').to_string()
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        tracing::error!(error = %e, "invalid configuration");
        AppError::Internal
    }
}
