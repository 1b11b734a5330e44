/*
 * Responsibility
 * - 環境変数や設定の読み込み (EXPECTED_AUDIENCE, 署名鍵の取得先, タイムアウトなど)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::keys::GOOGLE_CERTS_URL;

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

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub app_name: String,

    // Audience this service accepts tokens for (usually its own URL).
    pub expected_audience: String,

    pub google_certs_url: String,
    pub token_leeway_seconds: u64,
    pub key_fetch_timeout: Duration,
    pub key_cache_ttl: Duration,
    // Unknown `kid`s inside this window are rejected without refetching.
    pub key_min_refresh_interval: Duration,

    // Echo failure details in 401 bodies and log at debug level.
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));
        let app_name = lookup("APP_NAME").unwrap_or_else(|| "receiving-service".to_string());

        let expected_audience = lookup("EXPECTED_AUDIENCE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("EXPECTED_AUDIENCE"))?;

        let google_certs_url =
            lookup("GOOGLE_CERTS_URL").unwrap_or_else(|| GOOGLE_CERTS_URL.to_string());
        url::Url::parse(&google_certs_url).map_err(|_| ConfigError::Invalid("GOOGLE_CERTS_URL"))?;

        let token_leeway_seconds = parse_u64(&lookup, "TOKEN_LEEWAY_SECONDS", 60)?;
        let key_fetch_timeout =
            Duration::from_secs(parse_u64(&lookup, "KEY_FETCH_TIMEOUT_SECONDS", 10)?);
        let key_cache_ttl = Duration::from_secs(parse_u64(&lookup, "KEY_CACHE_TTL_SECONDS", 3600)?);
        let key_min_refresh_interval = Duration::from_secs(parse_u64(
            &lookup,
            "KEY_MIN_REFRESH_INTERVAL_SECONDS",
            60,
        )?);

        let debug = match lookup("DEBUG") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("DEBUG"))?,
            None => false,
        };

        Ok(Self {
            addr,
            app_env,
            app_name,
            expected_audience,
            google_certs_url,
            token_leeway_seconds,
            key_fetch_timeout,
            key_cache_ttl,
            key_min_refresh_interval,
            debug,
        })
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
