/*
 * Responsibility
 * - 環境変数の読み込み (PORT, DATABASE_URL, AUTH_* など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - issuer / jwks url は AUTH_DOMAIN から導出 (上書き可)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
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

/// Settings for the bearer credential verifier.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: Url,
    pub jwks_ttl: Duration,
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // None => in-memory drink store
    pub database_url: Option<String>,

    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 5050,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let domain = lookup("AUTH_DOMAIN")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("AUTH_DOMAIN"))?;

        let audience = lookup("AUTH_AUDIENCE")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let issuer = lookup("AUTH_ISSUER")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}/", domain));

        let jwks_url = lookup("AUTH_JWKS_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", domain));
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
        if !matches!(jwks_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("AUTH_JWKS_URL"));
        }

        let jwks_ttl_seconds = match lookup("AUTH_JWKS_TTL_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("AUTH_JWKS_TTL_SECONDS"))?,
            None => 3600,
        };

        let leeway_seconds = match lookup("AUTH_LEEWAY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("AUTH_LEEWAY_SECONDS"))?,
            None => 0,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            auth: AuthConfig {
                issuer,
                audience,
                jwks_url,
                jwks_ttl: Duration::from_secs(jwks_ttl_seconds),
                leeway_seconds,
            },
        })
    }
}
