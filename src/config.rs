use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use url::Url;

#[cfg(test)]
mod tests;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 5; // requests per window
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60; // window size in seconds
pub const DEFAULT_CACHE_DURATION_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_CACHE_CHECK_PERIOD_SECS: u64 = 600;
pub const DEFAULT_UPSTREAM_BASE: &str = "http://api.weatherstack.com/current";
pub const DEFAULT_QUERY: &str = "New Delhi";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for environment variable {name}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub rate_limit_requests: u32,
    pub rate_limit_legacy_headers: bool,
    pub cache_duration_secs: u64,
    pub cache_check_period_secs: u64,
    pub upstream_base: String,
    pub weather_api_key: String,
    pub auth_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rate_limit_requests = parse_or(&lookup, "RATE_LIMIT", DEFAULT_RATE_LIMIT_REQUESTS)?;
        if rate_limit_requests == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            rate_limit_requests,
            rate_limit_legacy_headers: parse_or(&lookup, "RATE_LIMIT_LEGACY_HEADERS", false)?,
            cache_duration_secs: parse_or(&lookup, "CACHE_DURATION", DEFAULT_CACHE_DURATION_SECS)?,
            cache_check_period_secs: parse_or(
                &lookup,
                "CACHE_CHECK_PERIOD",
                DEFAULT_CACHE_CHECK_PERIOD_SECS,
            )?,
            upstream_base: upstream_base(&lookup)?,
            weather_api_key: required(&lookup, "WEATHERSTACK_API_KEY")?,
            auth_token: required(&lookup, "AUTH_TOKEN")?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The exact `Authorization` header value a client must send.
    pub fn expected_authorization(&self) -> String {
        format!("subscription_key {}", self.auth_token)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(RATE_LIMIT_WINDOW_SECS)
    }

    /// `None` when the background sweep is disabled.
    pub fn cache_check_period(&self) -> Option<Duration> {
        match self.cache_check_period_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// The provider endpoint must be an absolute `http` URL with a host; the
/// upstream client speaks plain HTTP only.
fn upstream_base<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let name = "WEATHERSTACK_BASE_URL";
    let value = match lookup(name).filter(|v| !v.is_empty()) {
        None => return Ok(DEFAULT_UPSTREAM_BASE.to_string()),
        Some(value) => value,
    };

    match Url::parse(&value) {
        Ok(url) if url.scheme() == "http" && url.host().is_some() => Ok(value),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
