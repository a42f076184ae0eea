//! Configuration module for the registration portal.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::errors::AppError;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Base URL of the remote backend; `None` selects the in-memory backend
    pub backend_url: Option<String>,
    pub backend_timeout: Duration,
    /// Idle lifetime of a screen session
    pub session_ttl: Duration,
    /// Principals granted the admin role by the in-memory backend
    pub dev_admins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_psk = lookup("PESRON_API_PSK").filter(|psk| !psk.is_empty());

        let bind_addr = lookup("PESRON_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| AppError::Config("Invalid PESRON_BIND_ADDR format".to_string()))?;

        let log_level = lookup("PESRON_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("PESRON_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "Invalid PESRON_LOG_FORMAT '{}', expected 'pretty' or 'json'",
                    other
                )))
            }
        };

        let backend_url = lookup("PESRON_BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let backend_timeout = Duration::from_secs(parse_secs(
            &lookup,
            "PESRON_BACKEND_TIMEOUT_SECS",
            30,
        )?);

        let session_ttl =
            Duration::from_secs(parse_secs(&lookup, "PESRON_SESSION_TTL_SECS", 3600)?);

        let dev_admins = lookup("PESRON_DEV_ADMINS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            api_psk,
            bind_addr,
            log_level,
            log_format,
            backend_url,
            backend_timeout,
            session_ttl,
            dev_admins,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(AppError::Config(format!(
                "Invalid {} '{}', expected a positive number of seconds",
                key, raw
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_with(&[]).unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.backend_url.is_none());
        assert_eq!(config.backend_timeout, Duration::from_secs(30));
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert!(config.dev_admins.is_empty());
    }

    #[test]
    fn test_explicit_values() {
        let config = config_with(&[
            ("PESRON_API_PSK", "secret"),
            ("PESRON_BACKEND_URL", "http://backend.local/"),
            ("PESRON_LOG_FORMAT", "json"),
            ("PESRON_SESSION_TTL_SECS", "60"),
            ("PESRON_DEV_ADMINS", "alice, bob,,"),
        ])
        .unwrap();

        assert_eq!(config.api_psk.as_deref(), Some("secret"));
        assert_eq!(config.backend_url.as_deref(), Some("http://backend.local"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.dev_admins, vec!["alice", "bob"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_with(&[("PESRON_BIND_ADDR", "not-an-addr")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_with(&[("PESRON_BACKEND_TIMEOUT_SECS", "0")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_with(&[("PESRON_LOG_FORMAT", "xml")]),
            Err(AppError::Config(_))
        ));
    }
}
