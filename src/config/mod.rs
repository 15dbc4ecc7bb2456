use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

const SECRET_VARS: [&str; 2] = ["STUDENT_JWT_SECRET", "JWT_SECRET"];
const DEV_FALLBACK_SECRET: &str = "jrc-student-secret-development-only";
const DEFAULT_TOKEN_VALIDITY_DAYS: u64 = 30;
const MAX_TOKEN_VALIDITY_DAYS: u64 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Anything other than an explicit development flag counts as production.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("development" | "dev") => Environment::Development,
            _ => Environment::Production,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no token secret configured; set STUDENT_JWT_SECRET or JWT_SECRET")]
    MissingSecret,
    #[error("token secret cannot be used as an HMAC key")]
    InvalidSecret,
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub token_secret: String,
    pub token_validity_days: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup("APP_ENV").as_deref());
        let token_secret = resolve_secret(environment, &lookup)?;

        let token_validity_days =
            parse_or("TOKEN_VALIDITY_DAYS", &lookup, DEFAULT_TOKEN_VALIDITY_DAYS)?;
        if !(1..=MAX_TOKEN_VALIDITY_DAYS).contains(&token_validity_days) {
            return Err(ConfigError::InvalidValue {
                name: "TOKEN_VALIDITY_DAYS",
                value: token_validity_days.to_string(),
            });
        }

        let api_base_uri = lookup("API_BASE_URI").unwrap_or_else(|| "/api".into());
        if !api_base_uri.starts_with('/') || api_base_uri == "/" {
            return Err(ConfigError::InvalidValue {
                name: "API_BASE_URI",
                value: api_base_uri,
            });
        }

        Ok(Config {
            environment,
            token_secret,
            token_validity_days,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", &lookup, 3000)?,
            api_base_uri,
        })
    }

    pub fn token_validity(&self) -> Duration {
        Duration::from_secs(self.token_validity_days.saturating_mul(24 * 60 * 60))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("token_secret", &"<redacted>")
            .field("token_validity_days", &self.token_validity_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("api_base_uri", &self.api_base_uri)
            .finish()
    }
}

fn resolve_secret<F>(environment: Environment, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let configured = SECRET_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));

    match (configured, environment) {
        (Some(secret), _) => Ok(secret),
        (None, Environment::Development) => {
            tracing::warn!(
                "no token secret configured, using the built-in development secret; \
                 tokens issued now are forgeable by anyone who has read the source"
            );
            Ok(DEV_FALLBACK_SECRET.to_string())
        }
        (None, Environment::Production) => Err(ConfigError::MissingSecret),
    }
}

fn parse_or<F, T>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.token_secret, "s3cret");
        assert_eq!(config.token_validity(), Duration::from_secs(30 * 86_400));
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.api_base_uri, "/api");
    }

    #[test]
    fn test_student_secret_takes_precedence() {
        let config = load(&[("STUDENT_JWT_SECRET", "student"), ("JWT_SECRET", "shared")]).unwrap();
        assert_eq!(config.token_secret, "student");

        let config = load(&[("STUDENT_JWT_SECRET", ""), ("JWT_SECRET", "shared")]).unwrap();
        assert_eq!(config.token_secret, "shared");
    }

    #[test]
    fn test_production_refuses_missing_secret() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingSecret)));
        assert!(matches!(
            load(&[("APP_ENV", "production"), ("JWT_SECRET", "  ")]),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn test_development_falls_back() {
        let config = load(&[("APP_ENV", "Development")]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.token_secret, DEV_FALLBACK_SECRET);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("TOKEN_VALIDITY_DAYS", "0")]),
            Err(ConfigError::InvalidValue { name: "TOKEN_VALIDITY_DAYS", .. })
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("SERVER_PORT", "http")]),
            Err(ConfigError::InvalidValue { name: "SERVER_PORT", .. })
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "s"), ("API_BASE_URI", "api")]),
            Err(ConfigError::InvalidValue { name: "API_BASE_URI", .. })
        ));
    }

    #[test]
    fn test_validity_days_upper_bound() {
        let config = load(&[("JWT_SECRET", "s"), ("TOKEN_VALIDITY_DAYS", "36500")]).unwrap();
        assert_eq!(config.token_validity(), Duration::from_secs(36_500 * 86_400));

        for days in ["36501", "1000000000000", "213503982334602", "18446744073709551615"] {
            assert!(
                matches!(
                    load(&[("JWT_SECRET", "s"), ("TOKEN_VALIDITY_DAYS", days)]),
                    Err(ConfigError::InvalidValue { name: "TOKEN_VALIDITY_DAYS", .. })
                ),
                "{days} accepted"
            );
        }
    }

    #[test]
    fn test_max_validity_can_issue() {
        use crate::token::{ManualClock, StudentClaims, TokenSigner};

        let config = load(&[("JWT_SECRET", "s"), ("TOKEN_VALIDITY_DAYS", "36500")]).unwrap();
        let signer =
            TokenSigner::with_clock(&config.token_secret, ManualClock::new(1_700_000_000_000))
                .unwrap();
        assert!(
            signer
                .issue(&StudentClaims::new("abc123"), config.token_validity())
                .is_ok()
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[("JWT_SECRET", "do-not-print")]).unwrap();
        assert!(!format!("{config:?}").contains("do-not-print"));
    }
}
