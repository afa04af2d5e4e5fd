// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and is
//! immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Identity provider domain (issuer is `https://{domain}/`) | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `ALGORITHMS` | Comma-separated signing algorithm allow-list | `RS256` |
//! | `JWKS_URL` | Override for the JWKS endpoint | `https://{domain}/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECS` | JWKS cache time-to-live | `300` |
//! | `JWKS_TIMEOUT_SECS` | Timeout for one JWKS request | `10` |
//! | `JWKS_MIN_REFRESH_SECS` | Cooldown for refetches on unknown `kid` | `30` |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance | `60` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::jwks::{
    JwksManager, DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT, DEFAULT_MIN_REFRESH_INTERVAL,
};

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const ALGORITHMS_ENV: &str = "ALGORITHMS";
pub const JWKS_URL_ENV: &str = "JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const JWKS_MIN_REFRESH_ENV: &str = "JWKS_MIN_REFRESH_SECS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Clock skew tolerance (60 seconds).
pub const DEFAULT_LEEWAY: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}

/// Authentication settings shared by every guard in the process.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Identity provider domain, e.g. `tenant.eu.auth0.com`
    pub domain: String,
    /// Expected `aud`
    pub audience: String,
    /// Signing algorithms a token may use
    pub algorithms: Vec<Algorithm>,
    /// JWKS endpoint override
    pub jwks_url: Option<Url>,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub min_refresh_interval: Duration,
    /// Clock skew tolerance in seconds
    pub leeway: u64,
}

impl AuthSettings {
    /// Settings with defaults for everything but domain and audience.
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            jwks_url: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            leeway: DEFAULT_LEEWAY,
        }
    }

    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let mut settings = Self::new(required(AUTH0_DOMAIN_ENV)?, required(API_AUDIENCE_ENV)?);

        if let Some(value) = lookup(ALGORITHMS_ENV) {
            settings.algorithms = parse_algorithms(&value)?;
        }
        if let Some(value) = lookup(JWKS_URL_ENV) {
            let url = Url::parse(&value).map_err(|e| invalid(JWKS_URL_ENV, &value, e))?;
            settings.jwks_url = Some(url);
        }
        if let Some(value) = lookup(JWKS_CACHE_TTL_ENV) {
            settings.cache_ttl = Duration::from_secs(parse_number(JWKS_CACHE_TTL_ENV, &value)?);
        }
        if let Some(value) = lookup(JWKS_TIMEOUT_ENV) {
            settings.fetch_timeout = Duration::from_secs(parse_number(JWKS_TIMEOUT_ENV, &value)?);
        }
        if let Some(value) = lookup(JWKS_MIN_REFRESH_ENV) {
            settings.min_refresh_interval =
                Duration::from_secs(parse_number(JWKS_MIN_REFRESH_ENV, &value)?);
        }
        if let Some(value) = lookup(JWT_LEEWAY_ENV) {
            settings.leeway = parse_number(JWT_LEEWAY_ENV, &value)?;
        }

        // Surface a bad domain at startup rather than on the first request.
        settings.jwks_url()?;
        Ok(settings)
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// JWKS endpoint: the override if set, else the domain's well-known URL.
    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        match &self.jwks_url {
            Some(url) => Ok(url.clone()),
            None => JwksManager::url_for_domain(&self.domain)
                .map_err(|e| invalid(AUTH0_DOMAIN_ENV, &self.domain, e)),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Bind address and logging settings for the server binary.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup(PORT_ENV) {
            Some(value) => parse_number(PORT_ENV, &value)?,
            None => 8080,
        };
        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, other, "expected json or pretty")),
        };

        Ok(Self {
            host,
            port,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: ToString,
{
    value.trim().parse().map_err(|e: T::Err| invalid(var, value, e))
}

/// Parse `RS256`, `RS256,ES256` or `["RS256"]` into an allow-list.
///
/// HMAC algorithms are refused: a JWKS only publishes public keys.
fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();

    for name in value.split(',') {
        let name = name.trim_matches(|c: char| c.is_whitespace() || "[]'\"".contains(c));
        if name.is_empty() {
            continue;
        }

        let algorithm =
            Algorithm::from_str(name).map_err(|e| invalid(ALGORITHMS_ENV, value, e))?;
        if matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(invalid(
                ALGORITHMS_ENV,
                value,
                "symmetric algorithms cannot be verified against a JWKS",
            ));
        }
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }

    if algorithms.is_empty() {
        return Err(invalid(ALGORITHMS_ENV, value, "no algorithms listed"));
    }
    Ok(algorithms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_with_required_vars_only() {
        let settings = AuthSettings::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.example.com"),
            (API_AUDIENCE_ENV, "students-api"),
        ]))
        .unwrap();

        assert_eq!(settings.algorithms, vec![Algorithm::RS256]);
        assert_eq!(settings.issuer(), "https://tenant.example.com/");
        assert_eq!(
            settings.jwks_url().unwrap().as_str(),
            "https://tenant.example.com/.well-known/jwks.json"
        );
        assert_eq!(settings.cache_ttl, DEFAULT_CACHE_TTL);
        assert_eq!(settings.leeway, DEFAULT_LEEWAY);
    }

    #[test]
    fn missing_domain_is_reported() {
        let err = AuthSettings::from_lookup(lookup(&[(API_AUDIENCE_ENV, "students-api")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(AUTH0_DOMAIN_ENV)));
    }

    #[test]
    fn blank_audience_counts_as_missing() {
        let err = AuthSettings::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.example.com"),
            (API_AUDIENCE_ENV, "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(API_AUDIENCE_ENV)));
    }

    #[test]
    fn overrides_are_parsed() {
        let settings = AuthSettings::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.example.com"),
            (API_AUDIENCE_ENV, "students-api"),
            (ALGORITHMS_ENV, "RS256, ES256"),
            (JWKS_URL_ENV, "http://127.0.0.1:8081/keys"),
            (JWKS_CACHE_TTL_ENV, "0"),
            (JWKS_TIMEOUT_ENV, "3"),
            (JWT_LEEWAY_ENV, "0"),
        ]))
        .unwrap();

        assert_eq!(settings.algorithms, vec![Algorithm::RS256, Algorithm::ES256]);
        assert_eq!(settings.jwks_url().unwrap().as_str(), "http://127.0.0.1:8081/keys");
        assert_eq!(settings.cache_ttl, Duration::ZERO);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
        assert_eq!(settings.leeway, 0);
    }

    #[test]
    fn algorithm_list_accepts_python_style_literal() {
        assert_eq!(parse_algorithms("['RS256']").unwrap(), vec![Algorithm::RS256]);
    }

    #[test]
    fn hmac_and_unknown_algorithms_are_refused() {
        assert!(parse_algorithms("HS256").is_err());
        assert!(parse_algorithms("RS999").is_err());
        assert!(parse_algorithms(" , ").is_err());
    }

    #[test]
    fn non_numeric_ttl_is_invalid() {
        let err = AuthSettings::from_lookup(lookup(&[
            (AUTH0_DOMAIN_ENV, "tenant.example.com"),
            (API_AUDIENCE_ENV, "students-api"),
            (JWKS_CACHE_TTL_ENV, "five minutes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: JWKS_CACHE_TTL_ENV, .. }));
    }

    #[test]
    fn server_settings_defaults() {
        let settings = ServerSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
        assert_eq!(settings.log_format, LogFormat::Pretty);

        let json = ServerSettings::from_lookup(lookup(&[(LOG_FORMAT_ENV, "json"), (PORT_ENV, "9000")]))
            .unwrap();
        assert_eq!(json.log_format, LogFormat::Json);
        assert_eq!(json.port, 9000);

        assert!(ServerSettings::from_lookup(lookup(&[(LOG_FORMAT_ENV, "xml")])).is_err());
    }
}
