// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Defaults reproduce the portfolio's contact policy: one submission per
//! address and per email every 30 minutes, with at most 500 remembered keys.
//! Everything can be overridden from the environment (see [`Config::from_env`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Paths served by the public router regardless of configuration.
const RESERVED_PATHS: &[&str] = &["/health", "/healthz", "/api/contact"];

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Public listener address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Admin listener address; the admin server is not started when unset
    #[serde(default)]
    pub admin_bind_addr: Option<String>,

    /// Origins allowed to POST the form cross-origin (empty: same-origin only)
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Cooldown policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Cooldown window and entry TTL in milliseconds (default: 1800000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum number of remembered keys (default: 500)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Interval between expiry sweeps in seconds (default: 60)
    #[serde(default = "default_sweep_secs")]
    pub sweep_interval_secs: u64,
}

/// Field bounds for the contact form, in UTF-16 code units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_name_min")]
    pub name_min_chars: usize,
    #[serde(default = "default_name_max")]
    pub name_max_chars: usize,
    #[serde(default = "default_email_min")]
    pub email_min_chars: usize,
    #[serde(default = "default_email_max")]
    pub email_max_chars: usize,
    #[serde(default = "default_message_min")]
    pub message_min_chars: usize,
    #[serde(default = "default_message_max")]
    pub message_max_chars: usize,
}

/// Mail provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Provider API key (required)
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Provider base URL (default: https://api.resend.com)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Address that receives the owner notification (required)
    #[serde(default)]
    pub owner_email: String,

    #[serde(default = "default_notification_from")]
    pub notification_from: String,

    #[serde(default = "default_autoresponse_from")]
    pub autoresponse_from: String,

    /// Outbound request timeout in seconds (default: 10)
    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

/// Identity shown in the rendered emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_owner_name")]
    pub owner_name: String,
    #[serde(default = "default_owner_title")]
    pub owner_title: String,
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_contact_address")]
    pub contact_address: String,
    #[serde(default = "default_linkedin_url")]
    pub linkedin_url: String,
    #[serde(default = "default_github_url")]
    pub github_url: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_window_ms() -> u64 {
    30 * 60 * 1000
}

fn default_capacity() -> usize {
    500
}

fn default_sweep_secs() -> u64 {
    60
}

fn default_name_min() -> usize {
    2
}

fn default_name_max() -> usize {
    100
}

fn default_email_min() -> usize {
    5
}

fn default_email_max() -> usize {
    255
}

fn default_message_min() -> usize {
    10
}

fn default_message_max() -> usize {
    1000
}

fn default_api_base() -> String {
    "https://api.resend.com".to_string()
}

fn default_notification_from() -> String {
    "Diego Pardo Portfolio <hello@quickstack.agency>".to_string()
}

fn default_autoresponse_from() -> String {
    "Diego Pardo <diego.pardo@quickstack.agency>".to_string()
}

fn default_mail_timeout_secs() -> u64 {
    10
}

fn default_owner_name() -> String {
    "Diego Pardo".to_string()
}

fn default_owner_title() -> String {
    "Fullstack Developer | Founder at Quick Stack".to_string()
}

fn default_site_url() -> String {
    "https://diegopardo.dev".to_string()
}

fn default_contact_address() -> String {
    "diego.pardo@quickstack.agency".to_string()
}

fn default_linkedin_url() -> String {
    "https://www.linkedin.com/in/dev-pardx/".to_string()
}

fn default_github_url() -> String {
    "https://github.com/DevPardx".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            admin_bind_addr: None,
            cors_allowed_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            mail: MailConfig::default(),
            site: SiteConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            capacity: default_capacity(),
            sweep_interval_secs: default_sweep_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_min_chars: default_name_min(),
            name_max_chars: default_name_max(),
            email_min_chars: default_email_min(),
            email_max_chars: default_email_max(),
            message_min_chars: default_message_min(),
            message_max_chars: default_message_max(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            owner_email: String::new(),
            notification_from: default_notification_from(),
            autoresponse_from: default_autoresponse_from(),
            timeout_secs: default_mail_timeout_secs(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            owner_name: default_owner_name(),
            owner_title: default_owner_title(),
            site_url: default_site_url(),
            contact_address: default_contact_address(),
            linkedin_url: default_linkedin_url(),
            github_url: default_github_url(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("owner_email", &self.owner_email)
            .field("notification_from", &self.notification_from)
            .field("autoresponse_from", &self.autoresponse_from)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RateLimitConfig {
    /// Get the cooldown window
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the expiry sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `RESEND_API_KEY` and `CONTACT_EMAIL` are required; every other
    /// variable falls back to its default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let config = Config {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            admin_bind_addr: var("ADMIN_BIND_ADDR"),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit: RateLimitConfig {
                window_ms: parse_or(&var, "RATE_LIMIT_WINDOW_MS", default_window_ms())?,
                capacity: parse_or(&var, "RATE_LIMIT_CAPACITY", default_capacity())?,
                sweep_interval_secs: parse_or(&var, "RATE_LIMIT_SWEEP_SECS", default_sweep_secs())?,
            },
            validation: ValidationConfig::default(),
            mail: MailConfig {
                api_key: var("RESEND_API_KEY").ok_or(ConfigError::Missing("RESEND_API_KEY"))?,
                api_base: var("RESEND_API_URL").unwrap_or_else(default_api_base),
                owner_email: var("CONTACT_EMAIL").ok_or(ConfigError::Missing("CONTACT_EMAIL"))?,
                notification_from: var("MAIL_NOTIFICATION_FROM")
                    .unwrap_or_else(default_notification_from),
                autoresponse_from: var("MAIL_AUTORESPONSE_FROM")
                    .unwrap_or_else(default_autoresponse_from),
                timeout_secs: parse_or(&var, "MAIL_TIMEOUT_SECS", default_mail_timeout_secs())?,
            },
            site: SiteConfig {
                owner_name: var("SITE_OWNER_NAME").unwrap_or(defaults.site.owner_name),
                owner_title: var("SITE_OWNER_TITLE").unwrap_or(defaults.site.owner_title),
                site_url: var("SITE_URL").unwrap_or(defaults.site.site_url),
                contact_address: var("SITE_CONTACT_ADDRESS")
                    .unwrap_or(defaults.site.contact_address),
                linkedin_url: var("SITE_LINKEDIN_URL").unwrap_or(defaults.site.linkedin_url),
                github_url: var("SITE_GITHUB_URL").unwrap_or(defaults.site.github_url),
            },
            metrics: MetricsConfig {
                enabled: parse_or(&var, "METRICS_ENABLED", default_true())?,
                path: var("METRICS_PATH").unwrap_or_else(default_metrics_path),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the service relies on at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_addr("BIND_ADDR", &self.bind_addr)?;
        if let Some(admin) = &self.admin_bind_addr {
            parse_addr("ADMIN_BIND_ADDR", admin)?;
        }

        if self.rate_limit.window_ms == 0 {
            return Err(invalid("RATE_LIMIT_WINDOW_MS", "0", "window must be positive"));
        }
        if self.rate_limit.capacity == 0 {
            return Err(invalid("RATE_LIMIT_CAPACITY", "0", "capacity must be positive"));
        }
        if self.rate_limit.sweep_interval_secs == 0 {
            return Err(invalid("RATE_LIMIT_SWEEP_SECS", "0", "interval must be positive"));
        }

        if self.mail.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("RESEND_API_KEY"));
        }
        if self.mail.owner_email.trim().is_empty() {
            return Err(ConfigError::Missing("CONTACT_EMAIL"));
        }
        match Url::parse(&self.mail.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {}
            _ => {
                return Err(invalid(
                    "RESEND_API_URL",
                    &self.mail.api_base,
                    "expected an http(s) URL",
                ))
            }
        }

        if !self.metrics.path.starts_with('/') {
            return Err(invalid("METRICS_PATH", &self.metrics.path, "must start with '/'"));
        }
        if RESERVED_PATHS.contains(&self.metrics.path.as_str()) {
            return Err(invalid("METRICS_PATH", &self.metrics.path, "path is already routed"));
        }

        Ok(())
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn parse_addr(name: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e: std::net::AddrParseError| invalid(name, value, &e.to_string()))
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("RESEND_API_KEY", "re_test_123"),
            ("CONTACT_EMAIL", "owner@example.com"),
        ]
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.window_ms, 1_800_000);
        assert_eq!(config.rate_limit.capacity, 500);
        assert_eq!(config.rate_limit.window_duration(), Duration::from_secs(30 * 60));
        assert_eq!(config.mail.api_base, "https://api.resend.com");
        assert_eq!(config.mail.owner_email, "owner@example.com");
        assert!(config.admin_bind_addr.is_none());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::from_lookup(lookup_from(&[("CONTACT_EMAIL", "owner@example.com")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("RESEND_API_KEY"));
    }

    #[test]
    fn test_blank_owner_email_is_missing() {
        let result = Config::from_lookup(lookup_from(&[
            ("RESEND_API_KEY", "re_test_123"),
            ("CONTACT_EMAIL", "   "),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("CONTACT_EMAIL"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = required();
        pairs.extend([
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("ADMIN_BIND_ADDR", "127.0.0.1:9090"),
            ("RATE_LIMIT_WINDOW_MS", "60000"),
            ("RATE_LIMIT_CAPACITY", "10"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example ,"),
            ("METRICS_ENABLED", "false"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.admin_bind_addr.as_deref(), Some("127.0.0.1:9090"));
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.rate_limit.capacity, 10);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut pairs = required();
        pairs.push(("RATE_LIMIT_CAPACITY", "0"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "RATE_LIMIT_CAPACITY", .. }
        ));
    }

    #[test]
    fn test_rejects_unparsable_number() {
        let mut pairs = required();
        pairs.push(("RATE_LIMIT_WINDOW_MS", "half an hour"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "RATE_LIMIT_WINDOW_MS", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_provider_url() {
        let mut pairs = required();
        pairs.push(("RESEND_API_URL", "ftp://mail.example.com"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "RESEND_API_URL", .. }));
    }

    #[test]
    fn test_rejects_bad_bind_addr() {
        let mut pairs = required();
        pairs.push(("BIND_ADDR", "localhost"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "BIND_ADDR", .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::from_lookup(lookup_from(&required())).unwrap();
        let rendered = format!("{:?}", config.mail);
        assert!(!rendered.contains("re_test_123"));
        assert!(rendered.contains("<redacted>"));
    }
}
