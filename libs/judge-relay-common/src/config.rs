// Application configuration
// Every setting comes from the environment and falls back to a default

use std::time::Duration;
use tracing::warn;

pub const DEFAULT_JUDGE0_URL: &str = "http://localhost:2358";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 20;
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the Judge0 execution backend
    pub judge0_url: String,
    /// Sent as `X-Auth-Token` when the backend requires authentication
    pub judge0_auth_token: Option<String>,
    /// Upper bound for every backend round-trip
    pub request_timeout: Duration,
    pub port: u16,
    pub max_batch_size: usize,
    /// Requests allowed per client IP in each window; 0 disables limiting
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            judge0_url: DEFAULT_JUDGE0_URL.to_string(),
            judge0_auth_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let judge0_url = lookup("JUDGE0_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.judge0_url);

        let judge0_auth_token = lookup("JUDGE0_AUTH_TOKEN").filter(|t| !t.trim().is_empty());

        let timeout_secs = parse_or(&lookup, "JUDGE0_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let window_secs = parse_or(
            &lookup,
            "RATE_LIMIT_WINDOW_SECS",
            DEFAULT_RATE_LIMIT_WINDOW_SECS,
        );

        Self {
            judge0_url,
            judge0_auth_token,
            request_timeout: Duration::from_secs(timeout_secs),
            port: parse_or(&lookup, "PORT", defaults.port),
            max_batch_size: parse_or(&lookup, "MAX_BATCH_SIZE", defaults.max_batch_size),
            rate_limit_max: parse_or(&lookup, "RATE_LIMIT_MAX", defaults.rate_limit_max),
            rate_limit_window: Duration::from_secs(window_secs),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "Invalid value, using default");
                default
            }
        },
        None => default,
    }
}
