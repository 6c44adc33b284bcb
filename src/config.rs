//! License sentinel configuration.

use crate::SentinelError;
use std::env;
use std::time::Duration;

/// Default license authority base URL.
pub const DEFAULT_BASE_URL: &str = "https://license.dev.midaz.io";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Default TTL for cache entries written without an explicit TTL.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default period between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1800);

/// TTL applied to successful validations, independent of `cache_ttl`.
pub const VALIDATION_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Days-left thresholds that produce an expiry warning.
pub const DEFAULT_EXPIRY_WARNING_DAYS: [i64; 2] = [30, 7];

/// Failure text fragments that indicate the authority was unreachable.
pub const DEFAULT_CONNECTIVITY_KEYWORDS: &[&str] = &[
    "network",
    "connection",
    "timeout",
    "timed out",
    "econnrefused",
    "enotfound",
    "etimedout",
    "dns",
];

/// Failure text fragments that make a background refresh failure fatal.
pub const DEFAULT_FATAL_KEYWORDS: &[&str] =
    &["invalid license", "expired", "unauthorized", "forbidden"];

/// Runtime configuration for license validation.
///
/// Identity (application, key, organization) lives in
/// [`LicenseConfig`](crate::LicenseConfig); this struct only tunes how the
/// authority is reached and how results are cached and refreshed.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Authority base URL; requests go to `{base_url}/licenses/validate`.
    pub base_url: String,

    /// Upper bound for a single request attempt.
    pub timeout: Duration,

    /// Retries after the first attempt for retry-eligible failures.
    pub retry_count: u32,

    /// Base delay for exponential backoff between attempts.
    pub retry_delay: Duration,

    /// Default TTL of the cache store.
    pub cache_ttl: Duration,

    /// Period between background refreshes.
    pub refresh_interval: Duration,

    /// Days-left thresholds at or below which an expiry warning is logged.
    pub expiry_warning_days: Vec<i64>,

    /// Keywords used to recognise connectivity failures in opaque error text.
    pub connectivity_keywords: Vec<String>,

    /// Keywords that make a background refresh failure terminate the host.
    pub fatal_keywords: Vec<String>,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            cache_ttl: DEFAULT_CACHE_TTL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS.to_vec(),
            connectivity_keywords: to_owned_list(DEFAULT_CONNECTIVITY_KEYWORDS),
            fatal_keywords: to_owned_list(DEFAULT_FATAL_KEYWORDS),
        }
    }
}

impl SentinelConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `LICENSE_BASE_URL`
    /// - `LICENSE_TIMEOUT_MS`
    /// - `LICENSE_RETRY_COUNT`
    /// - `LICENSE_RETRY_DELAY_MS`
    /// - `LICENSE_CACHE_TTL_SECS`
    /// - `LICENSE_REFRESH_INTERVAL_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("LICENSE_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            timeout: env_parse("LICENSE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            retry_count: env_parse("LICENSE_RETRY_COUNT").unwrap_or(defaults.retry_count),
            retry_delay: env_parse("LICENSE_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            cache_ttl: env_parse("LICENSE_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            refresh_interval: env_parse("LICENSE_REFRESH_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_interval),
            ..defaults
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.base_url.trim().is_empty() {
            return Err(SentinelError::Configuration(
                "base_url cannot be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(SentinelError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(SentinelError::Configuration(
                "cache_ttl must be greater than zero".to_string(),
            ));
        }
        if self.refresh_interval.is_zero() {
            return Err(SentinelError::Configuration(
                "refresh_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The validation endpoint derived from `base_url`.
    pub fn validate_url(&self) -> String {
        format!("{}/licenses/validate", self.base_url.trim_end_matches('/'))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
