//! License validator: cache-aside lookups with graceful degradation.
//!
//! `validate()` resolves every failure except an unexpected one into a
//! [`ValidationResult`]:
//! - cache hit: returned as is, no network call
//! - live success: returned, and cached when `valid`
//! - server or connectivity failure: last cached result, else fail open
//! - client failure (4xx): fail closed
//! - unexpected failure: propagated unchanged

use crate::cache::store::TtlCache;
use crate::cache::CacheStore;
use crate::clock::{Clock, SystemClock};
use crate::config::{SentinelConfig, VALIDATION_CACHE_TTL};
use crate::identity::LicenseConfig;
use crate::policy::classify::{ErrorClassifier, FailureClass};
use crate::policy::fallback::{hard_invalid_result, optimistic_result};
use crate::policy::status::log_license_status;
use crate::protocol::models::ValidationResult;
use crate::transport::http::HttpTransport;
use crate::transport::retry::RetryingClient;
use crate::transport::LicenseTransport;
use crate::SentinelError;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Store type owned by a validator.
pub type ResultCache = Box<dyn CacheStore<Value>>;

/// Validates one license identity against the authority.
///
/// Create one per identity and share it behind an `Arc`. Concurrent
/// `validate()` calls are serialized, so the background refresh and ad-hoc
/// callers never run a validation cycle at the same time.
pub struct LicenseValidator {
    license: LicenseConfig,
    options: SentinelConfig,
    client: RetryingClient,
    classifier: ErrorClassifier,
    cache: Mutex<ResultCache>,
    cache_key: String,
    in_flight: tokio::sync::Mutex<()>,
}

impl LicenseValidator {
    /// Create a validator talking to the configured authority over HTTP.
    ///
    /// # Errors
    /// `Configuration` if the options are invalid or the HTTP client cannot
    /// be built.
    pub fn new(license: LicenseConfig, options: SentinelConfig) -> Result<Self, SentinelError> {
        options.validate()?;
        let transport = HttpTransport::new(&options)?;
        Self::with_transport(license, options, Box::new(transport))
    }

    /// Create a validator over a custom transport.
    pub fn with_transport(
        license: LicenseConfig,
        options: SentinelConfig,
        transport: Box<dyn LicenseTransport>,
    ) -> Result<Self, SentinelError> {
        options.validate()?;
        Ok(Self::assemble(license, options, transport, Arc::new(SystemClock)))
    }

    /// Create a validator with a custom clock driving cache expiry (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        license: LicenseConfig,
        options: SentinelConfig,
        transport: Box<dyn LicenseTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SentinelError> {
        options.validate()?;
        Ok(Self::assemble(license, options, transport, clock))
    }

    fn assemble(
        license: LicenseConfig,
        options: SentinelConfig,
        transport: Box<dyn LicenseTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let classifier = ErrorClassifier::from_config(&options);
        let client = RetryingClient::new(transport, classifier.clone(), &options);
        let cache: ResultCache = Box::new(TtlCache::new(options.cache_ttl, clock));
        let cache_key = license.cache_key();

        info!(
            "License validation client initialized for application: {}",
            license.application_name()
        );

        Self {
            license,
            options,
            client,
            classifier,
            cache: Mutex::new(cache),
            cache_key,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Replace the cache store.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Mutex::new(cache);
        self
    }

    /// Validate the license.
    ///
    /// # Errors
    /// Only failures the classifier cannot place in the server, client or
    /// connectivity buckets. Everything else resolves to a result.
    pub async fn validate(&self) -> Result<ValidationResult, SentinelError> {
        let _cycle = self.in_flight.lock().await;
        let app = self.license.application_name();

        if let Some(cached) = self.cached_result() {
            debug!("Using cached license validation result for: {}", app);
            self.log_status(&cached);
            return Ok(cached);
        }

        match self.client.validate_license(&self.license).await {
            Ok(result) => {
                if result.valid {
                    self.cache_result(&result);
                }
                self.log_status(&result);
                Ok(result)
            }
            Err(failure) => self.handle_failure(failure),
        }
    }

    fn handle_failure(&self, failure: SentinelError) -> Result<ValidationResult, SentinelError> {
        let result = match self.classifier.classify(&failure) {
            FailureClass::Server => {
                warn!(
                    "Server error during validation ({}): {}",
                    failure.status().unwrap_or(500),
                    failure
                );
                self.last_known_good_or_optimistic("server error")
            }
            FailureClass::Connectivity => {
                warn!("Connection error during validation: {}", failure);
                self.last_known_good_or_optimistic("connection error")
            }
            FailureClass::Client => {
                error!(
                    "Client error during validation ({}): {}",
                    failure.status().unwrap_or(400),
                    failure
                );
                hard_invalid_result()
            }
            FailureClass::Unexpected => {
                error!("Unexpected validation error: {}", failure);
                return Err(failure);
            }
        };

        self.log_status(&result);
        Ok(result)
    }

    fn last_known_good_or_optimistic(&self, cause: &str) -> ValidationResult {
        if let Some(cached) = self.cached_result() {
            info!("Using cached result due to {}", cause);
            return cached;
        }
        warn!("No cached result available, using fallback validation");
        optimistic_result()
    }

    fn cached_result(&self) -> Option<ValidationResult> {
        let lookup = self
            .cache
            .lock()
            .map_err(|_| SentinelError::Cache("cache lock poisoned".to_string()))
            .and_then(|mut cache| cache.get(&self.cache_key));

        match lookup {
            Ok(Some(value)) => {
                let result = ValidationResult::from_cached(&value);
                if result.is_none() {
                    warn!(
                        "Ignoring malformed cache entry for: {}",
                        self.license.application_name()
                    );
                }
                result
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache retrieval failed: {}", e);
                None
            }
        }
    }

    fn cache_result(&self, result: &ValidationResult) {
        let write = serde_json::to_value(result)
            .map_err(|e| SentinelError::Cache(format!("Failed to serialize result: {}", e)))
            .and_then(|value| {
                self.cache
                    .lock()
                    .map_err(|_| SentinelError::Cache("cache lock poisoned".to_string()))?
                    .set(&self.cache_key, value, Some(VALIDATION_CACHE_TTL))
            });

        match write {
            Ok(()) => debug!(
                "Cached license validation result for: {}",
                self.license.application_name()
            ),
            Err(e) => warn!("Failed to cache license result: {}", e),
        }
    }

    fn log_status(&self, result: &ValidationResult) {
        log_license_status(
            result,
            self.license.application_name(),
            &self.options.expiry_warning_days,
        );
    }

    /// Drop this identity's cached result.
    pub fn clear_cache(&self) {
        let cleared = self
            .cache
            .lock()
            .map_err(|_| SentinelError::Cache("cache lock poisoned".to_string()))
            .and_then(|mut cache| cache.delete(&self.cache_key));

        match cleared {
            Ok(()) => debug!(
                "Cleared cache for application: {}",
                self.license.application_name()
            ),
            Err(e) => warn!("Failed to clear cache: {}", e),
        }
    }

    /// Drop every cached entry.
    pub fn close(&self) {
        let closed = self
            .cache
            .lock()
            .map_err(|_| SentinelError::Cache("cache lock poisoned".to_string()))
            .and_then(|mut cache| cache.close());

        if let Err(e) = closed {
            warn!("Failed to close cache: {}", e);
        }
    }

    /// The identity being validated.
    pub fn config(&self) -> &LicenseConfig {
        &self.license
    }

    /// The runtime options.
    pub fn options(&self) -> &SentinelConfig {
        &self.options
    }

    /// Key under which valid results are cached.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }
}
