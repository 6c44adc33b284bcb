//! Retrying validation client with bounded exponential backoff.

use crate::config::SentinelConfig;
use crate::identity::LicenseConfig;
use crate::policy::classify::ErrorClassifier;
use crate::protocol::models::{parse_validation_response, ValidationResult};
use crate::transport::LicenseTransport;
use crate::SentinelError;
use std::time::Duration;
use tracing::warn;

/// Upper bound for a single backoff sleep.
pub const MAX_BACKOFF: Duration = Duration::from_millis(30_000);

/// Delay before retry number `attempt + 1`: `min(base * 2^attempt, MAX_BACKOFF)`.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Issues one logical validation, retrying retry-eligible failures.
///
/// Each attempt is bounded by `timeout`; an elapsed attempt is reported as a
/// connectivity failure. Successful bodies go through the strict decoder, so a
/// malformed payload is retried like an outage.
pub struct RetryingClient {
    transport: Box<dyn LicenseTransport>,
    classifier: ErrorClassifier,
    retry_count: u32,
    retry_delay: Duration,
    timeout: Duration,
}

impl RetryingClient {
    /// Create a retrying client over `transport`.
    pub fn new(
        transport: Box<dyn LicenseTransport>,
        classifier: ErrorClassifier,
        config: &SentinelConfig,
    ) -> Self {
        Self {
            transport,
            classifier,
            retry_count: config.retry_count,
            retry_delay: config.retry_delay,
            timeout: config.timeout,
        }
    }

    /// Validate `license`, returning the decoded result or the last failure.
    ///
    /// Makes at most `retry_count + 1` attempts. Non-retryable failures are
    /// returned immediately.
    pub async fn validate_license(
        &self,
        license: &LicenseConfig,
    ) -> Result<ValidationResult, SentinelError> {
        let mut attempt = 0;
        loop {
            let error = match self.attempt(license).await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            if attempt >= self.retry_count || !self.classifier.is_retryable(&error) {
                return Err(error);
            }

            let delay = backoff_delay(attempt, self.retry_delay);
            warn!(
                "Attempt {} failed, retrying in {}ms: {}",
                attempt + 1,
                delay.as_millis(),
                error
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, license: &LicenseConfig) -> Result<ValidationResult, SentinelError> {
        let body = tokio::time::timeout(self.timeout, self.transport.send_validation(license))
            .await
            .map_err(|_| {
                SentinelError::Connectivity(format!(
                    "Request timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })??;
        parse_validation_response(&body)
    }
}
