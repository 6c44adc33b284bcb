//! Reqwest-based HTTP transport for the license authority.

use crate::config::SentinelConfig;
use crate::identity::LicenseConfig;
use crate::protocol::models::ValidateRequest;
use crate::transport::LicenseTransport;
use crate::SentinelError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

/// Header carrying the organization identifier.
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP transport posting to `{base_url}/licenses/validate`.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport from config.
    ///
    /// The reqwest client carries the configured timeout as a backstop; the
    /// retrying client enforces the same bound around every attempt.
    pub fn new(config: &SentinelConfig) -> Result<Self, SentinelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(build_user_agent())
            .build()
            .map_err(|e| {
                SentinelError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: config.validate_url(),
        })
    }

    /// The endpoint this transport posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LicenseTransport for HttpTransport {
    async fn send_validation(&self, license: &LicenseConfig) -> Result<Vec<u8>, SentinelError> {
        let request = ValidateRequest {
            license_key: license.license_key(),
            fingerprint: license.fingerprint(),
        };

        debug!(
            "Validating license for application: {}",
            license.application_name()
        );

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, license.organization_id())
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SentinelError::transport(
                status.as_u16(),
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown Status")
                ),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                SentinelError::Connectivity(format!("Failed to read body: {}", error_chain(&e)))
            })?;

        debug!(
            "License validation response received for: {}",
            license.application_name()
        );

        Ok(body.to_vec())
    }
}

fn map_request_error(e: reqwest::Error) -> SentinelError {
    let message = format!("Request failed: {}", error_chain(&e));
    if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
        SentinelError::Connectivity(message)
    } else {
        SentinelError::Unexpected(message)
    }
}

/// Render an error with every `source()` below it, joined by `: `.
///
/// reqwest's own `Display` stops at the top level, which hides the hyper or
/// io cause that keyword classification needs.
pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Build the User-Agent string.
///
/// Format: `license-sentinel/<version>`
pub fn build_user_agent() -> String {
    format!("license-sentinel/{}", env!("CARGO_PKG_VERSION"))
}
