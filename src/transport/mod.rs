//! Transport layer: the wire seam, its HTTP implementation and the retry loop.

pub mod http;
#[cfg(any(test, feature = "test-seams"))]
pub mod mock;
pub mod retry;

use crate::identity::LicenseConfig;
use crate::SentinelError;
use async_trait::async_trait;

/// One round trip to the license authority.
///
/// Implementations return the raw response body on success. A non-success
/// status must be reported as [`SentinelError::Transport`]; an unreachable
/// authority as [`SentinelError::Connectivity`] when the implementation can
/// tell, otherwise as [`SentinelError::Unexpected`] carrying the underlying
/// error text for keyword classification.
#[async_trait]
pub trait LicenseTransport: Send + Sync {
    /// Send one validation request for `license`.
    async fn send_validation(&self, license: &LicenseConfig) -> Result<Vec<u8>, SentinelError>;
}
