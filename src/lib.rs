//! # License Sentinel
//!
//! **Resilient license entitlement checks for Rust services.**
//!
//! License Sentinel proves to a remote license authority that an application
//! instance holds a valid license, and keeps the application running through
//! authority outages.
//!
//! ## Features
//!
//! - **Cache-aside validation** - valid results are cached per identity fingerprint
//! - **Bounded retries** - exponential backoff capped at 30 seconds per sleep
//! - **Graceful degradation** - outages fall back to the last known good result,
//!   then to an optimistic 7-day grant
//! - **Fail closed on rejection** - 4xx answers always yield an invalid result
//! - **Background refresh** - periodic re-validation that can halt the host on
//!   fatal license states
//!
//! ## Quickstart
//!
//! ```no_run
//! use license_sentinel::{LicenseConfig, LicenseManager, SentinelConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), license_sentinel::SentinelError> {
//!     let license = LicenseConfig::new("my-app", "LICENSE-KEY-HERE", "my-org-id")?;
//!     let manager = LicenseManager::new(license, SentinelConfig::from_env())?;
//!
//!     manager.initialize().await?;
//!     let result = manager.validate().await?;
//!     println!("License valid: {}", result.valid);
//!
//!     manager.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! | Failure                         | Outcome                                  |
//! |---------------------------------|------------------------------------------|
//! | 5xx, 408, 429, malformed body   | cached result, else optimistic grant     |
//! | connect error, timeout, DNS     | cached result, else optimistic grant     |
//! | other 4xx                       | invalid result, expiry 0                 |
//! | anything else                   | error returned to the caller             |
//!
//! Retryable failures are retried inside the transport before any fallback
//! applies.
//!
//! ## Configuration
//!
//! - `base_url` - License authority root (`/licenses/validate` is appended)
//! - `timeout` - Bound on each HTTP attempt
//! - `retry_count` / `retry_delay` - Retry budget and base backoff delay
//! - `cache_ttl` - Default TTL of the result cache
//! - `refresh_interval` - Period of background re-validation
//!
//! See [`SentinelConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/license-sentinel/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;
pub mod identity;

// Protocol layer
pub mod protocol;

// Transport layer
pub mod transport;

// Cache layer
pub mod cache;

// Policy layer
pub mod policy;

// Orchestration
pub mod refresh;
pub mod termination;
pub mod validator;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use cache::store::TtlCache;
pub use cache::CacheStore;
pub use clock::{Clock, SystemClock};
pub use config::SentinelConfig;
pub use errors::SentinelError;
pub use identity::{generate_fingerprint, LicenseConfig};
pub use manager::LicenseManager;
pub use policy::classify::{ErrorClassifier, FailureClass};
pub use protocol::models::ValidationResult;
pub use refresh::RefreshScheduler;
pub use termination::{ExitProcess, TerminationHandler};
pub use transport::http::HttpTransport;
pub use transport::LicenseTransport;
pub use validator::LicenseValidator;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "test-seams"))]
pub use transport::mock::MockTransport;
