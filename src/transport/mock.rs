//! Scripted transport for tests.

use crate::identity::LicenseConfig;
use crate::transport::LicenseTransport;
use crate::SentinelError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Responder = Box<dyn Fn(usize) -> Result<Vec<u8>, SentinelError> + Send + Sync>;

/// Transport whose replies are computed from the zero-based call index.
pub struct MockTransport {
    responder: Responder,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Reply to call `n` with `responder(n)`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize) -> Result<Vec<u8>, SentinelError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Always reply with the JSON body.
    pub fn json(body: serde_json::Value) -> Self {
        let bytes = body.to_string().into_bytes();
        Self::new(move |_| Ok(bytes.clone()))
    }

    /// Always fail with the error produced by `make_error`.
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> SentinelError + Send + Sync + 'static,
    {
        Self::new(move |_| Err(make_error()))
    }

    /// Sleep (on the Tokio clock) before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of calls made so far.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl LicenseTransport for MockTransport {
    async fn send_validation(&self, _license: &LicenseConfig) -> Result<Vec<u8>, SentinelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(call)
    }
}
