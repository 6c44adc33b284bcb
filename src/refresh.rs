//! Background license refresh.
//!
//! A spawned Tokio task re-validates on a fixed period. Ticks never overlap:
//! the next tick is only awaited after the current validation returns. A
//! failure whose text matches the fatal vocabulary stops the task and invokes
//! the termination handler; any other failure is logged and the schedule
//! continues.

use crate::policy::classify::contains_keyword;
use crate::termination::TerminationHandler;
use crate::validator::LicenseValidator;
use crate::SentinelError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Periodic re-validation driver.
///
/// Holds only a weak reference to the validator; once the validator is
/// dropped the task ends at its next tick.
pub struct RefreshScheduler {
    validator: Weak<LicenseValidator>,
    interval: Duration,
    fatal_keywords: Vec<String>,
    handler: SharedHandler,
    task: Mutex<Option<RefreshTask>>,
}

type SharedHandler = Arc<RwLock<Arc<dyn TerminationHandler>>>;

struct RefreshTask {
    shutdown: watch::Sender<bool>,
    running: Arc<AtomicBool>,
    _handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Create an idle scheduler.
    pub fn new(
        validator: Weak<LicenseValidator>,
        interval: Duration,
        fatal_keywords: Vec<String>,
        handler: Arc<dyn TerminationHandler>,
    ) -> Self {
        Self {
            validator,
            interval,
            fatal_keywords: fatal_keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            handler: Arc::new(RwLock::new(handler)),
            task: Mutex::new(None),
        }
    }

    /// Start the refresh task. The first tick fires one full period from now.
    ///
    /// Calling `start()` while already running logs a warning and does nothing.
    ///
    /// # Errors
    /// `Configuration` if the interval is zero or no Tokio runtime is available.
    pub fn start(&self) -> Result<(), SentinelError> {
        if self.interval.is_zero() {
            return Err(SentinelError::Configuration(
                "Refresh interval must be greater than zero".to_string(),
            ));
        }

        let mut task = self.lock_task();
        if task.as_ref().is_some_and(RefreshTask::is_running) {
            warn!("License refresh already running");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            SentinelError::Configuration("License refresh requires a Tokio runtime".to_string())
        })?;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let running = Arc::new(AtomicBool::new(true));
        let refresh = RefreshLoop {
            validator: self.validator.clone(),
            interval: self.interval,
            fatal_keywords: self.fatal_keywords.clone(),
            handler: self.handler.clone(),
            running: running.clone(),
            shutdown: shutdown_rx,
        };
        let handle = runtime.spawn(refresh.run());

        *task = Some(RefreshTask {
            shutdown,
            running,
            _handle: handle,
        });

        info!(
            "License refresh scheduled every {}ms",
            self.interval.as_millis()
        );
        Ok(())
    }

    /// Stop scheduling ticks. A tick already in progress runs to completion.
    pub fn stop(&self) {
        if let Some(task) = self.lock_task().take() {
            task.running.store(false, Ordering::SeqCst);
            // Receiver may already be gone if the task ended on its own.
            let _ = task.shutdown.send(true);
            info!("License refresh stopped");
        }
    }

    /// Whether the refresh task is scheduled and has not ended.
    pub fn is_active(&self) -> bool {
        self.lock_task().as_ref().is_some_and(RefreshTask::is_running)
    }

    /// Replace the termination handler. Takes effect for a running task too.
    pub fn set_handler(&self, handler: Arc<dyn TerminationHandler>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    /// The refresh period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<RefreshTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl RefreshTask {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

struct RefreshLoop {
    validator: Weak<LicenseValidator>,
    interval: Duration,
    fatal_keywords: Vec<String>,
    handler: SharedHandler,
    running: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl RefreshLoop {
    async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                _ = ticker.tick() => {}
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let Some(validator) = self.validator.upgrade() else {
                debug!("Validator dropped, ending license refresh");
                break;
            };

            match validator.validate().await {
                Ok(_) => debug!("Scheduled license refresh completed"),
                Err(e) => {
                    let message = e.to_string();
                    if contains_keyword(&message, &self.fatal_keywords) {
                        error!("Fatal license error during refresh: {}", message);
                        self.running.store(false, Ordering::SeqCst);
                        let handler = self
                            .handler
                            .read()
                            .unwrap_or_else(PoisonError::into_inner)
                            .clone();
                        handler.terminate(&format!("License validation failed: {}", message));
                        break;
                    }
                    error!("Scheduled license refresh failed: {}", message);
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
    }
}
