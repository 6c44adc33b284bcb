//! Termination capability invoked on fatal license states.

use std::time::Duration;
use tracing::error;

/// Halts the protected application.
///
/// The library never exits the process itself; hosts decide what a fatal
/// license state means (exit, supervisor signal, flag for a test).
pub trait TerminationHandler: Send + Sync {
    /// Request termination with a human-readable reason.
    fn terminate(&self, reason: &str);
}

impl<F> TerminationHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn terminate(&self, reason: &str) {
        self(reason)
    }
}

/// Default grace period before [`ExitProcess`] exits.
pub const DEFAULT_EXIT_DELAY: Duration = Duration::from_secs(1);

/// Host adapter that logs the reason and exits with status 1.
#[derive(Debug, Clone, Copy)]
pub struct ExitProcess {
    delay: Duration,
}

impl ExitProcess {
    /// Exit after `delay`, giving log sinks time to flush.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The configured grace period.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ExitProcess {
    fn default() -> Self {
        Self::new(DEFAULT_EXIT_DELAY)
    }
}

impl TerminationHandler for ExitProcess {
    fn terminate(&self, reason: &str) {
        error!("Terminating application: {}", reason);
        let delay = self.delay;
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            std::process::exit(1);
        });
    }
}
