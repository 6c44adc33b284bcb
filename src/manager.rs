//! License Manager - the caller-facing API.
//!
//! The `LicenseManager` wraps a [`LicenseValidator`] with lifecycle handling:
//! - `initialize()` performs the startup check and starts background refresh
//! - `validate()` re-checks on demand
//! - fatal outcomes invoke the termination handler
//! - `shutdown()` stops refresh and drops cached results

use crate::config::SentinelConfig;
use crate::identity::LicenseConfig;
use crate::protocol::models::ValidationResult;
use crate::refresh::RefreshScheduler;
use crate::termination::{ExitProcess, TerminationHandler};
use crate::transport::LicenseTransport;
use crate::validator::LicenseValidator;
use crate::SentinelError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main license manager.
///
/// Create one instance per licensed identity and keep it for the lifetime of
/// the application. By default a fatal license state exits the process; use
/// [`with_termination_handler`](Self::with_termination_handler) to change that.
pub struct LicenseManager {
    validator: Arc<LicenseValidator>,
    scheduler: RefreshScheduler,
    handler: Arc<dyn TerminationHandler>,
    initialized: AtomicBool,
}

impl LicenseManager {
    /// Create a manager validating over HTTP.
    ///
    /// # Errors
    /// `Configuration` if the options are invalid or the HTTP client cannot
    /// be built.
    pub fn new(license: LicenseConfig, options: SentinelConfig) -> Result<Self, SentinelError> {
        Ok(Self::from_validator(LicenseValidator::new(license, options)?))
    }

    /// Create a manager over a custom transport.
    pub fn with_transport(
        license: LicenseConfig,
        options: SentinelConfig,
        transport: Box<dyn LicenseTransport>,
    ) -> Result<Self, SentinelError> {
        Ok(Self::from_validator(LicenseValidator::with_transport(
            license, options, transport,
        )?))
    }

    /// Wrap an existing validator.
    pub fn from_validator(validator: LicenseValidator) -> Self {
        let validator = Arc::new(validator);
        let handler: Arc<dyn TerminationHandler> = Arc::new(ExitProcess::default());
        let scheduler = Self::scheduler_for(&validator, handler.clone());

        Self {
            validator,
            scheduler,
            handler,
            initialized: AtomicBool::new(false),
        }
    }

    /// Replace the termination handler.
    ///
    /// Safe after `initialize()`: a running background refresh keeps running
    /// and reports to the new handler.
    pub fn with_termination_handler(mut self, handler: Arc<dyn TerminationHandler>) -> Self {
        self.scheduler.set_handler(handler.clone());
        self.handler = handler;
        self
    }

    fn scheduler_for(
        validator: &Arc<LicenseValidator>,
        handler: Arc<dyn TerminationHandler>,
    ) -> RefreshScheduler {
        let options = validator.options();
        RefreshScheduler::new(
            Arc::downgrade(validator),
            options.refresh_interval,
            options.fatal_keywords.clone(),
            handler,
        )
    }

    /// Run the startup validation and start background refresh.
    ///
    /// A second call while initialized logs a warning and does nothing.
    ///
    /// # Errors
    /// - `InvalidLicense` - the authority reported the license invalid
    /// - `Unexpected` - validation failed in an unclassified way
    /// - `Configuration` - the refresh task could not be started
    ///
    /// The termination handler is invoked for the first two.
    pub async fn initialize(&self) -> Result<(), SentinelError> {
        if self.initialized.load(Ordering::SeqCst) {
            warn!("License manager already initialized");
            return Ok(());
        }

        let app = self.validator.config().application_name();
        info!("Initializing license validation for application: {}", app);

        match self.validator.validate().await {
            Ok(result) if result.valid => {}
            Ok(_) => {
                error!("License is invalid for application: {}", app);
                self.handler.terminate("License is invalid or expired");
                return Err(SentinelError::InvalidLicense);
            }
            Err(e) => {
                error!("License initialization failed: {}", e);
                self.handler
                    .terminate(&format!("License validation failed: {}", e));
                return Err(e);
            }
        }

        self.scheduler.start()?;
        self.initialized.store(true, Ordering::SeqCst);
        info!("License validation initialized for application: {}", app);
        Ok(())
    }

    /// Validate on demand.
    ///
    /// An invalid result invokes the termination handler and is still
    /// returned.
    ///
    /// # Errors
    /// - `NotInitialized` - called before a successful `initialize()`
    /// - `Unexpected` - validation failed in an unclassified way (the
    ///   termination handler is invoked first)
    pub async fn validate(&self) -> Result<ValidationResult, SentinelError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(SentinelError::NotInitialized);
        }

        match self.validator.validate().await {
            Ok(result) => {
                if !result.valid {
                    error!(
                        "License is invalid for application: {}",
                        self.validator.config().application_name()
                    );
                    self.handler.terminate("License is invalid or expired");
                }
                Ok(result)
            }
            Err(e) => {
                error!("License validation failed: {}", e);
                self.handler
                    .terminate(&format!("License validation failed: {}", e));
                Err(e)
            }
        }
    }

    /// Stop background refresh, drop all cached results and reset to the
    /// uninitialized state.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.validator.close();
        self.initialized.store(false, Ordering::SeqCst);
        info!(
            "License manager shut down for application: {}",
            self.validator.config().application_name()
        );
    }

    /// Whether `initialize()` has succeeded and `shutdown()` has not run since.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether background refresh is running.
    pub fn is_refresh_active(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Drop this identity's cached result.
    pub fn clear_cache(&self) {
        self.validator.clear_cache();
    }

    /// The underlying validator.
    pub fn validator(&self) -> &Arc<LicenseValidator> {
        &self.validator
    }
}
