//! Basic license validation example.
//!
//! This example demonstrates the startup check, an on-demand re-check and a
//! clean shutdown.
//!
//! # Running
//!
//! ```bash
//! export LICENSE_KEY="your-license-key"
//! export LICENSE_APP_NAME="example-app"
//! export LICENSE_ORG_ID="your-org-id"
//! export LICENSE_BASE_URL="https://license.example.com"   # optional
//! RUST_LOG=info cargo run --example basic_validation
//! ```

use license_sentinel::{LicenseConfig, LicenseManager, SentinelConfig, SentinelError};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn required_env(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set the {} environment variable", name);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let license = match LicenseConfig::new(
        required_env("LICENSE_APP_NAME"),
        required_env("LICENSE_KEY"),
        required_env("LICENSE_ORG_ID"),
    ) {
        Ok(license) => license,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Options come from LICENSE_* variables, falling back to defaults.
    let manager = match LicenseManager::new(license, SentinelConfig::from_env()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Report fatal states instead of exiting so the example can print them.
    let manager = manager.with_termination_handler(Arc::new(|reason: &str| {
        eprintln!("Termination requested: {}", reason);
    }));

    // Startup check:
    // 1. POST to {base_url}/licenses/validate, retrying outages with backoff
    // 2. Valid answers are cached for an hour
    // 3. Outages fall back to the cache, then to a 7-day grant
    // 4. Background refresh starts on success
    if let Err(e) = manager.initialize().await {
        match &e {
            SentinelError::InvalidLicense => eprintln!("License is invalid or expired"),
            _ => eprintln!("Validation error: {}", e),
        }
        std::process::exit(1);
    }

    match manager.validate().await {
        Ok(result) if result.valid => {
            println!("✓ License valid!");
            if let Some(days) = result.expiry_days_left {
                println!("  Expires in: {} days", days);
            }
            println!("  Trial: {}", result.is_trial);
            println!("  Grace period: {}", result.active_grace_period);
        }
        Ok(_) => println!("✗ License invalid"),
        Err(e) => eprintln!("Validation error: {}", e),
    }

    manager.shutdown();
}
