//! License status logging.

use crate::protocol::models::ValidationResult;
use tracing::{error, info, warn};

/// Whether `days_left` is inside any warning window.
///
/// Windows are inclusive (`days_left <= threshold`). Non-positive values are
/// handled separately by [`log_license_status`].
pub fn is_expiry_warning(days_left: i64, thresholds: &[i64]) -> bool {
    days_left > 0 && thresholds.iter().any(|t| days_left <= *t)
}

/// Log a validation outcome, flagging trial, grace period and near expiry.
pub fn log_license_status(result: &ValidationResult, application_name: &str, thresholds: &[i64]) {
    if !result.valid {
        error!("License validation failed for application: {}", application_name);
        return;
    }

    info!("License validation successful for application: {}", application_name);

    if result.is_trial {
        warn!("Application {} is running on a trial license", application_name);
    }

    if result.active_grace_period {
        warn!(
            "Application {} is in grace period - license expired but still functional",
            application_name
        );
    }

    if let Some(days) = result.expiry_days_left {
        if is_expiry_warning(days, thresholds) {
            warn!("License for {} expires in {} days", application_name, days);
        } else if days > 0 {
            info!("License for {} expires in {} days", application_name, days);
        } else if !result.active_grace_period {
            warn!("License for {} has reached its expiry date", application_name);
        }
    }
}
