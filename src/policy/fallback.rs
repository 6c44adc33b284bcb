//! Synthetic results returned when a live check cannot produce one.

use crate::protocol::models::ValidationResult;

/// Days left reported by the optimistic fallback.
pub const FALLBACK_EXPIRY_DAYS: i64 = 7;

/// Fail-open result used when the authority is unreachable and nothing is cached.
pub fn optimistic_result() -> ValidationResult {
    ValidationResult {
        valid: true,
        expiry_days_left: Some(FALLBACK_EXPIRY_DAYS),
        active_grace_period: false,
        is_trial: false,
    }
}

/// Fail-closed result used when the authority rejected the credentials.
pub fn hard_invalid_result() -> ValidationResult {
    ValidationResult {
        valid: false,
        expiry_days_left: Some(0),
        active_grace_period: false,
        is_trial: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_result() {
        let result = optimistic_result();
        assert!(result.valid);
        assert_eq!(result.expiry_days_left, Some(7));
        assert!(!result.active_grace_period);
        assert!(!result.is_trial);
    }

    #[test]
    fn test_hard_invalid_result() {
        let result = hard_invalid_result();
        assert!(!result.valid);
        assert_eq!(result.expiry_days_left, Some(0));
        assert!(!result.active_grace_period);
        assert!(!result.is_trial);
    }
}
