//! License authority request/response structs and strict decoding.

use crate::SentinelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validation request body sent to the authority.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest<'a> {
    /// License key being validated.
    pub license_key: &'a str,
    /// Identity fingerprint of the calling instance.
    pub fingerprint: &'a str,
}

/// Outcome of a license check, live or synthetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the license may be used.
    pub valid: bool,

    /// Days until expiry, when the authority reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_days_left: Option<i64>,

    /// License expired but still honoured.
    #[serde(default)]
    pub active_grace_period: bool,

    /// Trial license.
    #[serde(default)]
    pub is_trial: bool,
}

impl ValidationResult {
    /// Rebuild a result from a cached JSON value.
    ///
    /// Only a boolean `valid` is required; other fields fall back to their
    /// defaults. Returns `None` for anything that is not a usable entry.
    pub fn from_cached(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let valid = object.get("valid")?.as_bool()?;
        Some(Self {
            valid,
            expiry_days_left: object.get("expiryDaysLeft").and_then(Value::as_i64),
            active_grace_period: object
                .get("activeGracePeriod")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            is_trial: object.get("isTrial").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

/// Decode a raw response body into a [`ValidationResult`].
///
/// Fails closed with `Protocol` on any shape or type mismatch:
/// - body must be a JSON object
/// - `valid` must be present and boolean
/// - `expiryDaysLeft` may be absent or null, otherwise an integral number
/// - `activeGracePeriod` and `isTrial` may be absent, otherwise boolean
pub fn parse_validation_response(body: &[u8]) -> Result<ValidationResult, SentinelError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SentinelError::Protocol(format!("Failed to parse response: {}", e)))?;

    let Value::Object(object) = value else {
        return Err(SentinelError::Protocol(
            "Invalid response format from license server".to_string(),
        ));
    };

    let valid = match object.get("valid") {
        Some(Value::Bool(valid)) => *valid,
        _ => {
            return Err(SentinelError::Protocol(
                "Invalid validation result: valid field must be boolean".to_string(),
            ))
        }
    };

    Ok(ValidationResult {
        valid,
        expiry_days_left: expiry_days_left(&object)?,
        active_grace_period: optional_bool(&object, "activeGracePeriod")?,
        is_trial: optional_bool(&object, "isTrial")?,
    })
}

fn expiry_days_left(object: &Map<String, Value>) -> Result<Option<i64>, SentinelError> {
    let mismatch = || {
        SentinelError::Protocol(
            "Invalid validation result: expiryDaysLeft must be number".to_string(),
        )
    };

    match object.get("expiryDaysLeft") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(days) = n.as_i64() {
                return Ok(Some(days));
            }
            // Integral floats such as `7.0` are accepted.
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(mismatch()),
            }
        }
        Some(_) => Err(mismatch()),
    }
}

fn optional_bool(object: &Map<String, Value>, field: &str) -> Result<bool, SentinelError> {
    match object.get(field) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(SentinelError::Protocol(format!(
            "Invalid validation result: {} must be boolean",
            field
        ))),
    }
}
