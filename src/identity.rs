//! License identity and fingerprinting.

use crate::SentinelError;
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix of every validation cache key.
pub const CACHE_KEY_PREFIX: &str = "license:";

/// Identity of one protected application instance.
///
/// Built once per validator; the fingerprint is derived at construction and
/// never changes.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseConfig {
    application_name: String,
    license_key: String,
    organization_id: String,
    fingerprint: String,
}

impl LicenseConfig {
    /// Validate the identity fields and derive the fingerprint.
    ///
    /// # Errors
    /// `Configuration` naming the first empty field.
    pub fn new(
        application_name: impl Into<String>,
        license_key: impl Into<String>,
        organization_id: impl Into<String>,
    ) -> Result<Self, SentinelError> {
        let application_name = application_name.into();
        let license_key = license_key.into();
        let organization_id = organization_id.into();

        require_non_empty("application_name", &application_name)?;
        require_non_empty("license_key", &license_key)?;
        require_non_empty("organization_id", &organization_id)?;

        let fingerprint = generate_fingerprint(&application_name, &license_key, &organization_id);

        Ok(Self {
            application_name,
            license_key,
            organization_id,
            fingerprint,
        })
    }

    /// Application name.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// License key.
    pub fn license_key(&self) -> &str {
        &self.license_key
    }

    /// Organization identifier.
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Identity digest sent to the authority.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Cache key for this identity's validation result.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.fingerprint)
    }
}

impl fmt::Debug for LicenseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseConfig")
            .field("application_name", &self.application_name)
            .field("license_key", &"<redacted>")
            .field("organization_id", &self.organization_id)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), SentinelError> {
    if value.trim().is_empty() {
        return Err(SentinelError::Configuration(format!(
            "{} must be a non-empty string",
            field
        )));
    }
    Ok(())
}

/// Compute the identity fingerprint.
///
/// Lowercase hex SHA-256 of `"{application_name}:{license_key}:{organization_id}"`.
/// Pure: no salt, stable across restarts.
pub fn generate_fingerprint(application_name: &str, license_key: &str, organization_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(application_name.as_bytes());
    hasher.update(b":");
    hasher.update(license_key.as_bytes());
    hasher.update(b":");
    hasher.update(organization_id.as_bytes());
    hex::encode(hasher.finalize())
}
