//! Registration workflow configuration.
//!
//! Configuration values are provided by the application, not hardcoded in
//! the workflow. Builders follow the usual `new() → with_*()` shape.

use chrono::Duration;

/// Default attendee capacity.
pub const DEFAULT_MAX_TOTAL: i64 = 400;

/// Default monastery sleeping capacity.
pub const DEFAULT_MAX_SLEEP: i64 = 100;

/// Registration workflow configuration.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Maximum number of active (PENDING or PAID) registrations.
    ///
    /// Default: 400
    pub max_total: i64,

    /// Maximum number of active registrations with the sleep flag.
    ///
    /// Default: 100
    pub max_sleep: i64,

    /// Age after which a PENDING registration is swept to CANCELED.
    ///
    /// Default: 24 hours
    pub pending_ttl: Duration,
}

impl RegistrationConfig {
    /// Create a configuration with the default caps and expiry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_total: DEFAULT_MAX_TOTAL,
            max_sleep: DEFAULT_MAX_SLEEP,
            pending_ttl: Duration::hours(24),
        }
    }

    /// Set the total attendee cap.
    #[must_use]
    pub const fn with_max_total(mut self, max_total: i64) -> Self {
        self.max_total = max_total;
        self
    }

    /// Set the monastery sleeping cap.
    #[must_use]
    pub const fn with_max_sleep(mut self, max_sleep: i64) -> Self {
        self.max_sleep = max_sleep;
        self
    }

    /// Set the PENDING expiry window.
    #[must_use]
    pub const fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Webhook endpoint configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret expected in the webhook auth header.
    pub secret: String,
}

impl WebhookConfig {
    /// Create a webhook configuration.
    #[must_use]
    pub const fn new(secret: String) -> Self {
        Self { secret }
    }
}

/// OpenPix charge API configuration.
#[derive(Debug, Clone)]
pub struct OpenPixConfig {
    /// API base URL (e.g. "https://api.openpix.com.br").
    pub base_url: String,

    /// Application API key, sent in the `Authorization` header.
    pub api_key: String,

    /// Charge value in centavos.
    pub charge_value: i64,

    /// Charge lifetime in seconds, passed to the provider.
    ///
    /// Default: 24 hours (matches the local PENDING expiry window)
    pub charge_expiry_seconds: i64,
}

impl OpenPixConfig {
    /// Create an OpenPix configuration.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base URL
    /// * `api_key` - application API key
    /// * `charge_value` - charge value in centavos
    #[must_use]
    pub const fn new(base_url: String, api_key: String, charge_value: i64) -> Self {
        Self {
            base_url,
            api_key,
            charge_value,
            charge_expiry_seconds: 24 * 60 * 60,
        }
    }

    /// Set the charge lifetime in seconds.
    #[must_use]
    pub const fn with_charge_expiry(mut self, seconds: i64) -> Self {
        self.charge_expiry_seconds = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_config_defaults() {
        let config = RegistrationConfig::default();
        assert_eq!(config.max_total, 400);
        assert_eq!(config.max_sleep, 100);
        assert_eq!(config.pending_ttl, Duration::hours(24));
    }

    #[test]
    fn registration_config_builder() {
        let config = RegistrationConfig::new()
            .with_max_total(10)
            .with_max_sleep(2)
            .with_pending_ttl(Duration::minutes(30));

        assert_eq!(config.max_total, 10);
        assert_eq!(config.max_sleep, 2);
        assert_eq!(config.pending_ttl, Duration::minutes(30));
    }

    #[test]
    fn openpix_config_builder() {
        let config = OpenPixConfig::new(
            "https://api.openpix.com.br".to_string(),
            "app-key".to_string(),
            15_000,
        )
        .with_charge_expiry(3600);

        assert_eq!(config.charge_value, 15_000);
        assert_eq!(config.charge_expiry_seconds, 3600);
    }
}
