//! Error types for registration and payment reconciliation operations.

use crate::state::RegistrationStatus;
use thiserror::Error;

/// Result type alias for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Error taxonomy for the registration workflow.
///
/// Business outcomes (capacity exhausted, duplicate registration, wrong state
/// for a transition) are modeled as variants so callers can map them to
/// precise HTTP responses; only `Provider` and `Database` represent genuinely
/// unexpected failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════
    /// Email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    // ═══════════════════════════════════════════════════════════
    // Capacity / business conflicts
    // ═══════════════════════════════════════════════════════════
    /// All attendee slots are taken.
    #[error("Registrations are full")]
    RegistrationsFull,

    /// All monastery sleeping slots are taken.
    #[error("Monastery sleeping slots are full")]
    MonasteryFull,

    /// An active registration already exists for this email.
    #[error("Registration already exists with status {status}")]
    RegistrationExists {
        /// Current status of the existing row.
        status: RegistrationStatus,
    },

    /// The row is not in the state the requested transition needs.
    #[error("Registration is not pending (currently {status})")]
    RegistrationNotPending {
        /// Current status of the row.
        status: RegistrationStatus,
    },

    // ═══════════════════════════════════════════════════════════
    // Not found
    // ═══════════════════════════════════════════════════════════
    /// No registration for this email or payment reference.
    #[error("Registration not found")]
    RegistrationNotFound,

    // ═══════════════════════════════════════════════════════════
    // Storage signals
    // ═══════════════════════════════════════════════════════════
    /// Unique-constraint violation on the normalized email.
    ///
    /// Raised by the store when an insert loses the duplicate-registration
    /// race; the workflow converts it into `RegistrationExists` after a
    /// fresh lookup.
    #[error("Email already registered")]
    DuplicateEmail,

    // ═══════════════════════════════════════════════════════════
    // Webhook payloads
    // ═══════════════════════════════════════════════════════════
    /// Webhook reported a charge status this workflow does not act on.
    #[error("Unsupported webhook status: {reported}")]
    UnsupportedWebhookStatus {
        /// Raw status string reported by the provider.
        reported: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System errors
    // ═══════════════════════════════════════════════════════════
    /// Payment provider call failed.
    #[error("Payment provider error: {0}")]
    Provider(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl RegistrationError {
    /// Returns `true` if this error is a request-local business conflict
    /// (409-class), as opposed to bad input or a system failure.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::RegistrationsFull
                | Self::MonasteryFull
                | Self::RegistrationExists { .. }
                | Self::RegistrationNotPending { .. }
                | Self::DuplicateEmail
        )
    }

    /// Returns `true` if this error should surface as a generic 500.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Database(_))
    }
}
