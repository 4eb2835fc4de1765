//! Domain state for the registration workflow.
//!
//! One `Registration` row exists per normalized (lowercased) email. The row
//! carries the attendee profile, the lifecycle status and the linkage to the
//! current PIX charge. The stored display code and QR URL let `check_status`
//! re-present the payment instructions while the row is still `PENDING`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a registration.
///
/// `PENDING → PAID` via webhook reconciliation; `PENDING → CANCELED` via the
/// expiry sweep. A `CANCELED` row is re-openable: resubmitting the same email
/// starts a fresh `PENDING` cycle on the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Charge issued, payment not yet confirmed.
    Pending,
    /// Payment confirmed by the provider.
    Paid,
    /// Expired or abandoned; does not count toward capacity.
    Canceled,
}

impl RegistrationStatus {
    /// Canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Canceled => "CANCELED",
        }
    }

    /// Returns `true` while the row holds capacity (`PENDING` or `PAID`).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(format!("unknown registration status: {other}")),
        }
    }
}

/// Attendee profile data, collected at registration time.
///
/// Free-form; only the email (kept separately as the row key) is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeProfile {
    /// Full name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Postal code (CEP).
    pub postal_code: String,
    /// Street name.
    pub street: String,
    /// Street number.
    pub number: String,
    /// Address complement (optional).
    pub complement: Option<String>,
    /// City.
    pub city: String,
    /// State (UF).
    pub state: String,
}

/// A PIX charge issued by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Provider-issued correlation identifier; joins webhooks to the row.
    pub payment_ref: String,
    /// Human-presentable copy-and-paste payment code.
    pub display_code: String,
    /// URL of the QR code image, when the provider returns one.
    pub qr_image_url: Option<String>,
    /// Charge expiry reported by the provider.
    pub expires_at: Option<DateTime<Utc>>,
}

/// One registration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: Uuid,
    /// Normalized (lowercased) email; unique key.
    pub email: String,
    /// Attendee profile.
    pub profile: AttendeeProfile,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// Name of the provider that issued the current charge.
    pub payment_provider: String,
    /// Provider correlation reference of the current charge.
    pub payment_ref: String,
    /// Stored display code of the current charge.
    pub payment_code: String,
    /// Stored QR image URL of the current charge.
    pub qr_code_url: Option<String>,
    /// Attendee requested an on-site sleeping slot.
    pub sleep_at_monastery: bool,
    /// Row creation time; reset when a PENDING/CANCELED row is resubmitted.
    pub created_at: DateTime<Utc>,
    /// Set only on transition into `PAID`.
    pub paid_at: Option<DateTime<Utc>>,
}
