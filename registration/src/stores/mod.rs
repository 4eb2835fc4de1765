//! Registration storage.
//!
//! The store is the single source of truth for registration rows and carries
//! no business logic. The trait abstracts over the backing relational store
//! so the workflow can run against PostgreSQL in production and the
//! in-memory mock in tests.

use crate::error::Result;
use crate::state::{AttendeeProfile, Charge, Registration};
use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

#[cfg(feature = "postgres")]
pub mod postgres;

/// Fields written on insert or full resubmission.
///
/// `update` keeps the row's immutable `id` and ignores this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    /// Row identifier (used on insert only).
    pub id: Uuid,
    /// Normalized email.
    pub email: String,
    /// Attendee profile.
    pub profile: AttendeeProfile,
    /// Sleep-at-monastery flag.
    pub sleep_at_monastery: bool,
    /// Provider that issued the attached charge.
    pub payment_provider: String,
    /// The freshly issued charge.
    pub charge: Charge,
}

/// Registration row storage.
pub trait RegistrationStore: Send + Sync {
    /// Look up a registration by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Registration>>> + Send;

    /// Look up a registration by provider payment reference.
    ///
    /// Used exclusively by webhook reconciliation.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> impl Future<Output = Result<Option<Registration>>> + Send;

    /// Insert a new PENDING registration.
    ///
    /// Uniqueness of the normalized email is enforced by the storage layer,
    /// not by a prior read.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The query fails
    /// - The email already exists → `RegistrationError::DuplicateEmail`
    fn insert(&self, registration: &NewRegistration) -> impl Future<Output = Result<()>> + Send;

    /// Replace a row's mutable fields on resubmission.
    ///
    /// Sets status back to PENDING, attaches the new charge, resets
    /// `created_at` to now and clears `paid_at` (the PIX clock starts over).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The query fails
    /// - No row exists for the email → `RegistrationError::RegistrationNotFound`
    fn update(
        &self,
        email: &str,
        registration: &NewRegistration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Replace only the payment linkage (reissue: new charge, same row).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The query fails
    /// - No row exists for the email → `RegistrationError::RegistrationNotFound`
    fn set_payment_ref(
        &self,
        email: &str,
        provider: &str,
        charge: &Charge,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Conditionally flip a row to PAID and stamp `paid_at`.
    ///
    /// The write only happens if the row's current `payment_ref` still equals
    /// `payment_ref` and the row is still PENDING; this is the
    /// compare-and-swap guard against replayed and superseded webhooks.
    ///
    /// # Returns
    ///
    /// `true` if a row was updated, `false` if the guard did not match.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn mark_paid(
        &self,
        email: &str,
        payment_ref: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Flip all PENDING rows created before `cutoff` to CANCELED.
    ///
    /// Idempotent; safe to call on every entry point.
    ///
    /// # Returns
    ///
    /// Number of rows swept.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn sweep_expired_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Count rows with status in {PENDING, PAID}.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn count_active(&self) -> impl Future<Output = Result<i64>> + Send;

    /// Count rows with status in {PENDING, PAID} and the sleep flag set.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn count_active_sleepers(&self) -> impl Future<Output = Result<i64>> + Send;
}
