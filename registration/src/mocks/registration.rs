//! Mock registration store for testing.

use crate::error::{RegistrationError, Result};
use crate::state::{Charge, Registration, RegistrationStatus};
use crate::stores::{NewRegistration, RegistrationStore};
use crate::utils::normalize_email;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock registration store.
///
/// In-memory map keyed by normalized email, enforcing the same contract as
/// the PostgreSQL store: unique emails, conditional `mark_paid`, bulk sweep.
#[derive(Debug, Clone, Default)]
pub struct MockRegistrationStore {
    rows: Arc<Mutex<HashMap<String, Registration>>>,
}

impl MockRegistrationStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Registration>>> {
        self.rows
            .lock()
            .map_err(|_| RegistrationError::Database("mock store mutex poisoned".to_string()))
    }

    /// Snapshot of a row, for assertions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn get(&self, email: &str) -> Option<Registration> {
        #[allow(clippy::unwrap_used)]
        self.rows.lock().unwrap().get(&normalize_email(email)).cloned()
    }

    /// Backdate a row's `created_at`, for expiry tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_created_at(&self, email: &str, created_at: DateTime<Utc>) {
        #[allow(clippy::unwrap_used)]
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.get_mut(&normalize_email(email)) {
            row.created_at = created_at;
        }
    }

    /// Number of stored rows (any status).
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        self.rows.lock().unwrap().len()
    }

    /// Returns `true` if the store holds no rows.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RegistrationStore for MockRegistrationStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>> {
        Ok(self.lock()?.get(&normalize_email(email)).cloned())
    }

    async fn find_by_payment_ref(&self, payment_ref: &str) -> Result<Option<Registration>> {
        Ok(self
            .lock()?
            .values()
            .find(|row| row.payment_ref == payment_ref)
            .cloned())
    }

    async fn insert(&self, registration: &NewRegistration) -> Result<()> {
        let key = normalize_email(&registration.email);
        let mut rows = self.lock()?;

        if rows.contains_key(&key) {
            return Err(RegistrationError::DuplicateEmail);
        }

        rows.insert(
            key.clone(),
            Registration {
                id: registration.id,
                email: key,
                profile: registration.profile.clone(),
                status: RegistrationStatus::Pending,
                payment_provider: registration.payment_provider.clone(),
                payment_ref: registration.charge.payment_ref.clone(),
                payment_code: registration.charge.display_code.clone(),
                qr_code_url: registration.charge.qr_image_url.clone(),
                sleep_at_monastery: registration.sleep_at_monastery,
                created_at: Utc::now(),
                paid_at: None,
            },
        );

        Ok(())
    }

    async fn update(&self, email: &str, registration: &NewRegistration) -> Result<()> {
        let key = normalize_email(email);
        let mut rows = self.lock()?;

        let row = rows
            .get_mut(&key)
            .ok_or(RegistrationError::RegistrationNotFound)?;

        // The row id is immutable; everything else starts over.
        row.profile = registration.profile.clone();
        row.status = RegistrationStatus::Pending;
        row.payment_provider = registration.payment_provider.clone();
        row.payment_ref = registration.charge.payment_ref.clone();
        row.payment_code = registration.charge.display_code.clone();
        row.qr_code_url = registration.charge.qr_image_url.clone();
        row.sleep_at_monastery = registration.sleep_at_monastery;
        row.created_at = Utc::now();
        row.paid_at = None;

        Ok(())
    }

    async fn set_payment_ref(&self, email: &str, provider: &str, charge: &Charge) -> Result<()> {
        let key = normalize_email(email);
        let mut rows = self.lock()?;

        let row = rows
            .get_mut(&key)
            .ok_or(RegistrationError::RegistrationNotFound)?;

        row.payment_provider = provider.to_string();
        row.payment_ref = charge.payment_ref.clone();
        row.payment_code = charge.display_code.clone();
        row.qr_code_url = charge.qr_image_url.clone();

        Ok(())
    }

    async fn mark_paid(&self, email: &str, payment_ref: &str) -> Result<bool> {
        let key = normalize_email(email);
        let mut rows = self.lock()?;

        match rows.get_mut(&key) {
            Some(row)
                if row.payment_ref == payment_ref
                    && row.status == RegistrationStatus::Pending =>
            {
                row.status = RegistrationStatus::Paid;
                row.paid_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn sweep_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.lock()?;
        let mut swept = 0;

        for row in rows.values_mut() {
            if row.status == RegistrationStatus::Pending && row.created_at < cutoff {
                row.status = RegistrationStatus::Canceled;
                swept += 1;
            }
        }

        Ok(swept)
    }

    async fn count_active(&self) -> Result<i64> {
        let rows = self.lock()?;
        Ok(rows.values().filter(|r| r.status.is_active()).count() as i64)
    }

    async fn count_active_sleepers(&self) -> Result<i64> {
        let rows = self.lock()?;
        Ok(rows
            .values()
            .filter(|r| r.status.is_active() && r.sleep_at_monastery)
            .count() as i64)
    }
}
