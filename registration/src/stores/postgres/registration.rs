//! PostgreSQL registration store implementation.
//!
//! Emails are normalized to lowercase at this boundary; a unique index on
//! `LOWER(email)` is the duplicate-registration guard, and `mark_paid` is a
//! single conditional `UPDATE` (compare-and-swap on the payment reference)
//! rather than a read-then-write.

use crate::error::{RegistrationError, Result};
use crate::state::{AttendeeProfile, Registration, RegistrationStatus};
use crate::stores::{NewRegistration, RegistrationStore};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL registration store.
#[derive(Clone)]
pub struct PostgresRegistrationStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresRegistrationStore {
    /// Create a new PostgreSQL registration store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RegistrationError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

/// Flat row shape; `status` is parsed into the enum on the way out.
#[derive(sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    email: String,
    name: String,
    phone: String,
    postal_code: String,
    street: String,
    number: String,
    complement: Option<String>,
    city: String,
    state: String,
    status: String,
    payment_provider: String,
    payment_ref: String,
    payment_code: String,
    qr_code_url: Option<String>,
    sleep_at_monastery: bool,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = RegistrationError;

    fn try_from(row: RegistrationRow) -> Result<Self> {
        let status: RegistrationStatus = row
            .status
            .parse()
            .map_err(|e: String| RegistrationError::Database(e))?;

        Ok(Self {
            id: row.id,
            email: row.email,
            profile: AttendeeProfile {
                name: row.name,
                phone: row.phone,
                postal_code: row.postal_code,
                street: row.street,
                number: row.number,
                complement: row.complement,
                city: row.city,
                state: row.state,
            },
            status,
            payment_provider: row.payment_provider,
            payment_ref: row.payment_ref,
            payment_code: row.payment_code,
            qr_code_url: row.qr_code_url,
            sleep_at_monastery: row.sleep_at_monastery,
            created_at: row.created_at,
            paid_at: row.paid_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, email, name, phone, postal_code, street, number, complement, \
     city, state, status, payment_provider, payment_ref, payment_code, qr_code_url, \
     sleep_at_monastery, created_at, paid_at";

impl RegistrationStore for PostgresRegistrationStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>> {
        let sql =
            format!("SELECT {SELECT_COLUMNS} FROM registrations WHERE LOWER(email) = LOWER($1)");

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                RegistrationError::Database(format!("Failed to find registration: {e}"))
            })?;

        row.map(Registration::try_from).transpose()
    }

    async fn find_by_payment_ref(&self, payment_ref: &str) -> Result<Option<Registration>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM registrations WHERE payment_ref = $1");

        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(payment_ref)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                RegistrationError::Database(format!(
                    "Failed to find registration by payment ref: {e}"
                ))
            })?;

        row.map(Registration::try_from).transpose()
    }

    async fn insert(&self, registration: &NewRegistration) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO registrations
                (id, email, name, phone, postal_code, street, number, complement,
                 city, state, status, payment_provider, payment_ref, payment_code,
                 qr_code_url, sleep_at_monastery, created_at, paid_at)
            VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8,
                    $9, $10, 'PENDING', $11, $12, $13,
                    $14, $15, NOW(), NULL)
            ",
        )
        .bind(registration.id)
        .bind(&registration.email)
        .bind(&registration.profile.name)
        .bind(&registration.profile.phone)
        .bind(&registration.profile.postal_code)
        .bind(&registration.profile.street)
        .bind(&registration.profile.number)
        .bind(&registration.profile.complement)
        .bind(&registration.profile.city)
        .bind(&registration.profile.state)
        .bind(&registration.payment_provider)
        .bind(&registration.charge.payment_ref)
        .bind(&registration.charge.display_code)
        .bind(&registration.charge.qr_image_url)
        .bind(registration.sleep_at_monastery)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The unique index on LOWER(email) resolves the duplicate race.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return RegistrationError::DuplicateEmail;
                }
            }
            RegistrationError::Database(format!("Failed to insert registration: {e}"))
        })?;

        Ok(())
    }

    async fn update(&self, email: &str, registration: &NewRegistration) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE registrations
            SET name = $2,
                phone = $3,
                postal_code = $4,
                street = $5,
                number = $6,
                complement = $7,
                city = $8,
                state = $9,
                status = 'PENDING',
                payment_provider = $10,
                payment_ref = $11,
                payment_code = $12,
                qr_code_url = $13,
                sleep_at_monastery = $14,
                created_at = NOW(),
                paid_at = NULL
            WHERE LOWER(email) = LOWER($1)
            ",
        )
        .bind(email)
        .bind(&registration.profile.name)
        .bind(&registration.profile.phone)
        .bind(&registration.profile.postal_code)
        .bind(&registration.profile.street)
        .bind(&registration.profile.number)
        .bind(&registration.profile.complement)
        .bind(&registration.profile.city)
        .bind(&registration.profile.state)
        .bind(&registration.payment_provider)
        .bind(&registration.charge.payment_ref)
        .bind(&registration.charge.display_code)
        .bind(&registration.charge.qr_image_url)
        .bind(registration.sleep_at_monastery)
        .execute(&self.pool)
        .await
        .map_err(|e| RegistrationError::Database(format!("Failed to update registration: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(RegistrationError::RegistrationNotFound);
        }

        Ok(())
    }

    async fn set_payment_ref(
        &self,
        email: &str,
        provider: &str,
        charge: &crate::state::Charge,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE registrations
            SET payment_provider = $2,
                payment_ref = $3,
                payment_code = $4,
                qr_code_url = $5
            WHERE LOWER(email) = LOWER($1)
            ",
        )
        .bind(email)
        .bind(provider)
        .bind(&charge.payment_ref)
        .bind(&charge.display_code)
        .bind(&charge.qr_image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| RegistrationError::Database(format!("Failed to set payment ref: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(RegistrationError::RegistrationNotFound);
        }

        Ok(())
    }

    async fn mark_paid(&self, email: &str, payment_ref: &str) -> Result<bool> {
        // Conditional update: the ref-equality guard makes a webhook for a
        // superseded charge a silent no-op instead of marking the newer
        // charge as paid.
        let result = sqlx::query(
            r"
            UPDATE registrations
            SET status = 'PAID',
                paid_at = NOW()
            WHERE LOWER(email) = LOWER($1)
              AND payment_ref = $2
              AND status = 'PENDING'
            ",
        )
        .bind(email)
        .bind(payment_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RegistrationError::Database(format!("Failed to mark registration paid: {e}"))
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn sweep_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE registrations
            SET status = 'CANCELED'
            WHERE status = 'PENDING'
              AND created_at < $1
            ",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RegistrationError::Database(format!("Failed to sweep expired registrations: {e}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn count_active(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE status IN ('PENDING', 'PAID')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            RegistrationError::Database(format!("Failed to count active registrations: {e}"))
        })
    }

    async fn count_active_sleepers(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM registrations
            WHERE status IN ('PENDING', 'PAID')
              AND sleep_at_monastery = TRUE
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RegistrationError::Database(format!("Failed to count sleepers: {e}")))
    }
}
