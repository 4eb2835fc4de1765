//! Registration workflow state machine.
//!
//! Orchestrates the registration lifecycle against the store, capacity
//! accounting and the payment provider:
//!
//! ```text
//! (none) ──register──▶ PENDING ──webhook paid──▶ PAID
//!                        │  ▲
//!                        │  └─register / reissue (new charge, same row)
//!                        └──age > TTL (lazy sweep)──▶ CANCELED ──register──▶ PENDING
//! ```
//!
//! Every entry point sweeps expired PENDING rows first, so stale
//! registrations never hold phantom capacity. The two races that matter are
//! resolved in storage, not by locks: duplicate registration loses on the
//! unique email constraint and is converted to a conflict, and `mark_paid`
//! is a conditional update keyed on the exact payment reference.

use crate::capacity::{Availability, self_excluded_counts};
use crate::config::RegistrationConfig;
use crate::error::{RegistrationError, Result};
use crate::providers::PaymentProvider;
use crate::state::{AttendeeProfile, Charge, RegistrationStatus};
use crate::stores::{NewRegistration, RegistrationStore};
use crate::utils::{is_valid_email, normalize_email};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Typed register request (no dynamic payloads reach the workflow).
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Attendee email; normalized and validated here.
    pub email: String,
    /// Attendee profile.
    pub profile: AttendeeProfile,
    /// On-site sleeping slot requested.
    pub sleep_at_monastery: bool,
}

/// Result of `register` and `reissue`: what the UI needs to present the
/// PIX charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    /// Status after the operation (always PENDING).
    pub status: RegistrationStatus,
    /// Provider correlation reference of the charge.
    pub payment_ref: String,
    /// Copy-and-paste payment code.
    pub display_code: String,
    /// QR code image URL, when available.
    pub qr_image_url: Option<String>,
    /// Charge expiry, when reported by the provider.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ChargeReceipt {
    fn from_charge(charge: Charge) -> Self {
        Self {
            status: RegistrationStatus::Pending,
            payment_ref: charge.payment_ref,
            display_code: charge.display_code,
            qr_image_url: charge.qr_image_url,
            expires_at: charge.expires_at,
        }
    }
}

/// Current state of a registration, as reported by `check_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Normalized email.
    pub email: String,
    /// Attendee name.
    pub name: String,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// Sleep flag.
    pub sleep_at_monastery: bool,
    /// Row creation time (of the current PENDING cycle).
    pub created_at: DateTime<Utc>,
    /// Payment confirmation time, if PAID.
    pub paid_at: Option<DateTime<Utc>>,
    /// Stored display code; present only while PENDING.
    pub display_code: Option<String>,
    /// Stored QR image URL; present only while PENDING.
    pub qr_image_url: Option<String>,
}

/// Outcome of webhook reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The row was flipped to PAID by this webhook.
    MarkedPaid,
    /// The row was already PAID (redelivered webhook); nothing changed.
    AlreadyPaid,
    /// The conditional update did not match: the reference was superseded
    /// (or the row expired) between lookup and write. Nothing changed.
    Superseded {
        /// Status the row ended up with.
        status: RegistrationStatus,
    },
}

impl WebhookOutcome {
    /// Status of the row after reconciliation.
    #[must_use]
    pub const fn status(&self) -> RegistrationStatus {
        match self {
            Self::MarkedPaid | Self::AlreadyPaid => RegistrationStatus::Paid,
            Self::Superseded { status } => *status,
        }
    }
}

/// The registration workflow.
///
/// Stateless per request: all registration state lives in the store, so any
/// number of instances (or concurrent requests) can run without
/// coordination.
#[derive(Debug, Clone)]
pub struct RegistrationWorkflow<S, P> {
    store: S,
    payments: P,
    config: RegistrationConfig,
}

impl<S, P> RegistrationWorkflow<S, P>
where
    S: RegistrationStore,
    P: PaymentProvider,
{
    /// Create a workflow over a store and a payment provider.
    pub const fn new(store: S, payments: P, config: RegistrationConfig) -> Self {
        Self {
            store,
            payments,
            config,
        }
    }

    /// Lazily cancel PENDING rows older than the configured TTL.
    async fn sweep(&self) -> Result<()> {
        let cutoff = Utc::now() - self.config.pending_ttl;
        let swept = self.store.sweep_expired_pending(cutoff).await?;
        if swept > 0 {
            tracing::info!(swept, "expired pending registrations canceled");
        }
        Ok(())
    }

    /// Register a new attendee, or resubmit an existing PENDING/CANCELED
    /// registration (fresh charge, same row, PIX clock restarted).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The email is malformed → `InvalidEmail`
    /// - An existing row is already PAID → `RegistrationExists`
    /// - Capacity is exhausted → `RegistrationsFull` / `MonasteryFull`
    /// - Charge creation or storage fails → `Provider` / `Database`
    pub async fn register(&self, request: RegisterRequest) -> Result<ChargeReceipt> {
        let email = normalize_email(&request.email);
        if !is_valid_email(&email) {
            return Err(RegistrationError::InvalidEmail);
        }

        self.sweep().await?;

        let existing = self.store.find_by_email(&email).await?;

        // A paid registration is a conflict, never a capacity question.
        if let Some(row) = &existing {
            if row.status == RegistrationStatus::Paid {
                return Err(RegistrationError::RegistrationExists {
                    status: RegistrationStatus::Paid,
                });
            }
        }

        let total = self.store.count_active().await?;
        let sleepers = self.store.count_active_sleepers().await?;
        let (total, sleepers) = self_excluded_counts(total, sleepers, existing.as_ref());
        let availability = Availability::evaluate(total, sleepers, &self.config);

        if availability.total_full {
            tracing::debug!(email = %email, total, "registration rejected: capacity full");
            return Err(RegistrationError::RegistrationsFull);
        }
        if request.sleep_at_monastery && availability.monastery_full {
            tracing::debug!(email = %email, sleepers, "registration rejected: monastery full");
            return Err(RegistrationError::MonasteryFull);
        }

        let charge = self
            .payments
            .create_charge(&request.profile.name, &email)
            .await?;

        let record = NewRegistration {
            id: Uuid::new_v4(),
            email: email.clone(),
            profile: request.profile,
            sleep_at_monastery: request.sleep_at_monastery,
            payment_provider: self.payments.name().to_string(),
            charge: charge.clone(),
        };

        if existing.is_some() {
            self.store.update(&email, &record).await?;
            tracing::info!(email = %email, payment_ref = %charge.payment_ref, "registration resubmitted");
        } else if let Err(err) = self.store.insert(&record).await {
            if err == RegistrationError::DuplicateEmail {
                // Lost the duplicate-registration race: another request
                // inserted this email between our lookup and our write.
                let status = self
                    .store
                    .find_by_email(&email)
                    .await?
                    .map_or(RegistrationStatus::Pending, |row| row.status);
                tracing::debug!(email = %email, "concurrent registration won the insert");
                return Err(RegistrationError::RegistrationExists { status });
            }
            return Err(err);
        } else {
            tracing::info!(email = %email, payment_ref = %charge.payment_ref, "registration created");
        }

        Ok(ChargeReceipt::from_charge(charge))
    }

    /// Issue a brand-new charge for a still-PENDING registration; the old
    /// payment reference is superseded.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No row exists for the email → `RegistrationNotFound`
    /// - The row is not PENDING → `RegistrationNotPending`
    /// - Charge creation or storage fails → `Provider` / `Database`
    pub async fn reissue(&self, email: &str) -> Result<ChargeReceipt> {
        let email = normalize_email(email);

        self.sweep().await?;

        let row = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(RegistrationError::RegistrationNotFound)?;

        if row.status != RegistrationStatus::Pending {
            return Err(RegistrationError::RegistrationNotPending { status: row.status });
        }

        let charge = self
            .payments
            .create_charge(&row.profile.name, &email)
            .await?;

        self.store
            .set_payment_ref(&email, self.payments.name(), &charge)
            .await?;

        tracing::info!(
            email = %email,
            old_ref = %row.payment_ref,
            new_ref = %charge.payment_ref,
            "payment charge reissued"
        );

        Ok(ChargeReceipt::from_charge(charge))
    }

    /// Report the current state of a registration.
    ///
    /// Returns `None` when no row exists for the email. The stored display
    /// code is included only while the row is PENDING.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn check_status(&self, email: &str) -> Result<Option<StatusView>> {
        let email = normalize_email(email);

        self.sweep().await?;

        let Some(row) = self.store.find_by_email(&email).await? else {
            return Ok(None);
        };

        let pending = row.status == RegistrationStatus::Pending;
        Ok(Some(StatusView {
            email: row.email,
            name: row.profile.name,
            status: row.status,
            sleep_at_monastery: row.sleep_at_monastery,
            created_at: row.created_at,
            paid_at: row.paid_at,
            display_code: pending.then_some(row.payment_code),
            qr_image_url: if pending { row.qr_code_url } else { None },
        }))
    }

    /// Reconcile an inbound provider webhook against local state.
    ///
    /// Caller authentication happens before this is invoked. Redelivered
    /// webhooks are no-ops; a webhook for a superseded reference never flips
    /// the row, because `mark_paid` re-checks reference equality at write
    /// time.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No row carries this reference → `RegistrationNotFound`
    /// - The reported status is not a payment confirmation →
    ///   `UnsupportedWebhookStatus`
    /// - The store fails → `Database`
    pub async fn reconcile_webhook(
        &self,
        payment_ref: &str,
        reported_status: &str,
    ) -> Result<WebhookOutcome> {
        self.sweep().await?;

        let row = self
            .store
            .find_by_payment_ref(payment_ref)
            .await?
            .ok_or(RegistrationError::RegistrationNotFound)?;

        // Redelivery after the row is already PAID is success, not an error.
        if row.status == RegistrationStatus::Paid {
            return Ok(WebhookOutcome::AlreadyPaid);
        }

        if !reports_payment(reported_status) {
            return Err(RegistrationError::UnsupportedWebhookStatus {
                reported: reported_status.to_string(),
            });
        }

        if self.store.mark_paid(&row.email, payment_ref).await? {
            tracing::info!(
                email = %row.email,
                payment_ref = %payment_ref,
                "registration marked paid"
            );
            return Ok(WebhookOutcome::MarkedPaid);
        }

        // The conditional update missed: reference superseded or row expired
        // between our read and the write. Report the row as it stands now.
        let status = self
            .store
            .find_by_email(&row.email)
            .await?
            .map_or(RegistrationStatus::Canceled, |r| r.status);
        tracing::debug!(
            email = %row.email,
            payment_ref = %payment_ref,
            %status,
            "stale payment webhook ignored"
        );
        Ok(WebhookOutcome::Superseded { status })
    }
}

/// Provider status strings accepted as a payment confirmation.
fn reports_payment(status: &str) -> bool {
    matches!(
        status.to_ascii_uppercase().as_str(),
        "PAID" | "COMPLETED" | "CONFIRMED"
    )
}
