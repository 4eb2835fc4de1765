//! Capacity accounting.
//!
//! Decides whether a registration is admissible under the fixed caps. Counts
//! are always taken after an expiry sweep so stale PENDING rows do not hold
//! phantom capacity. On resubmission the caller's own PENDING reservation is
//! excluded from the counts first: a user is never blocked by their own slot.

use crate::config::RegistrationConfig;
use crate::state::{Registration, RegistrationStatus};

/// Snapshot of live capacity against the configured caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Active (PENDING or PAID) registrations, after self-exclusion.
    pub total: i64,
    /// Active registrations with the sleep flag, after self-exclusion.
    pub sleepers: i64,
    /// No attendee slots left.
    pub total_full: bool,
    /// No monastery sleeping slots left.
    pub monastery_full: bool,
}

impl Availability {
    /// Compare live counts against the configured caps.
    #[must_use]
    pub const fn evaluate(total: i64, sleepers: i64, config: &RegistrationConfig) -> Self {
        Self {
            total,
            sleepers,
            total_full: total >= config.max_total,
            monastery_full: sleepers >= config.max_sleep,
        }
    }
}

/// Subtract the caller's own reservation from the live counts.
///
/// Applies only when the caller's existing row is PENDING: a CANCELED row
/// already does not count, and a PAID row is a conflict upstream, never a
/// capacity question.
#[must_use]
pub fn self_excluded_counts(
    mut total: i64,
    mut sleepers: i64,
    existing: Option<&Registration>,
) -> (i64, i64) {
    if let Some(row) = existing {
        if row.status == RegistrationStatus::Pending {
            total -= 1;
            if row.sleep_at_monastery {
                sleepers -= 1;
            }
        }
    }
    (total, sleepers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AttendeeProfile;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(status: RegistrationStatus, sleeps: bool) -> Registration {
        Registration {
            id: Uuid::new_v4(),
            email: "ana@x.com".to_string(),
            profile: AttendeeProfile {
                name: "Ana".to_string(),
                phone: "11 99999-0000".to_string(),
                postal_code: "01310-100".to_string(),
                street: "Av. Paulista".to_string(),
                number: "1000".to_string(),
                complement: None,
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
            status,
            payment_provider: "mock".to_string(),
            payment_ref: "ref-1".to_string(),
            payment_code: "code-1".to_string(),
            qr_code_url: None,
            sleep_at_monastery: sleeps,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    #[test]
    fn full_when_counts_reach_caps() {
        let config = RegistrationConfig::new().with_max_total(2).with_max_sleep(1);

        let open = Availability::evaluate(1, 0, &config);
        assert!(!open.total_full);
        assert!(!open.monastery_full);

        let full = Availability::evaluate(2, 1, &config);
        assert!(full.total_full);
        assert!(full.monastery_full);
    }

    #[test]
    fn pending_caller_is_excluded() {
        let existing = row(RegistrationStatus::Pending, true);
        let (total, sleepers) = self_excluded_counts(5, 3, Some(&existing));
        assert_eq!((total, sleepers), (4, 2));
    }

    #[test]
    fn pending_non_sleeper_only_frees_total() {
        let existing = row(RegistrationStatus::Pending, false);
        let (total, sleepers) = self_excluded_counts(5, 3, Some(&existing));
        assert_eq!((total, sleepers), (4, 3));
    }

    #[test]
    fn canceled_and_paid_rows_are_not_excluded() {
        let canceled = row(RegistrationStatus::Canceled, true);
        assert_eq!(self_excluded_counts(5, 3, Some(&canceled)), (5, 3));

        let paid = row(RegistrationStatus::Paid, true);
        assert_eq!(self_excluded_counts(5, 3, Some(&paid)), (5, 3));
    }

    #[test]
    fn no_existing_row_leaves_counts_unchanged() {
        assert_eq!(self_excluded_counts(5, 3, None), (5, 3));
    }
}
