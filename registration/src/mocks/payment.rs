//! Mock payment provider for testing.

use crate::error::{RegistrationError, Result};
use crate::providers::PaymentProvider;
use crate::state::Charge;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Mock PIX provider.
///
/// Issues deterministic charges (`PIX-1`, `PIX-2`, ...) and can be scripted
/// to fail, to exercise the single-shot no-retry contract.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentProvider {
    counter: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
}

impl MockPaymentProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_charge` call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of charges issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl PaymentProvider for MockPaymentProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_charge(&self, _name: &str, _email: &str) -> Result<Charge> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RegistrationError::Provider(
                "mock provider set to fail".to_string(),
            ));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(Charge {
            payment_ref: format!("PIX-{n}"),
            display_code: format!("00020126-mock-{n}"),
            qr_image_url: Some(format!("https://example.test/qr/{n}.png")),
            expires_at: None,
        })
    }
}
