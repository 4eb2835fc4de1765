//! Payment provider trait.

use crate::error::Result;
use crate::state::Charge;
use std::future::Future;

/// PIX charge-issuing service.
///
/// This trait abstracts over the external payment provider. Implementations
/// make a single attempt per call; failures surface as
/// `RegistrationError::Provider` and are never retried inside the request.
pub trait PaymentProvider: Send + Sync {
    /// Provider name recorded on the registration row
    /// (e.g. `"openpix"`, `"mock"`).
    fn name(&self) -> &str;

    /// Create a PIX charge for an attendee.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The provider API call fails → `RegistrationError::Provider`
    fn create_charge(
        &self,
        name: &str,
        email: &str,
    ) -> impl Future<Output = Result<Charge>> + Send;
}
