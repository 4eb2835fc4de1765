//! In-memory mocks for testing.
//!
//! Deterministic stand-ins for the store and the payment provider so the
//! workflow state machine can be exercised at memory speed.

mod payment;
mod registration;

pub use payment::MockPaymentProvider;
pub use registration::MockRegistrationStore;
