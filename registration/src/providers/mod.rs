//! Payment providers.
//!
//! The workflow depends on the `PaymentProvider` trait, never on a concrete
//! PIX service; the runtime wires in OpenPix in production and the mock in
//! tests. The contract is deliberately narrow: issue one charge, report one
//! name. Charge creation is single-shot with no retry, since retrying a
//! failed creation risks issuing duplicate charges.

pub mod openpix;
pub mod payment;

pub use openpix::OpenPixProvider;
pub use payment::PaymentProvider;

// The `Charge` data model lives with the rest of the domain state.
pub use crate::state::Charge;
