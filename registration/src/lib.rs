//! # Romaria Registration
//!
//! Event registration with PIX payment reconciliation.
//!
//! ## Features
//!
//! - **Capacity-capped**: hard caps on attendees and monastery sleepers
//! - **PIX-native**: one charge per registration, reissuable while PENDING
//! - **Webhook-reconciled**: payment confirmation arrives from the provider
//! - **Self-healing**: expired PENDING rows are swept lazily, freeing slots
//! - **Testable**: store and provider are traits with in-memory mocks
//!
//! ## Lifecycle
//!
//! ```text
//! (none) ──register──▶ PENDING ──webhook paid──▶ PAID
//!                        │  ▲
//!                        │  └─register / reissue (new charge)
//!                        └──age > 24h──▶ CANCELED ──register──▶ PENDING
//! ```
//!
//! ## Example: in-memory wiring
//!
//! ```rust,ignore
//! use romaria_registration::*;
//!
//! let workflow = RegistrationWorkflow::new(
//!     MockRegistrationStore::new(),
//!     MockPaymentProvider::new(),
//!     RegistrationConfig::default(),
//! );
//! let api = Arc::new(RegistrationApi::new(workflow, webhook_config));
//! let app = registration_router(api);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod capacity;
pub mod config;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod router;
pub mod state;
pub mod stores;
pub mod utils;
pub mod workflow;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{OpenPixConfig, RegistrationConfig, WebhookConfig};
pub use error::{RegistrationError, Result};
pub use handlers::RegistrationApi;
pub use router::registration_router;
pub use state::{AttendeeProfile, Charge, Registration, RegistrationStatus};
pub use workflow::{
    ChargeReceipt, RegisterRequest, RegistrationWorkflow, StatusView, WebhookOutcome,
};

#[cfg(any(test, feature = "test-utils"))]
pub use mocks::{MockPaymentProvider, MockRegistrationStore};
