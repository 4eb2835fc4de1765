//! Axum plumbing for the Romaria registration service.
//!
//! This crate holds the framework-level pieces shared by any HTTP surface in
//! the workspace: the domain-error → HTTP-response bridge (`AppError`), the
//! request extractors (`CorrelationId`, `ClientIp`) and the correlation-ID
//! middleware. Business logic lives in `romaria-registration`; nothing here
//! knows about registrations or payments.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ClientIp, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
