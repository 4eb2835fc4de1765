//! Axum handlers for the registration HTTP surface.
//!
//! Handlers are thin: parse the request, call the workflow, map the typed
//! outcome to the wire shape. The error mapping below is the single place
//! where the domain taxonomy becomes HTTP status codes and stable error
//! codes.

use crate::config::WebhookConfig;
use crate::error::RegistrationError;
use crate::workflow::RegistrationWorkflow;
use romaria_web::AppError;

pub mod registration;
pub mod webhook;

/// Shared state for the registration routes.
#[derive(Debug, Clone)]
pub struct RegistrationApi<S, P> {
    /// The workflow state machine.
    pub workflow: RegistrationWorkflow<S, P>,
    /// Webhook endpoint configuration.
    pub webhook: WebhookConfig,
}

impl<S, P> RegistrationApi<S, P> {
    /// Bundle a workflow and webhook configuration into route state.
    pub const fn new(workflow: RegistrationWorkflow<S, P>, webhook: WebhookConfig) -> Self {
        Self { workflow, webhook }
    }
}

/// Map a domain error to its HTTP representation.
///
/// Conflicts carry the current registration status so clients can recover;
/// provider and storage failures become generic 500s with the detail kept
/// server-side.
pub(crate) fn into_app_error(err: RegistrationError) -> AppError {
    match err {
        RegistrationError::InvalidEmail => {
            AppError::bad_request("invalid_email", "Invalid email address")
        }
        RegistrationError::RegistrationsFull => {
            AppError::conflict("registrations_full", "All attendee slots are taken")
        }
        RegistrationError::MonasteryFull => AppError::conflict(
            "monastery_full",
            "All monastery sleeping slots are taken",
        ),
        RegistrationError::RegistrationExists { status } => AppError::conflict(
            "registration_exists",
            "A registration already exists for this email",
        )
        .with_extra(serde_json::json!({ "status": status })),
        RegistrationError::DuplicateEmail => AppError::conflict(
            "registration_exists",
            "A registration already exists for this email",
        ),
        RegistrationError::RegistrationNotPending { status } => AppError::conflict(
            "registration_not_pending",
            "Registration is not awaiting payment",
        )
        .with_extra(serde_json::json!({ "status": status })),
        RegistrationError::RegistrationNotFound => {
            AppError::not_found("registration_not_found", "Registration not found")
        }
        RegistrationError::UnsupportedWebhookStatus { .. } => {
            AppError::bad_request("unsupported_status", "Unsupported charge status")
        }
        err @ (RegistrationError::Provider(_) | RegistrationError::Database(_)) => {
            AppError::internal().with_source(anyhow::Error::new(err))
        }
    }
}
