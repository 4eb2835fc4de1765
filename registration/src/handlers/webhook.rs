//! Inbound PIX webhook endpoint.
//!
//! The provider calls this endpoint when a charge changes state. The shared
//! secret is checked in constant time before any registration state is read;
//! an invalid or missing token is a 401 regardless of payload.

use super::{RegistrationApi, into_app_error};
use crate::providers::PaymentProvider;
use crate::stores::RegistrationStore;
use crate::workflow::WebhookOutcome;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use constant_time_eq::constant_time_eq;
use romaria_web::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Header carrying the shared webhook secret.
pub const WEBHOOK_AUTH_HEADER: &str = "x-webhook-token";

/// Webhook payload.
///
/// The provider sends its charge correlation ID plus the new charge status;
/// extra fields in the payload are ignored.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    /// Provider charge reference.
    #[serde(alias = "correlationID")]
    pub payment_ref: String,
    /// Reported charge status.
    pub status: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Registration status after reconciliation.
    pub status: String,
}

/// `POST /webhooks/pix` - reconcile a provider payment notification.
///
/// Always returns 200 once the notification is reconciled, including
/// redeliveries and superseded references, so the provider stops retrying.
pub async fn pix_webhook<S, P>(
    State(api): State<Arc<RegistrationApi<S, P>>>,
    headers: HeaderMap,
    Json(body): Json<WebhookBody>,
) -> Result<Json<WebhookResponse>, AppError>
where
    S: RegistrationStore,
    P: PaymentProvider,
{
    authorize(&headers, api.webhook.secret.as_bytes())?;

    let outcome = api
        .workflow
        .reconcile_webhook(&body.payment_ref, &body.status)
        .await
        .map_err(into_app_error)?;

    if let WebhookOutcome::Superseded { status } = &outcome {
        tracing::warn!(
            payment_ref = %body.payment_ref,
            %status,
            "webhook for superseded charge acknowledged without effect"
        );
    }

    Ok(Json(WebhookResponse {
        status: outcome.status().to_string(),
    }))
}

/// Constant-time check of the shared-secret header.
fn authorize(headers: &HeaderMap, secret: &[u8]) -> Result<(), AppError> {
    let token = headers
        .get(WEBHOOK_AUTH_HEADER)
        .map(axum::http::HeaderValue::as_bytes)
        .unwrap_or_default();

    if constant_time_eq(token, secret) {
        Ok(())
    } else {
        tracing::warn!("webhook rejected: invalid token");
        Err(AppError::unauthorized("Invalid webhook token"))
    }
}
