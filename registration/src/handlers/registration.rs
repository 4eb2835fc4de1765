//! Registration endpoints: register, status and charge reissue.

use super::{RegistrationApi, into_app_error};
use crate::providers::PaymentProvider;
use crate::state::AttendeeProfile;
use crate::stores::RegistrationStore;
use crate::workflow::{ChargeReceipt, RegisterRequest, StatusView};
use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use romaria_web::{AppError, CorrelationId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Register request body.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    /// Attendee email.
    pub email: String,
    /// Attendee full name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Postal code.
    pub postal_code: String,
    /// Street name.
    pub street: String,
    /// Street number.
    pub number: String,
    /// Address complement.
    #[serde(default)]
    pub complement: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// On-site sleeping slot requested.
    #[serde(default)]
    pub sleep_at_monastery: bool,
}

impl RegisterBody {
    fn into_request(self) -> RegisterRequest {
        RegisterRequest {
            email: self.email,
            profile: AttendeeProfile {
                name: self.name,
                phone: self.phone,
                postal_code: self.postal_code,
                street: self.street,
                number: self.number,
                complement: self.complement,
                city: self.city,
                state: self.state,
            },
            sleep_at_monastery: self.sleep_at_monastery,
        }
    }
}

/// Charge presentation payload returned by register and reissue.
#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    /// Registration status after the operation (always `PENDING`).
    pub status: String,
    /// Provider correlation reference.
    pub payment_ref: String,
    /// Copy-and-paste PIX code.
    pub display_code: String,
    /// QR code image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_image_url: Option<String>,
    /// Charge expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ChargeReceipt> for ChargeResponse {
    fn from(receipt: ChargeReceipt) -> Self {
        Self {
            status: receipt.status.to_string(),
            payment_ref: receipt.payment_ref,
            display_code: receipt.display_code,
            qr_image_url: receipt.qr_image_url,
            expires_at: receipt.expires_at,
        }
    }
}

/// Query parameters for the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Email to look up.
    pub email: String,
}

/// Status response.
///
/// `exists: false` carries no further fields; a found registration reports
/// its lifecycle state plus, while PENDING, the stored payment code.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Whether a registration exists for the email.
    pub exists: bool,
    /// Normalized email of the found registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Attendee name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Sleep flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_at_monastery: Option<bool>,
    /// Start of the current registration cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Payment confirmation time, once PAID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// Stored payment code, while PENDING.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_code: Option<String>,
    /// Stored QR image URL, while PENDING.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_image_url: Option<String>,
}

impl StatusResponse {
    const NOT_FOUND: Self = Self {
        exists: false,
        email: None,
        name: None,
        status: None,
        sleep_at_monastery: None,
        created_at: None,
        paid_at: None,
        display_code: None,
        qr_image_url: None,
    };

    fn found(view: StatusView) -> Self {
        Self {
            exists: true,
            email: Some(view.email),
            name: Some(view.name),
            status: Some(view.status.to_string()),
            sleep_at_monastery: Some(view.sleep_at_monastery),
            created_at: Some(view.created_at),
            paid_at: view.paid_at,
            display_code: view.display_code,
            qr_image_url: view.qr_image_url,
        }
    }
}

/// Reissue request body.
#[derive(Debug, Deserialize)]
pub struct ReissueBody {
    /// Email of the PENDING registration.
    pub email: String,
}

/// `POST /registrations` - register an attendee and issue a PIX charge.
pub async fn register<S, P>(
    State(api): State<Arc<RegistrationApi<S, P>>>,
    correlation_id: CorrelationId,
    Json(body): Json<RegisterBody>,
) -> Result<Json<ChargeResponse>, AppError>
where
    S: RegistrationStore,
    P: PaymentProvider,
{
    tracing::debug!(correlation_id = %correlation_id.0, "register request");

    let receipt = api
        .workflow
        .register(body.into_request())
        .await
        .map_err(into_app_error)?;

    Ok(Json(receipt.into()))
}

/// `GET /registrations/status?email=...` - report registration state.
pub async fn check_status<S, P>(
    State(api): State<Arc<RegistrationApi<S, P>>>,
    correlation_id: CorrelationId,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, AppError>
where
    S: RegistrationStore,
    P: PaymentProvider,
{
    tracing::debug!(correlation_id = %correlation_id.0, "status request");

    let view = api
        .workflow
        .check_status(&query.email)
        .await
        .map_err(into_app_error)?;

    Ok(Json(
        view.map_or(StatusResponse::NOT_FOUND, StatusResponse::found),
    ))
}

/// `POST /registrations/reissue` - issue a fresh charge for a PENDING
/// registration.
pub async fn reissue<S, P>(
    State(api): State<Arc<RegistrationApi<S, P>>>,
    correlation_id: CorrelationId,
    Json(body): Json<ReissueBody>,
) -> Result<Json<ChargeResponse>, AppError>
where
    S: RegistrationStore,
    P: PaymentProvider,
{
    tracing::debug!(correlation_id = %correlation_id.0, "reissue request");

    let receipt = api
        .workflow
        .reissue(&body.email)
        .await
        .map_err(into_app_error)?;

    Ok(Json(receipt.into()))
}
