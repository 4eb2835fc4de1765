//! OpenPix charge API provider.

use crate::config::OpenPixConfig;
use crate::error::{RegistrationError, Result};
use crate::providers::PaymentProvider;
use crate::state::Charge;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OpenPix PIX provider.
///
/// Implements the `PaymentProvider` trait against the OpenPix charge API.
/// The correlation ID we generate for each charge becomes the registration's
/// `payment_ref`, and OpenPix echoes it back in webhooks.
///
/// # Example
///
/// ```no_run
/// use romaria_registration::config::OpenPixConfig;
/// use romaria_registration::providers::OpenPixProvider;
///
/// let provider = OpenPixProvider::new(OpenPixConfig::new(
///     "https://api.openpix.com.br".to_string(),
///     std::env::var("OPENPIX_API_KEY").unwrap_or_default(),
///     15_000,
/// ));
/// ```
#[derive(Clone, Debug)]
pub struct OpenPixProvider {
    config: OpenPixConfig,
    http_client: Client,
}

impl OpenPixProvider {
    /// Create a new OpenPix provider.
    #[must_use]
    pub fn new(config: OpenPixConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    #[serde(rename = "correlationID")]
    correlation_id: &'a str,
    value: i64,
    comment: &'a str,
    #[serde(rename = "expiresIn")]
    expires_in: i64,
    customer: CustomerPayload<'a>,
}

#[derive(Debug, Serialize)]
struct CustomerPayload<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    charge: ChargeBody,
}

#[derive(Debug, Deserialize)]
struct ChargeBody {
    #[serde(rename = "brCode")]
    br_code: String,
    #[serde(rename = "qrCodeImage")]
    qr_code_image: Option<String>,
    #[serde(rename = "expiresDate")]
    expires_date: Option<DateTime<Utc>>,
}

impl PaymentProvider for OpenPixProvider {
    fn name(&self) -> &str {
        "openpix"
    }

    async fn create_charge(&self, name: &str, email: &str) -> Result<Charge> {
        let correlation_id = Uuid::new_v4().to_string();
        let url = format!("{}/api/v1/charge", self.config.base_url);

        let request = ChargeRequest {
            correlation_id: &correlation_id,
            value: self.config.charge_value,
            comment: "Inscrição romaria",
            expires_in: self.config.charge_expiry_seconds,
            customer: CustomerPayload { name, email },
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RegistrationError::Provider(format!("charge request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            // Body is logged for operators but never reaches the client.
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "OpenPix charge creation rejected");
            return Err(RegistrationError::Provider(format!(
                "charge creation returned {status}"
            )));
        }

        let parsed: ChargeResponse = response
            .json()
            .await
            .map_err(|e| RegistrationError::Provider(format!("malformed charge response: {e}")))?;

        tracing::debug!(payment_ref = %correlation_id, "OpenPix charge created");

        Ok(Charge {
            payment_ref: correlation_id,
            display_code: parsed.charge.br_code,
            qr_image_url: parsed.charge.qr_code_image,
            expires_at: parsed.charge.expires_date,
        })
    }
}
