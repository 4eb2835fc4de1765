//! HTTP router assembly.

use crate::handlers::{RegistrationApi, registration, webhook};
use crate::providers::PaymentProvider;
use crate::stores::RegistrationStore;
use axum::Router;
use axum::routing::{get, post};
use romaria_web::correlation_id_layer;
use std::sync::Arc;

/// Build the registration router.
///
/// Routes:
/// - `POST /registrations` - register and issue a PIX charge
/// - `GET /registrations/status` - report registration state
/// - `POST /registrations/reissue` - fresh charge for a PENDING row
/// - `POST /webhooks/pix` - provider payment notifications
pub fn registration_router<S, P>(api: Arc<RegistrationApi<S, P>>) -> Router
where
    S: RegistrationStore + 'static,
    P: PaymentProvider + 'static,
{
    Router::new()
        .route("/registrations", post(registration::register::<S, P>))
        .route(
            "/registrations/status",
            get(registration::check_status::<S, P>),
        )
        .route(
            "/registrations/reissue",
            post(registration::reissue::<S, P>),
        )
        .route("/webhooks/pix", post(webhook::pix_webhook::<S, P>))
        .layer(correlation_id_layer())
        .with_state(api)
}
