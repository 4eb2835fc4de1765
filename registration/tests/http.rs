//! HTTP surface tests: router + handlers over the in-memory mocks.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use romaria_registration::mocks::{MockPaymentProvider, MockRegistrationStore};
use romaria_registration::{
    RegistrationApi, RegistrationConfig, RegistrationWorkflow, WebhookConfig, registration_router,
};
use std::sync::Arc;
use tower::ServiceExt;

const WEBHOOK_SECRET: &str = "test-webhook-secret";

fn test_app() -> Router {
    let workflow = RegistrationWorkflow::new(
        MockRegistrationStore::new(),
        MockPaymentProvider::new(),
        RegistrationConfig::default(),
    );
    let api = RegistrationApi::new(workflow, WebhookConfig::new(WEBHOOK_SECRET.to_string()));
    registration_router(Arc::new(api))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "name": "Ana Silva",
        "phone": "+55 11 91234-5678",
        "postal_code": "01310-100",
        "street": "Av. Paulista",
        "number": "1000",
        "city": "Sao Paulo",
        "state": "SP",
        "sleep_at_monastery": false
    })
}

#[tokio::test]
async fn register_returns_pending_charge() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("ana@x.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["payment_ref"], "PIX-1");
    assert!(body["display_code"].as_str().is_some());
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("not-an-email"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_email");
}

#[tokio::test]
async fn status_reports_absent_then_pending() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/registrations/status?email=ana%40x.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "exists": false }));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("ana@x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/registrations/status?email=ana%40x.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["exists"], true);
    assert_eq!(body["status"], "PENDING");
    assert!(body["display_code"].as_str().is_some());
}

#[tokio::test]
async fn webhook_requires_the_shared_secret() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/webhooks/pix",
            serde_json::json!({ "correlationID": "PIX-1", "status": "COMPLETED" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn webhook_flips_registration_to_paid() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("ana@x.com"),
        ))
        .await
        .unwrap();
    let payment_ref = body_json(response).await["payment_ref"]
        .as_str()
        .unwrap()
        .to_string();

    let mut request = json_request(
        "POST",
        "/webhooks/pix",
        serde_json::json!({ "correlationID": payment_ref, "status": "COMPLETED" }),
    );
    request
        .headers_mut()
        .insert("x-webhook-token", WEBHOOK_SECRET.parse().unwrap());

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "PAID");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/registrations/status?email=ana%40x.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "PAID");
    assert!(body["paid_at"].as_str().is_some());
}

#[tokio::test]
async fn webhook_for_unknown_reference_is_not_found() {
    let app = test_app();

    let mut request = json_request(
        "POST",
        "/webhooks/pix",
        serde_json::json!({ "correlationID": "PIX-unknown", "status": "COMPLETED" }),
    );
    request
        .headers_mut()
        .insert("x-webhook-token", WEBHOOK_SECRET.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "registration_not_found");
}

#[tokio::test]
async fn webhook_rejects_non_payment_status() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("ana@x.com"),
        ))
        .await
        .unwrap();
    let payment_ref = body_json(response).await["payment_ref"]
        .as_str()
        .unwrap()
        .to_string();

    let mut request = json_request(
        "POST",
        "/webhooks/pix",
        serde_json::json!({ "correlationID": payment_ref, "status": "EXPIRED" }),
    );
    request
        .headers_mut()
        .insert("x-webhook-token", WEBHOOK_SECRET.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "unsupported_status");
}

#[tokio::test]
async fn conflict_responses_carry_the_current_status() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("ana@x.com"),
        ))
        .await
        .unwrap();
    let payment_ref = body_json(response).await["payment_ref"]
        .as_str()
        .unwrap()
        .to_string();

    let mut request = json_request(
        "POST",
        "/webhooks/pix",
        serde_json::json!({ "correlationID": payment_ref, "status": "PAID" }),
    );
    request
        .headers_mut()
        .insert("x-webhook-token", WEBHOOK_SECRET.parse().unwrap());
    app.clone().oneshot(request).await.unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/registrations",
            register_body("ana@x.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "registration_exists");
    assert_eq!(body["status"], "PAID");
}
