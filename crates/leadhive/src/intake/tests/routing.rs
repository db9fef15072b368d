use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use super::common::{build_service, submission};
use crate::intake::router::intake_router;

fn post_request(body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/leads")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn post_lead_returns_created_receipt() {
    let (service, _, _) = build_service();
    let router = intake_router(service);

    let response = router
        .oneshot(post_request(&submission()))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = json_body(response).await;
    assert_eq!(payload.get("success"), Some(&Value::Bool(true)));

    let data = payload.get("data").expect("data");
    assert_eq!(
        data.get("providers_notified").and_then(Value::as_u64),
        Some(2)
    );
    assert_eq!(
        data.get("zone_name").and_then(Value::as_str),
        Some("Oslo")
    );
    assert_eq!(
        data.get("country_name").and_then(Value::as_str),
        Some("Norway")
    );
    assert!(data
        .get("lead")
        .and_then(|lead| lead.get("id"))
        .is_some());
    assert!(payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("2 providers notified"));
}

#[tokio::test]
async fn post_lead_with_unknown_postal_code_is_unprocessable() {
    let (service, store, _) = build_service();
    let router = intake_router(service);

    let mut request = submission();
    request.postal_code = "9999".to_string();
    let response = router
        .oneshot(post_request(&request))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = json_body(response).await;
    assert_eq!(payload.get("success"), Some(&Value::Bool(false)));
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("9999"));
    assert_eq!(store.lead_count(), 0);
}

#[tokio::test]
async fn post_lead_with_blank_phone_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = intake_router(service);

    let mut request = submission();
    request.phone = String::new();
    let response = router
        .oneshot(post_request(&request))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("phone"));
}

#[tokio::test]
async fn get_lead_returns_status_view() {
    let (service, _, _) = build_service();
    let receipt = service.submit(submission()).await.expect("intake");
    let router = intake_router(service);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/v1/leads/{}", receipt.lead.id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload.get("status").and_then(Value::as_str), Some("sent"));
    assert_eq!(
        payload.get("providers_notified").and_then(Value::as_u64),
        Some(2)
    );
    assert_eq!(
        payload.get("zone_name").and_then(Value::as_str),
        Some("Oslo")
    );
}

#[tokio::test]
async fn get_unknown_lead_is_not_found() {
    let (service, _, _) = build_service();
    let router = intake_router(service);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/leads/lead-missing")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = json_body(response).await;
    assert_eq!(payload.get("success"), Some(&Value::Bool(false)));
}
