mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{REACTOR_ID, app, charge_request, send};
use donate_reactor::domain::payment::PaymentStatus;
use donate_reactor::infrastructure::charge_api::CHARGE_PATH;
use donate_reactor::infrastructure::sandbox::{SandboxProcessor, SandboxVault};
use rand::Rng;
use serde_json::json;

fn token() -> serde_json::Value {
    json!({ "id": "c06d0789-0a38-40be-b7cc-c28a718f76f1", "type": "card" })
}

#[tokio::test]
async fn test_amounts_in_range_are_charged() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);
    let mut rng = rand::thread_rng();

    let mut amounts: Vec<u32> = (0..20).map(|_| rng.gen_range(10..=5000)).collect();
    amounts.extend([10, 5000]);

    for amount in &amounts {
        let (response, body) =
            send(&app, charge_request(&json!({ "amount": amount, "token": token() }))).await;
        assert_eq!(response.status(), StatusCode::OK, "amount {amount}");
        assert_eq!(body["status"], "succeeded");
        assert_eq!(body["amount"], json!(i64::from(*amount) * 100));
        assert_eq!(body["currency"], "usd");
    }
    assert_eq!(processor.calls().len(), amounts.len());
}

#[tokio::test]
async fn test_amounts_out_of_range_never_reach_vendors() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);
    let mut rng = rand::thread_rng();

    let mut amounts: Vec<f64> = (0..10).map(|_| rng.gen_range(-1000.0..9.99)).collect();
    amounts.extend((0..10).map(|_| rng.gen_range(5000.01..1_000_000.0)));
    amounts.extend([9.99, 5000.01, 0.0, 1e30, -1e30]);

    for amount in amounts {
        let (response, body) =
            send(&app, charge_request(&json!({ "amount": amount, "token": token() }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {amount}");
        assert_eq!(body, json!({ "statusCode": 400, "message": "Invalid amount." }));
    }

    let (response, body) = send(&app, charge_request(&json!({ "token": token() }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid amount.");

    assert!(vault.calls().is_empty());
    assert!(processor.calls().is_empty());
}

#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);

    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let request = Request::builder()
            .method(method)
            .uri(CHARGE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(json!({ "amount": 50, "token": token() }).to_string()))
            .unwrap();
        let (response, body) = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(body, json!("Method Not Allowed"));
    }
    assert!(vault.calls().is_empty());
}

#[tokio::test]
async fn test_missing_token_gets_a_response() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);

    for body in [json!({ "amount": 50 }), json!({ "amount": 50, "token": null })] {
        let (response, body) = send(&app, charge_request(&body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "statusCode": 400, "message": "Missing token." }));
    }
    assert!(vault.calls().is_empty());
}

#[tokio::test]
async fn test_reactor_failure_short_circuits_charge() {
    let vault = SandboxVault::failing("boom");
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);

    let (response, body) =
        send(&app, charge_request(&json!({ "amount": 50, "token": token() }))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "statusCode": 500, "message": "boom" }));
    assert_eq!(vault.calls().len(), 1);
    assert!(processor.calls().is_empty());
}

#[tokio::test]
async fn test_charge_failure_without_message_is_unknown_error() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::failing("");
    let app = app(&vault, &processor);

    let (response, body) =
        send(&app, charge_request(&json!({ "amount": 50, "token": token() }))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "statusCode": 500, "message": "Unknown error" }));
    assert_eq!(processor.calls().len(), 1);
}

#[tokio::test]
async fn test_reactor_receives_token_expression() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);

    send(&app, charge_request(&json!({ "amount": 50, "token": token() }))).await;

    let calls = vault.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, REACTOR_ID);
    assert_eq!(
        calls[0].1["card"],
        "{{c06d0789-0a38-40be-b7cc-c28a718f76f1}}"
    );
}

/// Identical submissions are not deduplicated: each one creates its own
/// charge. Attaching an idempotency key by default would change this.
#[tokio::test]
async fn test_identical_submissions_create_independent_charges() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);
    let payload = json!({ "amount": 25, "token": token() });

    let (first_response, first) = send(&app, charge_request(&payload)).await;
    let (second_response, second) = send(&app, charge_request(&payload)).await;

    assert_eq!(first_response.status(), StatusCode::OK);
    assert_eq!(second_response.status(), StatusCode::OK);
    assert_ne!(first["id"], second["id"]);

    let calls = processor.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.idempotency_key.is_none()));
}

#[tokio::test]
async fn test_idempotency_key_header_is_forwarded() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::new();
    let app = app(&vault, &processor);

    let request = Request::builder()
        .method("POST")
        .uri(CHARGE_PATH)
        .header("content-type", "application/json")
        .header("Idempotency-Key", "donation-7")
        .body(Body::from(json!({ "amount": 25, "token": token() }).to_string()))
        .unwrap();
    let (response, _) = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        processor.calls()[0].idempotency_key.as_deref(),
        Some("donation-7")
    );
}

#[tokio::test]
async fn test_processor_status_is_returned_verbatim() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::with_status(PaymentStatus::RequiresAction);
    let app = app(&vault, &processor);

    let (response, body) =
        send(&app, charge_request(&json!({ "amount": 25, "token": token() }))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["status"], "requires_action");
    assert_eq!(body["object"], "payment_intent");
    assert_eq!(body["payment_method"], "pm_card_visa");
}

#[tokio::test]
async fn test_unrecognised_processor_status_is_returned_verbatim() {
    let vault = SandboxVault::new();
    let processor = SandboxProcessor::with_raw_status("requires_source_action");
    let app = app(&vault, &processor);

    let (response, body) =
        send(&app, charge_request(&json!({ "amount": 25, "token": token() }))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body["status"], "requires_source_action");
}
