#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use donate_reactor::application::charge::ChargeService;
use donate_reactor::domain::amount::{AmountRules, Currency};
use donate_reactor::infrastructure::charge_api::CHARGE_PATH;
use donate_reactor::infrastructure::sandbox::{SandboxProcessor, SandboxVault};
use donate_reactor::interfaces::http::{AppState, build_router};
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

pub const REACTOR_ID: &str = "5b493235-6917-4307-906a-2cd6f1a90b13";

pub fn rules() -> AmountRules {
    AmountRules::new(Currency::new("usd").unwrap(), dec!(10), dec!(5000), dec!(5)).unwrap()
}

/// Router wired to the given sandbox adapters. The caller keeps its own
/// handles to inspect the recorded calls.
pub fn app(vault: &SandboxVault, processor: &SandboxProcessor) -> Router {
    build_router(AppState::new(ChargeService::new(
        Box::new(vault.clone()),
        Box::new(processor.clone()),
        rules(),
        REACTOR_ID,
    )))
}

pub fn charge_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(CHARGE_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (Response<Body>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::String(
        String::from_utf8_lossy(&bytes).into_owned(),
    ));
    (Response::from_parts(parts, Body::empty()), json)
}
