use crate::application::charge::ChargeService;
use crate::domain::payment::{ChargeRequest, ErrorEnvelope, PaymentIntent};
use crate::error::DonationError;
use crate::infrastructure::charge_api::CHARGE_PATH;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

#[derive(Clone)]
pub struct AppState {
    pub charges: Arc<ChargeService>,
}

impl AppState {
    pub fn new(charges: ChargeService) -> Self {
        Self {
            charges: Arc::new(charges),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            CHARGE_PATH,
            post(charge_with_reactor).fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Renders a `DonationError` as the `{statusCode, message}` envelope.
#[derive(Debug)]
pub struct ApiError(DonationError);

impl From<DonationError> for ApiError {
    fn from(err: DonationError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DonationError::MalformedRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let envelope = ErrorEnvelope {
            status_code: status.as_u16(),
            message: self.0.to_string(),
        };
        (status, Json(envelope)).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "donate-reactor",
    })
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method Not Allowed",
    )
}

async fn charge_with_reactor(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChargeRequest>, JsonRejection>,
) -> Result<Json<PaymentIntent>, ApiError> {
    let Json(request) = payload.inspect_err(|e| warn!(error = %e, "unreadable charge request"))?;
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    Ok(Json(state.charges.charge(request, idempotency_key).await?))
}
