use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{LeadId, LeadSubmission};
use super::notify::LeadMailer;
use super::service::{IntakeError, LeadIntakeService};
use super::store::{LeadRepository, ProviderDirectory, ZoneDirectory};

/// Router builder exposing the intake form boundary over HTTP.
pub fn intake_router<S, M>(service: Arc<LeadIntakeService<S, M>>) -> Router
where
    S: ZoneDirectory + LeadRepository + ProviderDirectory + 'static,
    M: LeadMailer + 'static,
{
    Router::new()
        .route("/api/v1/leads", post(submit_handler::<S, M>))
        .route("/api/v1/leads/:lead_id", get(status_handler::<S, M>))
        .with_state(service)
}

pub(crate) async fn submit_handler<S, M>(
    State(service): State<Arc<LeadIntakeService<S, M>>>,
    axum::Json(submission): axum::Json<LeadSubmission>,
) -> Response
where
    S: ZoneDirectory + LeadRepository + ProviderDirectory + 'static,
    M: LeadMailer + 'static,
{
    match service.submit(submission).await {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "data": {
                    "lead": receipt.lead,
                    "postal_code": receipt.postal_code,
                    "zone_name": receipt.zone_name,
                    "country_name": receipt.country_name,
                    "providers_notified": receipt.providers_notified,
                },
                "message": receipt.message,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err @ IntakeError::ZoneNotFound { .. }) => {
            let payload = json!({ "success": false, "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(IntakeError::Validation(err)) => {
            let payload = json!({ "success": false, "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(IntakeError::Creation(err)) => {
            let payload = json!({
                "success": false,
                "error": "failed to create lead",
                "details": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "success": false, "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<S, M>(
    State(service): State<Arc<LeadIntakeService<S, M>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    S: ZoneDirectory + LeadRepository + ProviderDirectory + 'static,
    M: LeadMailer + 'static,
{
    let id = LeadId(lead_id);
    match service.lead_view(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err @ IntakeError::LeadNotFound(_)) => {
            let payload = json!({ "success": false, "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "success": false, "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
