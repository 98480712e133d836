use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::put,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{from_order, from_rate, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateTrackingRequest {
    pub tracking_number: String,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProviderRequest {
    pub enabled: bool,
}

/// PUT /v1/shipments/{id}/tracking
/// Manual tracking correction for shipments booked outside the normal flow
/// or mis-reported by the carrier.
pub async fn update_tracking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrackingRequest>,
) -> Result<StatusCode, AppError> {
    if payload.tracking_number.trim().is_empty() {
        return Err(AppError::ValidationError(
            "tracking_number cannot be empty".to_string(),
        ));
    }

    state
        .orders
        .update_tracking(id, payload.tracking_number, payload.tracking_url)
        .await
        .map_err(from_order)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/providers/{id}
/// Toggle a shipping provider. Disabled providers drop out of rate shopping
/// on the next quote; cached rates they already issued stay valid until
/// expiry.
pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProviderRequest>,
) -> Result<StatusCode, AppError> {
    state
        .providers
        .set_enabled(id, payload.enabled)
        .await
        .map_err(from_rate)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shipments/{id}/tracking", put(update_tracking))
        .route("/v1/providers/{id}", put(update_provider))
}
