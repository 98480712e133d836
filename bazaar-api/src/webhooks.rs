use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use bazaar_core::payment::PaymentCallback;
use bazaar_order::models::PaymentStatus;

use crate::error::{from_order, AppError};
use crate::state::AppState;

/// POST /v1/webhooks/payments
/// Receive the gateway's payment outcome. On success the order is marked
/// PAID and fulfillment is kicked off in the background; the webhook is
/// acknowledged without waiting for carrier bookings.
pub async fn handle_payment_callback(
    State(state): State<AppState>,
    Json(payload): Json<PaymentCallback>,
) -> Result<StatusCode, AppError> {
    let order_id = payload.local_order_id;
    tracing::info!(
        %order_id,
        gateway_order = %payload.gateway_order_id,
        success = payload.success,
        "payment callback received"
    );

    let status = if payload.success {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Failed
    };
    state
        .orders
        .mark_payment(order_id, status, Some(payload.payment_id))
        .await
        .map_err(from_order)?;

    if payload.success {
        let orchestrator = state.orchestrator.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator.fulfill_order(order_id).await {
                tracing::error!(%order_id, error = %err, "background fulfillment failed");
            }
        });
    } else {
        tracing::warn!(
            %order_id,
            error = ?payload.error,
            "payment failed, order stays unfulfilled"
        );
    }

    Ok(StatusCode::OK)
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_callback))
}
