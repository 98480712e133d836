use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use bazaar_core::payment::{CustomerInfo, GatewayOrder};
use bazaar_order::models::{FulfillmentStatus, Order, OrderDraft};

use crate::error::{from_fulfillment, from_order, AppError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub order: Order,
    pub payment: GatewayOrder,
}

#[derive(Debug, Serialize)]
pub struct FulfillmentResponse {
    pub order_id: Uuid,
    pub confirmed: usize,
    pub failed: usize,
    pub status: FulfillmentStatus,
}

/// POST /v1/orders
/// Record the order with its shipments atomically, then register a payment
/// order with the gateway. The order exists before any payment attempt, so
/// a crashed payment flow never loses the order.
pub async fn place_order(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<Json<PlaceOrderResponse>, AppError> {
    let order = state
        .checkout
        .place_order(draft)
        .await
        .map_err(from_order)?;

    // The cart's lifecycle ends at successful placement; its lines live on
    // as order snapshots. A failed clear must not undo the placed order.
    if let Some(user_id) = order.user_id {
        if let Err(err) = state.carts.clear(user_id).await {
            tracing::warn!(%user_id, error = %err, "failed to clear cart after checkout");
        }
    }

    let customer = CustomerInfo {
        name: order.address.name.clone(),
        email: order.address.email.clone(),
        mobile: Some(order.address.mobile.0.clone()),
    };
    let payment = state
        .gateway
        .create_payment_order(order.totals.grand_total, "INR", order.id, &customer)
        .await
        .map_err(|e| AppError::Anyhow(e.into()))?;

    Ok(Json(PlaceOrderResponse { order, payment }))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    state
        .orders
        .get_order(id)
        .await
        .map_err(from_order)?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("order not found: {id}")))
}

/// GET /v1/orders/code/{code}
pub async fn get_order_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Order>, AppError> {
    state
        .orders
        .get_order_by_code(&code)
        .await
        .map_err(from_order)?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("order not found: {code}")))
}

/// POST /v1/orders/{id}/fulfill
/// Manual fulfillment trigger for orders whose webhook run failed partway.
/// Safe to repeat: confirmed and terminally failed shipments are skipped.
pub async fn fulfill_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FulfillmentResponse>, AppError> {
    let report = state
        .orchestrator
        .fulfill_order(id)
        .await
        .map_err(from_fulfillment)?;

    Ok(Json(FulfillmentResponse {
        order_id: report.order_id,
        confirmed: report.confirmed,
        failed: report.failed,
        status: report.status,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(place_order))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/code/{code}", get(get_order_by_code))
        .route("/v1/orders/{id}/fulfill", post(fulfill_order))
}
