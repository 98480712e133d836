use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{FulfillmentStatus, Order, OrderDraft, PaymentStatus, ShipmentStatus};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order storage error: {0}")]
    Storage(String),
}

/// Persistence seam for orders and their shipments. The Order and its
/// Shipments are mutated only through this trait, by the checkout writer,
/// the fulfillment orchestrator and the manual admin endpoints.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically allocate the next order code and persist the order plus
    /// one shipment per group. All-or-nothing: on any failure nothing is
    /// persisted and no code is consumed by a visible order.
    async fn create_order_with_shipments(&self, draft: &OrderDraft) -> Result<Order, OrderError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, OrderError>;

    async fn get_order_by_code(&self, code: &str) -> Result<Option<Order>, OrderError>;

    /// Persist the gateway's payment outcome onto the order.
    async fn mark_payment(
        &self,
        order_id: Uuid,
        status: PaymentStatus,
        payment_id: Option<String>,
    ) -> Result<(), OrderError>;

    /// Record a booking outcome on one shipment: status transition plus
    /// tracking fields and the full replacement metadata payload.
    async fn update_shipment_booking(
        &self,
        shipment_id: Uuid,
        status: ShipmentStatus,
        tracking_number: Option<String>,
        tracking_url: Option<String>,
        meta: serde_json::Value,
    ) -> Result<(), OrderError>;

    /// Manual tracking correction (admin).
    async fn update_tracking(
        &self,
        shipment_id: Uuid,
        tracking_number: String,
        tracking_url: Option<String>,
    ) -> Result<(), OrderError>;

    async fn set_fulfillment_status(
        &self,
        order_id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<(), OrderError>;
}
