use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use bazaar_core::carrier::{CarrierClient, CarrierError, CreateShipmentRequest};
use bazaar_core::events::{ShippingEvent, ShippingEventSink};
use bazaar_core::retry::{run_with_retry, RetryPolicy};

use crate::models::{FulfillmentStatus, Order, PaymentStatus, Shipment, ShipmentStatus};
use crate::store::{OrderError, OrderStore};

#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Order {order_id} is not paid (payment status {status:?}); fulfillment refused")]
    PaymentNotCaptured {
        order_id: Uuid,
        status: PaymentStatus,
    },

    #[error(transparent)]
    Store(#[from] OrderError),
}

/// Outcome summary of one orchestration run.
#[derive(Debug, Clone)]
pub struct FulfillmentReport {
    pub order_id: Uuid,
    pub confirmed: usize,
    pub failed: usize,
    pub status: FulfillmentStatus,
}

/// Order-level fulfillment status as a pure function of per-shipment
/// outcome counts. Defined for `failed + confirmed >= 1`; an order always
/// has at least one shipment.
pub fn derive_fulfillment_status(failed: usize, confirmed: usize) -> FulfillmentStatus {
    match (failed > 0, confirmed > 0) {
        (false, true) => FulfillmentStatus::Confirmed,
        (true, false) => FulfillmentStatus::FulfillmentFailed,
        (true, true) => FulfillmentStatus::PartiallyFulfilled,
        (false, false) => FulfillmentStatus::FulfillmentFailed,
    }
}

/// Post-payment orchestrator: drives each pending shipment through the
/// carrier integration under bounded retry. Shipments are isolated — one
/// shipment's failure never blocks or rolls back another's booking, since a
/// multi-origin order is inherently partial-failure-prone.
pub struct FulfillmentOrchestrator {
    store: Arc<dyn OrderStore>,
    carrier: Arc<dyn CarrierClient>,
    events: Arc<dyn ShippingEventSink>,
    retry: RetryPolicy,
}

impl FulfillmentOrchestrator {
    pub fn new(
        store: Arc<dyn OrderStore>,
        carrier: Arc<dyn CarrierClient>,
        events: Arc<dyn ShippingEventSink>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            carrier,
            events,
            retry,
        }
    }

    /// Book every pending shipment of a paid order and derive the order's
    /// fulfillment status from the outcome counts. Re-running on a fully
    /// confirmed order makes no provider calls and changes nothing.
    pub async fn fulfill_order(&self, order_id: Uuid) -> Result<FulfillmentReport, FulfillmentError> {
        // Payment is re-read from the store, never trusted from the caller.
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;

        if order.payment_status != PaymentStatus::Paid {
            return Err(FulfillmentError::PaymentNotCaptured {
                order_id,
                status: order.payment_status,
            });
        }

        let mut confirmed = 0usize;
        let mut failed = 0usize;
        for shipment in &order.shipments {
            match shipment.status {
                ShipmentStatus::Confirmed => confirmed += 1,
                // Terminal: exhausted retries already, awaiting manual action.
                ShipmentStatus::Failed => failed += 1,
                ShipmentStatus::Pending => {
                    if self.book_shipment(&order, shipment).await? {
                        confirmed += 1;
                    } else {
                        failed += 1;
                    }
                }
            }
        }

        let status = derive_fulfillment_status(failed, confirmed);
        self.store
            .set_fulfillment_status(order_id, status.clone())
            .await?;

        tracing::info!(
            code = %order.code,
            confirmed,
            failed,
            status = status.as_str(),
            "fulfillment run complete"
        );
        Ok(FulfillmentReport {
            order_id,
            confirmed,
            failed,
            status,
        })
    }

    /// Returns whether the shipment ended up confirmed. Every carrier
    /// attempt is appended to the shipping event log.
    async fn book_shipment(
        &self,
        order: &Order,
        shipment: &Shipment,
    ) -> Result<bool, FulfillmentError> {
        let request = CreateShipmentRequest {
            shipment_id: shipment.id,
            provider_id: shipment.provider_id,
            courier_code: shipment.courier_code.clone(),
            weight_kg: shipment.package_weight_kg,
            from_pincode: shipment.origin.pincode.clone(),
            to_pincode: order.address.pincode.clone(),
            dimensions: None,
        };

        let attempt_counter = AtomicU32::new(0);
        let outcome = run_with_retry(
            &self.retry,
            || {
                let attempt = attempt_counter.fetch_add(1, Ordering::SeqCst) + 1;
                let carrier = self.carrier.clone();
                let events = self.events.clone();
                let request = request.clone();
                let order_id = order.id;
                async move {
                    let result = carrier.create_shipment(&request).await;
                    let request_json = serde_json::to_value(&request).unwrap_or_default();
                    let event = match &result {
                        Ok(confirmation) => ShippingEvent::success(
                            order_id,
                            Some(request.provider_id),
                            "create_shipment",
                            request_json,
                            serde_json::json!({
                                "attempt": attempt,
                                "awb": confirmation.awb,
                                "tracking_url": confirmation.tracking_url,
                            }),
                        ),
                        Err(err) => ShippingEvent::failure(
                            order_id,
                            Some(request.provider_id),
                            "create_shipment",
                            request_json,
                            error_code(err),
                            &err.to_string(),
                        ),
                    };
                    if let Err(e) = events.append(event).await {
                        tracing::warn!(error = %e, "failed to append shipping event");
                    }
                    result
                }
            },
            CarrierError::is_retryable,
            |attempt, err| {
                tracing::warn!(
                    shipment = %shipment.code,
                    attempt,
                    error = %err,
                    "carrier booking failed, retrying"
                );
            },
        )
        .await;

        match outcome {
            Ok(confirmation) => {
                let mut meta = shipment.meta.clone();
                if let Some(obj) = meta.as_object_mut() {
                    obj.insert("carrier_response".to_string(), confirmation.raw.clone());
                }
                self.store
                    .update_shipment_booking(
                        shipment.id,
                        ShipmentStatus::Confirmed,
                        Some(confirmation.awb.clone()),
                        confirmation.tracking_url.clone(),
                        meta,
                    )
                    .await?;
                tracing::info!(shipment = %shipment.code, awb = %confirmation.awb, "shipment booked");
                Ok(true)
            }
            Err(err) => {
                let mut meta = shipment.meta.clone();
                if let Some(obj) = meta.as_object_mut() {
                    obj.insert("error".to_string(), serde_json::json!(err.to_string()));
                    obj.insert("requires_manual_intervention".to_string(), serde_json::json!(true));
                    obj.insert("failed_at".to_string(), serde_json::json!(Utc::now()));
                }
                self.store
                    .update_shipment_booking(shipment.id, ShipmentStatus::Failed, None, None, meta)
                    .await?;
                tracing::error!(
                    shipment = %shipment.code,
                    error = %err,
                    "shipment booking exhausted retries, manual intervention required"
                );
                Ok(false)
            }
        }
    }
}

fn error_code(err: &CarrierError) -> &'static str {
    match err {
        CarrierError::Timeout(_) => "TIMEOUT",
        CarrierError::Unavailable(_) => "UNAVAILABLE",
        CarrierError::Rejected(_) => "REJECTED",
    }
}
