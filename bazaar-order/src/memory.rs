use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use bazaar_core::events::{ShippingEvent, ShippingEventSink};
use bazaar_core::CoreResult;

use crate::models::{FulfillmentStatus, Order, OrderDraft, PaymentStatus, ShipmentStatus};
use crate::store::{OrderError, OrderStore};

/// In-memory `OrderStore` used by tests and local runs. Order codes come
/// from an atomic sequence, mirroring the Postgres sequence contract: codes
/// are unique under concurrent creation.
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<Uuid, Order>>,
    code_seq: AtomicI64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            code_seq: AtomicI64::new(1001),
        }
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_order_with_shipments(&self, draft: &OrderDraft) -> Result<Order, OrderError> {
        let code = format!("BZ-{}", self.code_seq.fetch_add(1, Ordering::SeqCst));
        let order = Order::from_draft(draft, code)?;
        self.orders.lock().unwrap().insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn get_order_by_code(&self, code: &str) -> Result<Option<Order>, OrderError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.code == code)
            .cloned())
    }

    async fn mark_payment(
        &self,
        order_id: Uuid,
        status: PaymentStatus,
        payment_id: Option<String>,
    ) -> Result<(), OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        order.payment_status = status;
        order.payment_id = payment_id;
        order.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn update_shipment_booking(
        &self,
        shipment_id: Uuid,
        status: ShipmentStatus,
        tracking_number: Option<String>,
        tracking_url: Option<String>,
        meta: serde_json::Value,
    ) -> Result<(), OrderError> {
        let mut orders = self.orders.lock().unwrap();
        for order in orders.values_mut() {
            if let Some(shipment) = order.shipments.iter_mut().find(|s| s.id == shipment_id) {
                shipment.status = status;
                shipment.tracking_number = tracking_number;
                shipment.tracking_url = tracking_url;
                shipment.meta = meta;
                shipment.updated_at = chrono::Utc::now();
                return Ok(());
            }
        }
        Err(OrderError::NotFound(shipment_id.to_string()))
    }

    async fn update_tracking(
        &self,
        shipment_id: Uuid,
        tracking_number: String,
        tracking_url: Option<String>,
    ) -> Result<(), OrderError> {
        let mut orders = self.orders.lock().unwrap();
        for order in orders.values_mut() {
            if let Some(shipment) = order.shipments.iter_mut().find(|s| s.id == shipment_id) {
                shipment.tracking_number = Some(tracking_number);
                shipment.tracking_url = tracking_url;
                shipment.updated_at = chrono::Utc::now();
                return Ok(());
            }
        }
        Err(OrderError::NotFound(shipment_id.to_string()))
    }

    async fn set_fulfillment_status(
        &self,
        order_id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<(), OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        order.fulfillment_status = status;
        order.updated_at = chrono::Utc::now();
        Ok(())
    }
}

/// Event sink that retains everything appended, for test assertions.
pub struct MemoryEventSink {
    events: Mutex<Vec<ShippingEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<ShippingEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for MemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShippingEventSink for MemoryEventSink {
    async fn append(&self, event: ShippingEvent) -> CoreResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, OrderTotals};
    use bazaar_cart::models::{CartItem, Origin};
    use bazaar_core::carrier::ShippingMode;
    use bazaar_shared::pii::Masked;
    use bazaar_shipping::groups::partition;
    use bazaar_shipping::rates::ShippingRate;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn draft() -> OrderDraft {
        let seller = Uuid::new_v4();
        let mut groups = partition(&[CartItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            size: None,
            color: None,
            quantity: 1,
            unit_price: 100.0,
            unit_sale_price: None,
            product_name: "mug".to_string(),
            thumbnail: "https://img.example.com/mug.jpg".to_string(),
            unit_weight_kg: 0.3,
            origin: Origin {
                seller_id: seller,
                pincode: "400001".to_string(),
                city: "Mumbai".to_string(),
                state: "Maharashtra".to_string(),
            },
        }]);
        groups[0].selected_rate = Some(ShippingRate {
            provider_id: Uuid::new_v4(),
            courier_name: "quickship".to_string(),
            courier_code: None,
            price: 40.0,
            estimated_days: 3,
            mode: ShippingMode::Surface,
            quoted_at: chrono::Utc::now(),
        });

        OrderDraft {
            user_id: None,
            address: Address {
                name: "Asha Rao".to_string(),
                mobile: Masked("9876543210".to_string()),
                line1: "12 MG Road".to_string(),
                line2: None,
                city: "Bengaluru".to_string(),
                state: "Karnataka".to_string(),
                pincode: "560001".to_string(),
                email: None,
            },
            groups,
            totals: OrderTotals {
                items_total: 100.0,
                shipping_total: 40.0,
                discount: 0.0,
                grand_total: 140.0,
            },
        }
    }

    #[tokio::test]
    async fn test_concurrent_creation_issues_unique_codes() {
        let store = Arc::new(MemoryOrderStore::new());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_order_with_shipments(&draft()).await.unwrap().code
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            assert!(codes.insert(handle.await.unwrap()));
        }
        assert_eq!(codes.len(), 20);
    }

    #[tokio::test]
    async fn test_shipment_codes_stay_in_group_order_past_ten() {
        let store = MemoryOrderStore::new();
        let mut d = draft();
        // Grow to 12 groups; lexicographic ordering would interleave SH10
        // between SH1 and SH2.
        let template = d.groups[0].clone();
        for _ in 0..11 {
            let mut group = template.clone();
            group.origin.seller_id = Uuid::new_v4();
            for item in &mut group.items {
                item.origin.seller_id = group.origin.seller_id;
            }
            d.groups.push(group);
        }
        d.totals.items_total *= 12.0;
        d.totals.shipping_total *= 12.0;
        d.totals.grand_total = d.totals.items_total + d.totals.shipping_total;

        let order = store.create_order_with_shipments(&d).await.unwrap();
        for (n, shipment) in order.shipments.iter().enumerate() {
            assert_eq!(shipment.code, format!("{}-SH{}", order.code, n + 1));
            assert_eq!(shipment.origin.seller_id, d.groups[n].origin.seller_id);
        }
    }

    #[tokio::test]
    async fn test_lookup_by_code() {
        let store = MemoryOrderStore::new();
        let created = store.create_order_with_shipments(&draft()).await.unwrap();

        let found = store.get_order_by_code(&created.code).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(store.get_order_by_code("BZ-9999").await.unwrap().is_none());
    }
}
