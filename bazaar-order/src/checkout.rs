use std::sync::Arc;

use crate::models::{Order, OrderDraft};
use crate::store::{OrderError, OrderStore};

/// Order Aggregate Writer: validates a checkout draft and records the order
/// with its shipments in one atomic write. No carrier calls happen here —
/// shipments are recorded, not yet booked.
pub struct CheckoutService {
    store: Arc<dyn OrderStore>,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn place_order(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        validate_draft(&draft)?;
        let order = self.store.create_order_with_shipments(&draft).await?;
        tracing::info!(
            code = %order.code,
            shipments = order.shipments.len(),
            grand_total = order.totals.grand_total,
            "order recorded, awaiting payment"
        );
        Ok(order)
    }
}

/// Synchronous preconditions, rejected before any write.
fn validate_draft(draft: &OrderDraft) -> Result<(), OrderError> {
    if draft.groups.is_empty() {
        return Err(OrderError::Validation(
            "checkout must contain at least one shipping group".to_string(),
        ));
    }

    let mut items_total = 0.0;
    let mut shipping_total = 0.0;
    for (n, group) in draft.groups.iter().enumerate() {
        if group.items.is_empty() {
            return Err(OrderError::Validation(format!(
                "shipping group {} has no items",
                n + 1
            )));
        }
        for item in &group.items {
            if item.quantity == 0 {
                return Err(OrderError::Validation(format!(
                    "item {} has zero quantity",
                    item.product_name
                )));
            }
            if item.unit_price < 0.0 || item.unit_sale_price.is_some_and(|p| p < 0.0) {
                return Err(OrderError::Validation(format!(
                    "item {} has a negative price",
                    item.product_name
                )));
            }
            if item.unit_weight_kg < 0.0 {
                return Err(OrderError::Validation(format!(
                    "item {} has a negative weight",
                    item.product_name
                )));
            }
        }

        let rate = group.selected_rate.as_ref().ok_or_else(|| {
            OrderError::Validation(format!("shipping group {} has no selected rate", n + 1))
        })?;
        if rate.price < 0.0 {
            return Err(OrderError::Validation(format!(
                "shipping group {} has a negative rate",
                n + 1
            )));
        }

        items_total += group.items_total;
        shipping_total += rate.price;
    }

    if draft.totals.discount < 0.0 {
        return Err(OrderError::Validation("discount cannot be negative".to_string()));
    }
    if !bazaar_shared::approx_eq(draft.totals.items_total, items_total)
        || !bazaar_shared::approx_eq(draft.totals.shipping_total, shipping_total)
        || !draft.totals.reconciles()
    {
        return Err(OrderError::Validation(format!(
            "totals do not reconcile: items {} + shipping {} - discount {} != grand {}",
            items_total, shipping_total, draft.totals.discount, draft.totals.grand_total
        )));
    }

    draft.address.validate().map_err(OrderError::Validation)?;
    Ok(())
}
