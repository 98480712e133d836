use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_cart::models::{CartItem, Origin};
use bazaar_shared::pii::Masked;
use bazaar_shipping::groups::ShippingGroup;

use crate::store::OrderError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "PAID" => Some(PaymentStatus::Paid),
            "FAILED" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Order-level fulfillment outcome, derived from per-shipment outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    PendingPayment,
    Confirmed,
    PartiallyFulfilled,
    FulfillmentFailed,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::PendingPayment => "PENDING_PAYMENT",
            FulfillmentStatus::Confirmed => "CONFIRMED",
            FulfillmentStatus::PartiallyFulfilled => "PARTIALLY_FULFILLED",
            FulfillmentStatus::FulfillmentFailed => "FULFILLMENT_FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING_PAYMENT" => Some(FulfillmentStatus::PendingPayment),
            "CONFIRMED" => Some(FulfillmentStatus::Confirmed),
            "PARTIALLY_FULFILLED" => Some(FulfillmentStatus::PartiallyFulfilled),
            "FULFILLMENT_FAILED" => Some(FulfillmentStatus::FulfillmentFailed),
            _ => None,
        }
    }
}

/// Physical movement of the order, independent of `FulfillmentStatus`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogisticsStatus {
    Processing,
    Packed,
    Shipped,
    Delivered,
}

impl LogisticsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogisticsStatus::Processing => "PROCESSING",
            LogisticsStatus::Packed => "PACKED",
            LogisticsStatus::Shipped => "SHIPPED",
            LogisticsStatus::Delivered => "DELIVERED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROCESSING" => Some(LogisticsStatus::Processing),
            "PACKED" => Some(LogisticsStatus::Packed),
            "SHIPPED" => Some(LogisticsStatus::Shipped),
            "DELIVERED" => Some(LogisticsStatus::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    Confirmed,
    Failed,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "PENDING",
            ShipmentStatus::Confirmed => "CONFIRMED",
            ShipmentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ShipmentStatus::Pending),
            "CONFIRMED" => Some(ShipmentStatus::Confirmed),
            "FAILED" => Some(ShipmentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTotals {
    pub items_total: f64,
    pub shipping_total: f64,
    pub discount: f64,
    pub grand_total: f64,
}

impl OrderTotals {
    /// `grand_total == items_total + shipping_total − discount` within the
    /// shared money epsilon.
    pub fn reconciles(&self) -> bool {
        bazaar_shared::approx_eq(
            self.items_total + self.shipping_total - self.discount,
            self.grand_total,
        )
    }
}

/// Immutable snapshot of the buyer's delivery address, copied onto the
/// order at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub mobile: Masked<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub email: Option<String>,
}

impl Address {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("address name is required".to_string());
        }
        if self.line1.trim().is_empty() {
            return Err("address line1 is required".to_string());
        }
        if self.city.trim().is_empty() || self.state.trim().is_empty() {
            return Err("address city and state are required".to_string());
        }

        let mobile = &self.mobile.0;
        if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err("mobile must be exactly 10 digits".to_string());
        }
        if !matches!(mobile.chars().next(), Some('6'..='9')) {
            return Err("mobile must start with 6-9".to_string());
        }

        if self.pincode.len() != 6 || !self.pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err("pincode must be exactly 6 digits".to_string());
        }
        if self.pincode.starts_with('0') {
            return Err("pincode cannot start with 0".to_string());
        }

        Ok(())
    }
}

/// One carrier-bound package for a single origin within an order. Owned
/// exclusively by its parent order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub code: String,
    pub origin: Origin,
    pub items: Vec<CartItem>,
    pub provider_id: Uuid,
    pub courier_name: String,
    pub courier_code: Option<String>,
    pub shipping_cost: f64,
    pub package_weight_kg: f64,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub status: ShipmentStatus,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub code: String,
    pub user_id: Option<Uuid>,
    pub address: Address,
    pub totals: OrderTotals,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub fulfillment_status: FulfillmentStatus,
    pub logistics_status: LogisticsStatus,
    pub shipments: Vec<Shipment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated checkout input, ready for the atomic order+shipments write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub user_id: Option<Uuid>,
    pub address: Address,
    pub groups: Vec<ShippingGroup>,
    pub totals: OrderTotals,
}

impl Order {
    /// Materialize an order and its shipments from a draft under the
    /// allocated order code. Shipment codes derive from the order code:
    /// `{code}-SH{n}`, 1-based in group order.
    pub fn from_draft(draft: &OrderDraft, code: String) -> Result<Self, OrderError> {
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let mut shipments = Vec::with_capacity(draft.groups.len());
        for (n, group) in draft.groups.iter().enumerate() {
            let rate = group.selected_rate.as_ref().ok_or_else(|| {
                OrderError::Validation(format!("group {} has no selected rate", n + 1))
            })?;

            shipments.push(Shipment {
                id: Uuid::new_v4(),
                order_id,
                code: format!("{}-SH{}", code, n + 1),
                origin: group.origin.clone(),
                items: group.items.clone(),
                provider_id: rate.provider_id,
                courier_name: rate.courier_name.clone(),
                courier_code: rate.courier_code.clone(),
                shipping_cost: rate.price,
                package_weight_kg: group.total_weight_kg,
                tracking_number: None,
                tracking_url: None,
                status: ShipmentStatus::Pending,
                meta: serde_json::json!({
                    "estimated_days": rate.estimated_days,
                    "mode": rate.mode,
                }),
                created_at: now,
                updated_at: now,
            });
        }

        Ok(Order {
            id: order_id,
            code,
            user_id: draft.user_id,
            address: draft.address.clone(),
            totals: draft.totals.clone(),
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            fulfillment_status: FulfillmentStatus::PendingPayment,
            logistics_status: LogisticsStatus::Processing,
            shipments,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            name: "Asha Rao".to_string(),
            mobile: Masked("9876543210".to_string()),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            email: Some("asha@example.com".to_string()),
        }
    }

    #[test]
    fn test_valid_address_passes() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn test_mobile_format_is_enforced() {
        let mut addr = address();
        addr.mobile = Masked("12345".to_string());
        assert!(addr.validate().is_err());

        addr.mobile = Masked("1234567890".to_string());
        assert!(addr.validate().is_err(), "mobile must start with 6-9");

        addr.mobile = Masked("6123456789".to_string());
        assert!(addr.validate().is_ok());
    }

    #[test]
    fn test_pincode_format_is_enforced() {
        let mut addr = address();
        addr.pincode = "01234".to_string();
        assert!(addr.validate().is_err());

        addr.pincode = "012345".to_string();
        assert!(addr.validate().is_err(), "pincode cannot start with 0");

        addr.pincode = "400001".to_string();
        assert!(addr.validate().is_ok());
    }

    #[test]
    fn test_totals_reconcile_within_epsilon() {
        let totals = OrderTotals {
            items_total: 3500.0,
            shipping_total: 150.0,
            discount: 0.0,
            grand_total: 3650.004,
        };
        assert!(totals.reconciles());

        let off = OrderTotals {
            grand_total: 3651.0,
            ..totals
        };
        assert!(!off.reconciles());
    }

    #[test]
    fn test_status_strings_round_trip_through_parse() {
        // New rows rely on the column defaults; those strings must stay
        // readable.
        assert_eq!(
            FulfillmentStatus::parse("PENDING_PAYMENT"),
            Some(FulfillmentStatus::PendingPayment)
        );
        assert_eq!(
            LogisticsStatus::parse("PROCESSING"),
            Some(LogisticsStatus::Processing)
        );

        for status in [PaymentStatus::Pending, PaymentStatus::Paid, PaymentStatus::Failed] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            FulfillmentStatus::PendingPayment,
            FulfillmentStatus::Confirmed,
            FulfillmentStatus::PartiallyFulfilled,
            FulfillmentStatus::FulfillmentFailed,
        ] {
            assert_eq!(FulfillmentStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            ShipmentStatus::Pending,
            ShipmentStatus::Confirmed,
            ShipmentStatus::Failed,
        ] {
            assert_eq!(ShipmentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_mobile_is_masked_in_debug_output() {
        let addr = address();
        let debug = format!("{:?}", addr);
        assert!(!debug.contains("9876543210"));
    }
}
