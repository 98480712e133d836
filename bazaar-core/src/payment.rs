use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayOrderStatus {
    Created,
    Captured,
    Failed,
}

/// Order registered with the external payment gateway; the gateway's own id
/// is what later webhook callbacks reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub local_order_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: GatewayOrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

/// Asynchronous success/failure callback delivered by the gateway after the
/// buyer completes (or abandons) payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallback {
    pub local_order_id: Uuid,
    pub gateway_order_id: String,
    pub payment_id: String,
    pub success: bool,
    pub error: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a payment order with the gateway for the given amount.
    async fn create_payment_order(
        &self,
        amount: f64,
        currency: &str,
        local_order_id: Uuid,
        customer: &CustomerInfo,
    ) -> CoreResult<GatewayOrder>;
}

pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_order(
        &self,
        amount: f64,
        currency: &str,
        local_order_id: Uuid,
        customer: &CustomerInfo,
    ) -> CoreResult<GatewayOrder> {
        if amount <= 0.0 {
            return Err(CoreError::GatewayError(format!(
                "amount must be positive, got {amount}"
            )));
        }

        tracing::info!(
            order_id = %local_order_id,
            customer = %customer.name,
            "Creating mock gateway order"
        );

        Ok(GatewayOrder {
            // Encode local_order_id so the mock can correlate callbacks
            id: format!("mock_pg_{}", local_order_id.simple()),
            local_order_id,
            amount,
            currency: currency.to_string(),
            status: GatewayOrderStatus::Created,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway_creates_order() {
        let gateway = MockPaymentGateway;
        let order_id = Uuid::new_v4();
        let customer = CustomerInfo {
            name: "Asha".to_string(),
            email: None,
            mobile: Some("9876543210".to_string()),
        };

        let gw = gateway
            .create_payment_order(3650.0, "INR", order_id, &customer)
            .await
            .unwrap();

        assert_eq!(gw.local_order_id, order_id);
        assert_eq!(gw.status, GatewayOrderStatus::Created);
        assert!(gw.id.starts_with("mock_pg_"));
    }

    #[tokio::test]
    async fn test_mock_gateway_rejects_zero_amount() {
        let gateway = MockPaymentGateway;
        let customer = CustomerInfo {
            name: "Asha".to_string(),
            email: None,
            mobile: None,
        };
        let result = gateway
            .create_payment_order(0.0, "INR", Uuid::new_v4(), &customer)
            .await;
        assert!(result.is_err());
    }
}
