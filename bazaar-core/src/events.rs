use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Pending,
    Success,
    Failed,
}

/// One row of the append-only shipping audit trail. Events are written for
/// every provider attempt and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub event_type: String,
    pub status: EventStatus,
    pub request: serde_json::Value,
    pub response: Option<serde_json::Value>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ShippingEvent {
    pub fn success(
        order_id: Uuid,
        provider_id: Option<Uuid>,
        event_type: &str,
        request: serde_json::Value,
        response: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            provider_id,
            event_type: event_type.to_string(),
            status: EventStatus::Success,
            request,
            response: Some(response),
            error_code: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn failure(
        order_id: Uuid,
        provider_id: Option<Uuid>,
        event_type: &str,
        request: serde_json::Value,
        error_code: &str,
        error_message: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            provider_id,
            event_type: event_type.to_string(),
            status: EventStatus::Failed,
            request,
            response: None,
            error_code: Some(error_code.to_string()),
            error_message: Some(error_message.to_string()),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ShippingEventSink: Send + Sync {
    async fn append(&self, event: ShippingEvent) -> CoreResult<()>;
}
