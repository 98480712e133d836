use async_trait::async_trait;
use sqlx::PgPool;

use bazaar_core::events::{EventStatus, ShippingEvent, ShippingEventSink};
use bazaar_core::{CoreError, CoreResult};

pub struct PgShippingEventSink {
    pool: PgPool,
}

impl PgShippingEventSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_str(status: &EventStatus) -> &'static str {
    match status {
        EventStatus::Pending => "PENDING",
        EventStatus::Success => "SUCCESS",
        EventStatus::Failed => "FAILED",
    }
}

#[async_trait]
impl ShippingEventSink for PgShippingEventSink {
    async fn append(&self, event: ShippingEvent) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO shipping_events (id, order_id, provider_id, event_type, status, \
             request, response, error_code, error_message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(event.id)
        .bind(event.order_id)
        .bind(event.provider_id)
        .bind(&event.event_type)
        .bind(status_str(&event.status))
        .bind(&event.request)
        .bind(&event.response)
        .bind(&event.error_code)
        .bind(&event.error_message)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::InternalError(format!("failed to append shipping event: {e}")))?;
        Ok(())
    }
}
