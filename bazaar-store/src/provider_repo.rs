use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_shipping::provider::{ProviderStore, ShippingProvider};
use bazaar_shipping::rates::RateError;

pub struct PgProviderStore {
    pool: PgPool,
}

impl PgProviderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: Uuid,
    name: String,
    code: Option<String>,
    enabled: bool,
    priority: i32,
}

impl From<ProviderRow> for ShippingProvider {
    fn from(row: ProviderRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            enabled: row.enabled,
            priority: row.priority,
        }
    }
}

fn storage_err(e: impl std::fmt::Display) -> RateError {
    RateError::Storage(e.to_string())
}

#[async_trait]
impl ProviderStore for PgProviderStore {
    async fn list_enabled(&self) -> Result<Vec<ShippingProvider>, RateError> {
        let rows: Vec<ProviderRow> = sqlx::query_as(
            "SELECT id, name, code, enabled, priority FROM shipping_providers \
             WHERE enabled = TRUE ORDER BY priority DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), RateError> {
        let result = sqlx::query(
            "UPDATE shipping_providers SET enabled = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(enabled)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(RateError::ProviderNotFound(id));
        }
        Ok(())
    }
}
