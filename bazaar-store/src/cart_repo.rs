use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_cart::models::Cart;
use bazaar_cart::store::{CartError, CartStore};

pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    user_id: Uuid,
    items: serde_json::Value,
    version: i64,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn storage_err(e: impl std::fmt::Display) -> CartError {
    CartError::Storage(e.to_string())
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<Cart>, CartError> {
        let row: Option<CartRow> =
            sqlx::query_as("SELECT user_id, items, version, updated_at FROM carts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?;

        match row {
            Some(row) => Ok(Some(Cart {
                user_id: row.user_id,
                items: serde_json::from_value(row.items).map_err(storage_err)?,
                version: row.version,
                updated_at: row.updated_at,
            })),
            None => Ok(None),
        }
    }

    async fn save(&self, cart: &Cart, expected_version: i64) -> Result<(), CartError> {
        let items = serde_json::to_value(&cart.items).map_err(storage_err)?;

        // Compare-and-increment: only the writer holding the current version
        // lands its update.
        let result = sqlx::query(
            "UPDATE carts SET items = $2, version = version + 1, updated_at = NOW() \
             WHERE user_id = $1 AND version = $3",
        )
        .bind(cart.user_id)
        .bind(&items)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        if expected_version == 0 {
            // First write for this user; a racing first write loses on the
            // primary key and surfaces as a version conflict.
            return sqlx::query(
                "INSERT INTO carts (user_id, items, version, updated_at) VALUES ($1, $2, 1, NOW())",
            )
            .bind(cart.user_id)
            .bind(&items)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    CartError::VersionConflict(cart.user_id)
                }
                _ => storage_err(e),
            });
        }

        Err(CartError::VersionConflict(cart.user_id))
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), CartError> {
        sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}
