use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_cart::catalog::{Product, ProductCatalog};
use bazaar_core::{CoreError, CoreResult};

pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    sale_price: Option<f64>,
    thumbnail: String,
    weight_kg: f64,
    origin: serde_json::Value,
}

fn storage_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::InternalError(e.to_string())
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn find_products(&self, ids: &[Uuid]) -> CoreResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, price, sale_price, thumbnail, weight_kg, origin \
             FROM products WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(Product {
                id: row.id,
                name: row.name,
                price: row.price,
                sale_price: row.sale_price,
                thumbnail: row.thumbnail,
                weight_kg: row.weight_kg,
                origin: serde_json::from_value(row.origin).map_err(storage_err)?,
            });
        }
        Ok(products)
    }
}
