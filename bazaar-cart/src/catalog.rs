use async_trait::async_trait;
use bazaar_core::CoreResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Origin;

/// Current catalog view of a product, used to refresh merged cart lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub thumbnail: String,
    pub weight_kg: f64,
    pub origin: Origin,
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up current products; ids with no live product are simply absent
    /// from the result.
    async fn find_products(&self, ids: &[Uuid]) -> CoreResult<Vec<Product>>;
}

/// Fixed in-memory catalog for tests and local runs.
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductCatalog for StaticCatalog {
    async fn find_products(&self, ids: &[Uuid]) -> CoreResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}
