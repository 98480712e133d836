use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fulfillment origin resolved from the item's owning seller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Origin {
    pub seller_id: Uuid,
    pub pincode: String,
    pub city: String,
    pub state: String,
}

/// One line in a cart. Quantity is always positive; a zero-quantity item
/// does not exist and must be removed rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub unit_sale_price: Option<f64>,
    pub product_name: String,
    pub thumbnail: String,
    pub unit_weight_kg: f64,
    pub origin: Origin,
}

/// Composite identity of a cart line: the same product in a different size
/// or color is a different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartItemKey {
    pub product_id: Uuid,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartItem {
    pub fn key(&self) -> CartItemKey {
        CartItemKey {
            product_id: self.product_id,
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Sale price when one is set, list price otherwise.
    pub fn effective_unit_price(&self) -> f64 {
        self.unit_sale_price.unwrap_or(self.unit_price)
    }

    pub fn line_total(&self) -> f64 {
        self.effective_unit_price() * self.quantity as f64
    }

    pub fn line_weight_kg(&self) -> f64 {
        self.unit_weight_kg * self.quantity as f64
    }
}

/// Server-held cart. `version` increments on every persisted write and is
/// the optimistic-concurrency guard for overlapping sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Set the quantity for an existing line. Zero removes the line.
    pub fn set_quantity(&mut self, key: &CartItemKey, quantity: u32) {
        if quantity == 0 {
            self.items.retain(|item| &item.key() != key);
        } else if let Some(item) = self.items.iter_mut().find(|item| &item.key() == key) {
            item.quantity = quantity;
        }
        self.updated_at = Utc::now();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }
}
