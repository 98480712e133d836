use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::Cart;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("cart for user {0} was modified concurrently")]
    VersionConflict(Uuid),

    #[error("cart storage error: {0}")]
    Storage(String),
}

/// Persistence seam for server-held carts. Writes are guarded by the cart's
/// version counter: the store compares `expected_version` against the stored
/// row and increments it on success, rejecting concurrent writers.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Option<Cart>, CartError>;

    /// Persist the cart if the stored version still equals `expected_version`.
    /// The persisted version becomes `expected_version + 1`.
    async fn save(&self, cart: &Cart, expected_version: i64) -> Result<(), CartError>;

    async fn delete(&self, user_id: Uuid) -> Result<(), CartError>;
}

/// HashMap-backed store for tests and local runs.
pub struct MemoryCartStore {
    carts: Mutex<HashMap<Uuid, Cart>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self {
            carts: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<Cart>, CartError> {
        Ok(self.carts.lock().unwrap().get(&user_id).cloned())
    }

    async fn save(&self, cart: &Cart, expected_version: i64) -> Result<(), CartError> {
        let mut carts = self.carts.lock().unwrap();
        let current_version = carts.get(&cart.user_id).map(|c| c.version).unwrap_or(0);
        if current_version != expected_version {
            return Err(CartError::VersionConflict(cart.user_id));
        }

        let mut stored = cart.clone();
        stored.version = expected_version + 1;
        carts.insert(cart.user_id, stored);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), CartError> {
        self.carts.lock().unwrap().remove(&user_id);
        Ok(())
    }
}
