use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::models::{Cart, CartItem};
use crate::reconcile::{merge, refresh_from_catalog};
use crate::store::{CartError, CartStore};

/// Sign-in cart reconciliation: merge the session-local cart into the
/// account cart, refresh every line from the catalog, and persist under the
/// version guard.
pub struct CartService {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Merge `local` into the user's stored cart and return the persisted
    /// lines. On any failure the local list is returned unchanged — a failed
    /// merge must never destroy state the client already holds.
    pub async fn merge_into_account(&self, user_id: Uuid, local: Vec<CartItem>) -> Vec<CartItem> {
        match self.try_merge(user_id, &local).await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "cart merge failed, keeping local cart");
                local
            }
        }
    }

    /// Drop the user's server-held cart. Called once their order is placed;
    /// the cart's lines now live on the order as immutable snapshots.
    pub async fn clear(&self, user_id: Uuid) -> Result<(), CartError> {
        self.store.delete(user_id).await?;
        tracing::info!(%user_id, "cart cleared");
        Ok(())
    }

    async fn try_merge(&self, user_id: Uuid, local: &[CartItem]) -> Result<Vec<CartItem>, CartError> {
        let remote = self.store.load(user_id).await?;
        let expected_version = remote.as_ref().map(|c| c.version).unwrap_or(0);
        let remote_items = remote.map(|c| c.items).unwrap_or_default();

        let merged = merge(local, &remote_items);

        let product_ids: Vec<Uuid> = merged.iter().map(|i| i.product_id).collect();
        let products = self
            .catalog
            .find_products(&product_ids)
            .await
            .map_err(|e| CartError::Storage(e.to_string()))?;
        let refreshed = refresh_from_catalog(merged, &products);

        let cart = Cart {
            user_id,
            items: refreshed.clone(),
            version: expected_version,
            updated_at: chrono::Utc::now(),
        };
        self.store.save(&cart, expected_version).await?;

        tracing::info!(%user_id, lines = refreshed.len(), "cart merged on sign-in");
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, StaticCatalog};
    use crate::models::Origin;
    use crate::store::MemoryCartStore;
    use async_trait::async_trait;
    use bazaar_core::{CoreError, CoreResult};

    fn origin() -> Origin {
        Origin {
            seller_id: Uuid::new_v4(),
            pincode: "400001".to_string(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
        }
    }

    fn item(product_id: Uuid, quantity: u32) -> CartItem {
        CartItem {
            id: Uuid::new_v4(),
            product_id,
            size: None,
            color: None,
            quantity,
            unit_price: 100.0,
            unit_sale_price: None,
            product_name: "old name".to_string(),
            thumbnail: "https://img.example.com/old.jpg".to_string(),
            unit_weight_kg: 0.5,
            origin: origin(),
        }
    }

    fn product(id: Uuid) -> Product {
        Product {
            id,
            name: "fresh name".to_string(),
            price: 150.0,
            sale_price: None,
            thumbnail: "https://img.example.com/fresh.jpg".to_string(),
            weight_kg: 0.5,
            origin: origin(),
        }
    }

    #[tokio::test]
    async fn test_merge_persists_and_refreshes() {
        let product_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let store = Arc::new(MemoryCartStore::new());

        let mut remote = Cart::new(user_id);
        remote.items.push(item(product_id, 1));
        store.save(&remote, 0).await.unwrap();

        let service = CartService::new(
            store.clone(),
            Arc::new(StaticCatalog::new(vec![product(product_id)])),
        );

        let result = service.merge_into_account(user_id, vec![item(product_id, 5)]).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].quantity, 5);
        assert_eq!(result[0].unit_price, 150.0);

        let persisted = store.load(user_id).await.unwrap().unwrap();
        assert_eq!(persisted.version, 2);
        assert_eq!(persisted.items[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_clear_removes_stored_cart() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(MemoryCartStore::new());
        let mut cart = Cart::new(user_id);
        cart.items.push(item(Uuid::new_v4(), 2));
        store.save(&cart, 0).await.unwrap();

        let service = CartService::new(store.clone(), Arc::new(StaticCatalog::new(Vec::new())));
        service.clear(user_id).await.unwrap();

        assert!(store.load(user_id).await.unwrap().is_none());
    }

    struct FailingCatalog;

    #[async_trait]
    impl ProductCatalog for FailingCatalog {
        async fn find_products(&self, _ids: &[Uuid]) -> CoreResult<Vec<Product>> {
            Err(CoreError::InternalError("catalog down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failure_returns_local_unchanged() {
        let user_id = Uuid::new_v4();
        let local = vec![item(Uuid::new_v4(), 3)];
        let service = CartService::new(Arc::new(MemoryCartStore::new()), Arc::new(FailingCatalog));

        let result = service.merge_into_account(user_id, local.clone()).await;
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, local[0].id);
        assert_eq!(result[0].quantity, 3);
    }
}
