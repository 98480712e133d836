pub mod catalog;
pub mod models;
pub mod reconcile;
pub mod service;
pub mod store;

pub use catalog::{Product, ProductCatalog};
pub use models::{Cart, CartItem, CartItemKey, Origin};
pub use reconcile::{merge, refresh_from_catalog};
pub use service::CartService;
pub use store::{CartError, CartStore, MemoryCartStore};
