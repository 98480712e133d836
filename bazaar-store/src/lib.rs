pub mod app_config;
pub mod cart_repo;
pub mod catalog_repo;
pub mod database;
pub mod event_repo;
pub mod order_repo;
pub mod provider_repo;
pub mod rate_cache_repo;

pub use app_config::Config;
pub use cart_repo::PgCartStore;
pub use catalog_repo::PgProductCatalog;
pub use database::DbClient;
pub use event_repo::PgShippingEventSink;
pub use order_repo::PgOrderStore;
pub use provider_repo::PgProviderStore;
pub use rate_cache_repo::RedisRateCache;
