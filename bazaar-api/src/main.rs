use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_api::{app, AppState};
use bazaar_cart::service::CartService;
use bazaar_core::carrier::MockCarrier;
use bazaar_core::payment::MockPaymentGateway;
use bazaar_order::checkout::CheckoutService;
use bazaar_order::fulfillment::FulfillmentOrchestrator;
use bazaar_shipping::shop::{MockRateSource, RateShopper};
use bazaar_store::{
    Config, DbClient, PgCartStore, PgOrderStore, PgProductCatalog, PgProviderStore,
    PgShippingEventSink, RedisRateCache,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Bazaar API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let rate_cache =
        Arc::new(RedisRateCache::new(&config.redis.url).expect("Failed to connect to Redis"));

    let orders = Arc::new(PgOrderStore::new(db.pool.clone()));
    let providers = Arc::new(PgProviderStore::new(db.pool.clone()));
    let events = Arc::new(PgShippingEventSink::new(db.pool.clone()));
    let carts = Arc::new(CartService::new(
        Arc::new(PgCartStore::new(db.pool.clone())),
        Arc::new(PgProductCatalog::new(db.pool.clone())),
    ));

    // Carrier and rate integrations are mocked until real provider
    // credentials are wired in.
    let carrier = Arc::new(MockCarrier::new());
    let rates = Arc::new(RateShopper::new(
        providers.clone(),
        rate_cache,
        Arc::new(MockRateSource),
        config.rate_cache.ttl_minutes,
    ));

    let orchestrator = Arc::new(FulfillmentOrchestrator::new(
        orders.clone(),
        carrier,
        events,
        config.fulfillment.retry_policy(),
    ));

    let app_state = AppState {
        checkout: Arc::new(CheckoutService::new(orders.clone())),
        orders,
        carts,
        rates,
        providers,
        gateway: Arc::new(MockPaymentGateway),
        orchestrator,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
