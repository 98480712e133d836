use std::sync::Arc;

use bazaar_cart::service::CartService;
use bazaar_core::payment::PaymentGateway;
use bazaar_order::checkout::CheckoutService;
use bazaar_order::fulfillment::FulfillmentOrchestrator;
use bazaar_order::store::OrderStore;
use bazaar_shipping::provider::ProviderStore;
use bazaar_shipping::shop::RateShopper;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub checkout: Arc<CheckoutService>,
    pub carts: Arc<CartService>,
    pub rates: Arc<RateShopper>,
    pub providers: Arc<dyn ProviderStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub orchestrator: Arc<FulfillmentOrchestrator>,
}
