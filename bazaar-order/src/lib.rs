pub mod checkout;
pub mod fulfillment;
pub mod memory;
pub mod models;
pub mod store;

pub use checkout::CheckoutService;
pub use fulfillment::{derive_fulfillment_status, FulfillmentError, FulfillmentOrchestrator, FulfillmentReport};
pub use memory::{MemoryEventSink, MemoryOrderStore};
pub use models::{
    Address, FulfillmentStatus, LogisticsStatus, Order, OrderDraft, OrderTotals, PaymentStatus,
    Shipment, ShipmentStatus,
};
pub use store::{OrderError, OrderStore};
