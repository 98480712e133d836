pub mod cache;
pub mod groups;
pub mod provider;
pub mod rates;
pub mod shop;

pub use cache::{MemoryRateCache, RateCache, DEFAULT_TTL_MINUTES};
pub use groups::{partition, ShippingGroup};
pub use provider::{ProviderStore, ShippingProvider};
pub use rates::{RateCacheEntry, RateError, RateKey, ShippingRate};
pub use shop::{GroupRates, MockRateSource, ProviderQuote, RateQuery, RateShopper, RateSource};
