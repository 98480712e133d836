use std::sync::Arc;

use serde::{Deserialize, Serialize};

use bazaar_core::carrier::{CarrierError, ShippingMode};

use crate::cache::RateCache;
use crate::groups::ShippingGroup;
use crate::provider::{ProviderStore, ShippingProvider};
use crate::rates::{RateCacheEntry, RateError, RateKey, ShippingRate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateQuery {
    pub from_pincode: String,
    pub to_pincode: String,
    pub weight_kg: f64,
    pub mode: ShippingMode,
}

/// Raw quote from a provider, before caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderQuote {
    pub courier_name: String,
    pub courier_code: Option<String>,
    pub price: f64,
    pub estimated_days: u32,
    pub metadata: serde_json::Value,
}

/// Quote side of the carrier integration, separated from booking so rate
/// shopping can be exercised without a bookable client.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn quote(
        &self,
        provider: &ShippingProvider,
        query: &RateQuery,
    ) -> Result<ProviderQuote, CarrierError>;
}

/// Deterministic quote source for tests and local runs: a weight-based
/// tariff under the provider's own name, air costing more and moving faster
/// than surface.
pub struct MockRateSource;

#[async_trait::async_trait]
impl RateSource for MockRateSource {
    async fn quote(
        &self,
        provider: &ShippingProvider,
        query: &RateQuery,
    ) -> Result<ProviderQuote, CarrierError> {
        let (base, per_kg, estimated_days) = match query.mode {
            ShippingMode::Air => (90.0, 40.0, 2),
            ShippingMode::Surface => (45.0, 20.0, 5),
        };
        Ok(ProviderQuote {
            courier_name: format!("{}-{}", provider.name, query.mode),
            courier_code: provider.code.clone(),
            price: bazaar_shared::round2(base + per_kg * query.weight_kg),
            estimated_days,
            metadata: serde_json::json!({ "mock": true }),
        })
    }
}

/// Rate-shopping outcome for one shipping group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupRates {
    Quoted { rates: Vec<ShippingRate> },
    /// No enabled provider could quote the route. Reported to the caller,
    /// never escalated into a checkout failure.
    NotServiceable,
}

/// Cache-first rate shopping across enabled providers in priority order.
pub struct RateShopper {
    providers: Arc<dyn ProviderStore>,
    cache: Arc<dyn RateCache>,
    source: Arc<dyn RateSource>,
    ttl_minutes: i64,
}

impl RateShopper {
    pub fn new(
        providers: Arc<dyn ProviderStore>,
        cache: Arc<dyn RateCache>,
        source: Arc<dyn RateSource>,
        ttl_minutes: i64,
    ) -> Self {
        Self {
            providers,
            cache,
            source,
            ttl_minutes,
        }
    }

    /// Quote one group against every enabled provider. A provider that fails
    /// to quote is skipped; zero quotes means the route is not serviceable.
    pub async fn rates_for_group(
        &self,
        group: &ShippingGroup,
        to_pincode: &str,
        mode: ShippingMode,
    ) -> Result<GroupRates, RateError> {
        let query = RateQuery {
            from_pincode: group.origin.pincode.clone(),
            to_pincode: to_pincode.to_string(),
            weight_kg: group.total_weight_kg,
            mode,
        };

        let mut rates = Vec::new();
        for provider in self.providers.list_enabled().await? {
            match self.rate_for_provider(&provider, &query).await {
                Ok(rate) => rates.push(rate),
                Err(err) => {
                    tracing::warn!(
                        provider = %provider.name,
                        from = %query.from_pincode,
                        to = %query.to_pincode,
                        error = %err,
                        "provider failed to quote, skipping"
                    );
                }
            }
        }

        if rates.is_empty() {
            tracing::warn!(
                from = %query.from_pincode,
                to = %query.to_pincode,
                "no provider can service this route"
            );
            return Ok(GroupRates::NotServiceable);
        }
        Ok(GroupRates::Quoted { rates })
    }

    async fn rate_for_provider(
        &self,
        provider: &ShippingProvider,
        query: &RateQuery,
    ) -> Result<ShippingRate, CarrierError> {
        let key = RateKey::for_route(
            provider.id,
            &query.from_pincode,
            &query.to_pincode,
            query.weight_kg,
            query.mode,
        );

        match self.cache.find_valid(&key).await {
            Ok(Some(entry)) => {
                tracing::debug!(provider = %provider.name, "rate cache hit");
                return Ok(entry.to_rate());
            }
            Ok(None) => {}
            Err(err) => {
                // A broken cache degrades to a provider call, not a failure.
                tracing::warn!(provider = %provider.name, error = %err, "rate cache lookup failed");
            }
        }

        let quote = self.source.quote(provider, query).await?;
        let entry = RateCacheEntry::new(
            key,
            quote.price,
            quote.courier_name,
            quote.courier_code,
            quote.estimated_days,
            quote.metadata,
            self.ttl_minutes,
        );
        let rate = entry.to_rate();

        if let Err(err) = self.cache.put(entry).await {
            tracing::warn!(provider = %provider.name, error = %err, "rate cache write failed");
        }
        Ok(rate)
    }
}
