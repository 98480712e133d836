use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::carrier::ShippingMode;

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("shipping provider not found: {0}")]
    ProviderNotFound(Uuid),

    #[error("rate cache error: {0}")]
    Cache(String),

    #[error("provider storage error: {0}")]
    Storage(String),
}

/// A shipping quote for one group, as shown to the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRate {
    pub provider_id: Uuid,
    pub courier_name: String,
    pub courier_code: Option<String>,
    pub price: f64,
    pub estimated_days: u32,
    pub mode: ShippingMode,
    pub quoted_at: DateTime<Utc>,
}

/// Cache key for a quoted route. Weight is held in integral grams so the
/// key is exact under hashing and equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateKey {
    pub provider_id: Uuid,
    pub from_pincode: String,
    pub to_pincode: String,
    pub weight_grams: u32,
    pub mode: ShippingMode,
}

impl RateKey {
    pub fn for_route(
        provider_id: Uuid,
        from_pincode: &str,
        to_pincode: &str,
        weight_kg: f64,
        mode: ShippingMode,
    ) -> Self {
        Self {
            provider_id,
            from_pincode: from_pincode.to_string(),
            to_pincode: to_pincode.to_string(),
            weight_grams: (weight_kg * 1000.0).round() as u32,
            mode,
        }
    }
}

/// Cached quote. Uniqueness on the key is an invariant: writes are always
/// upserts, and an entry past `expires_at` is logically invisible even if
/// still physically present in the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCacheEntry {
    pub key: RateKey,
    pub rate: f64,
    pub courier_name: String,
    pub courier_code: Option<String>,
    pub estimated_days: u32,
    pub metadata: serde_json::Value,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RateCacheEntry {
    pub fn new(
        key: RateKey,
        rate: f64,
        courier_name: String,
        courier_code: Option<String>,
        estimated_days: u32,
        metadata: serde_json::Value,
        ttl_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            key,
            rate,
            courier_name,
            courier_code,
            estimated_days,
            metadata,
            cached_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        }
    }

    /// Expiry is checked at read time, never assumed from insert time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Remaining lifetime, floored at zero.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    pub fn to_rate(&self) -> ShippingRate {
        ShippingRate {
            provider_id: self.key.provider_id,
            courier_name: self.courier_name.clone(),
            courier_code: self.courier_code.clone(),
            price: self.rate,
            estimated_days: self.estimated_days,
            mode: self.key.mode,
            quoted_at: self.cached_at,
        }
    }
}
