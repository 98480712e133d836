use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tracing::debug;

use bazaar_shipping::cache::RateCache;
use bazaar_shipping::rates::{RateCacheEntry, RateError, RateKey};

/// Redis-backed rate cache. Entries carry their own `expires_at` and the
/// Redis TTL is set from the remaining lifetime, so both the backend and
/// the read path agree on when a quote dies.
pub struct RedisRateCache {
    client: redis::Client,
}

impl RedisRateCache {
    pub fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn cache_key(key: &RateKey) -> String {
        format!(
            "rate:{}:{}:{}:{}:{}",
            key.provider_id, key.from_pincode, key.to_pincode, key.weight_grams, key.mode
        )
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, RateError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)
    }
}

fn cache_err(e: impl std::fmt::Display) -> RateError {
    RateError::Cache(e.to_string())
}

#[async_trait]
impl RateCache for RedisRateCache {
    async fn put(&self, entry: RateCacheEntry) -> Result<(), RateError> {
        let ttl = entry.remaining_ttl(Utc::now()).num_seconds();
        if ttl <= 0 {
            // Already stale; nothing worth persisting.
            return Ok(());
        }

        let key = Self::cache_key(&entry.key);
        let payload = serde_json::to_string(&entry).map_err(cache_err)?;

        let mut con = self.connection().await?;
        // SET with EX is an upsert, so concurrent misses for the same route
        // simply overwrite each other.
        con.set_ex::<_, _, ()>(&key, payload, ttl as u64)
            .await
            .map_err(cache_err)?;
        debug!(key = %key, ttl_seconds = ttl, "cached shipping rate");
        Ok(())
    }

    async fn find_valid(&self, key: &RateKey) -> Result<Option<RateCacheEntry>, RateError> {
        let mut con = self.connection().await?;
        let raw: Option<String> = con
            .get(Self::cache_key(key))
            .await
            .map_err(cache_err)?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let entry: RateCacheEntry = serde_json::from_str(&raw).map_err(cache_err)?;
        // Redis TTL should have evicted stale entries, but expiry is always
        // re-checked at read time against the stored timestamp.
        if entry.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(entry))
    }
}
