//! Short-lived cache of per-customer delivery history.
//!
//! Opening the same customer repeatedly within the TTL reuses the last
//! fetch. Any delivery status change for a customer invalidates their entry.

use std::sync::Arc;
use std::time::Duration;

use fruit_union_core::{CustomerId, Delivery};
use moka::future::Cache;
use tracing::debug;

use crate::gateway::{GatewayError, RemoteGateway};

const MAX_CACHED_CUSTOMERS: u64 = 1_000;

/// Delivery history keyed by customer.
#[derive(Clone)]
pub struct DeliveryHistoryCache {
    cache: Option<Cache<CustomerId, Arc<Vec<Delivery>>>>,
}

impl DeliveryHistoryCache {
    /// Create a cache with the given TTL. A zero TTL disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        if ttl.is_zero() {
            return Self::disabled();
        }
        Self {
            cache: Some(
                Cache::builder()
                    .max_capacity(MAX_CACHED_CUSTOMERS)
                    .time_to_live(ttl)
                    .build(),
            ),
        }
    }

    /// A cache that always goes to the gateway.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { cache: None }
    }

    /// Load a customer's deliveries, from cache when fresh.
    ///
    /// Failed fetches are not cached.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the history has to be fetched and the
    /// fetch fails.
    pub async fn load<G>(
        &self,
        gateway: &G,
        customer_id: CustomerId,
    ) -> Result<Arc<Vec<Delivery>>, GatewayError>
    where
        G: RemoteGateway + ?Sized,
    {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(&customer_id).await
        {
            debug!(customer_id = %customer_id, "Delivery history cache hit");
            return Ok(hit);
        }

        let deliveries = Arc::new(gateway.list_deliveries(customer_id).await?);
        if let Some(cache) = &self.cache {
            cache.insert(customer_id, Arc::clone(&deliveries)).await;
        }
        Ok(deliveries)
    }

    /// Drop a customer's cached history.
    pub async fn invalidate(&self, customer_id: CustomerId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&customer_id).await;
        }
    }
}

impl std::fmt::Debug for DeliveryHistoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryHistoryCache")
            .field("enabled", &self.cache.is_some())
            .finish()
    }
}
