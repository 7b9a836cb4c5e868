use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::debug;

use super::Geocoder;
use crate::catalog::Coordinates;

/// Remembers every answered lookup, including "not found".
///
/// Failed lookups are not cached so a later call can retry.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Mutex<HashMap<String, Option<Coordinates>>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait::async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn locate(&self, address: &str) -> Result<Option<Coordinates>> {
        if let Some(hit) = self.cache.lock().await.get(address) {
            debug!(address, "Geocode cache hit");
            return Ok(*hit);
        }

        let result = self.inner.locate(address).await?;
        self.cache.lock().await.insert(address.to_string(), result);
        Ok(result)
    }
}
