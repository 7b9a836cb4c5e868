use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::Geocoder;
use crate::catalog::Coordinates;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};

#[derive(Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Nominatim `/search` client that spaces requests at least `min_delay`
/// apart, as the public instance's usage policy asks.
pub struct NominatimClient<C = BasicClient> {
    client: C,
    base_url: String,
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimClient<BasicClient> {
    pub fn new(base_url: &str, user_agent: &str, min_delay: Duration) -> Result<Self> {
        let client = BasicClient::with_user_agent(user_agent)?;
        Ok(Self::with_client(client, base_url, min_delay))
    }
}

impl<C: HttpClient> NominatimClient<C> {
    pub fn with_client(client: C, base_url: &str, min_delay: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    fn search_url(&self, address: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .with_context(|| format!("Invalid Nominatim base URL '{}'", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }

    /// Sleeps until `min_delay` has passed since the previous request.
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl<C: HttpClient> Geocoder for NominatimClient<C> {
    async fn locate(&self, address: &str) -> Result<Option<Coordinates>> {
        let url = self.search_url(address)?;
        self.wait_turn().await;

        debug!(address, "Geocoding address");
        let body = fetch_bytes(&self.client, url.as_str()).await?;
        let results: Vec<SearchResult> =
            serde_json::from_slice(&body).context("Failed to parse Nominatim response")?;

        first_coordinates(&results)
    }
}

fn first_coordinates(results: &[SearchResult]) -> Result<Option<Coordinates>> {
    let Some(first) = results.first() else {
        warn!("Nominatim returned no match");
        return Ok(None);
    };

    let lat = first
        .lat
        .parse()
        .with_context(|| format!("Bad latitude '{}'", first.lat))?;
    let lon = first
        .lon
        .parse()
        .with_context(|| format!("Bad longitude '{}'", first.lon))?;

    Ok(Some(Coordinates { lat, lon }))
}
