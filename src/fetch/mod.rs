//! Loading raw bytes from a local path or over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// GETs `url` and returns the body; non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// `true` when `source` should be fetched rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads `source` from disk, or fetches it with `client` when it is a URL.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("Failed to fetch '{source}'"))?
    } else {
        std::fs::read(source).with_context(|| format!("Failed to read '{source}'"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}
