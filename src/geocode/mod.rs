//! Address geocoding for the school map.
//!
//! [`Geocoder`] is the async trait for turning an address into coordinates.
//! [`NominatimClient`] implements it against an OpenStreetMap Nominatim
//! instance; [`CachedGeocoder`] memoises any geocoder per address string.

mod cache;
mod nominatim;

pub use cache::CachedGeocoder;
pub use nominatim::NominatimClient;

use anyhow::Result;

use crate::catalog::Coordinates;

/// Resolves a postal address to coordinates.
///
/// `Ok(None)` means the service answered but found nothing.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, address: &str) -> Result<Option<Coordinates>>;
}
