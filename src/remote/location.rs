//! Location lookup for `whereami`.
//!
//! A [`Locator`] produces coordinates (with a bounded wait applied by
//! [`resolve_place`]) and a [`Geocoder`] turns them into a city and country.
//! The terminal has no device location API, so the default locator asks an
//! IP geolocation service; turning location off in the config swaps in
//! [`DisabledLocator`], which reports itself as unsupported.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{http_client, read_json, RemoteError};
use crate::config::LocationConfig;

const UNKNOWN_CITY: &str = "Unknown City";
const UNKNOWN_COUNTRY: &str = "Unknown Country";

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Location services are not available")]
    Unsupported,

    #[error("Location request was denied: {0}")]
    Denied(String),

    #[error("Timed out waiting for a location fix")]
    Timeout,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// A position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Human readable place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub city: String,
    pub country: String,
}

/// Source of the user's coordinates
#[async_trait]
pub trait Locator: Send + Sync {
    /// Whether this locator can produce coordinates at all
    fn is_supported(&self) -> bool {
        true
    }

    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Coordinates to place names
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, at: Coordinates) -> Result<Place, LocateError>;
}

/// Locate, with `wait` bounding only the coordinate fix, then reverse-geocode
pub async fn resolve_place(
    locator: &dyn Locator,
    geocoder: &dyn Geocoder,
    wait: Duration,
) -> Result<Place, LocateError> {
    let at = tokio::time::timeout(wait, locator.locate())
        .await
        .map_err(|_| LocateError::Timeout)??;
    debug!("Located at {:.4}, {:.4}", at.latitude, at.longitude);
    geocoder.reverse(at).await
}

/// Locator used when location is turned off
pub struct DisabledLocator;

#[async_trait]
impl Locator for DisabledLocator {
    fn is_supported(&self) -> bool {
        false
    }

    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpLookup {
    fn into_coordinates(self) -> Result<Coordinates, LocateError> {
        match (self.status.as_str(), self.lat, self.lon) {
            ("success", Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(LocateError::Denied(
                self.message.unwrap_or_else(|| format!("status {}", self.status)),
            )),
        }
    }
}

/// Locator backed by an IP geolocation service
pub struct IpLocator {
    url: String,
    client: reqwest::Client,
}

impl IpLocator {
    pub fn new(config: &LocationConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            url: config.locator_url.clone(),
            client: http_client(config.timeout(), &config.user_agent)?,
        })
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let lookup: IpLookup = read_json(response).await?;
        lookup.into_coordinates()
    }
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseLookup {
    address: Address,
}

impl Place {
    fn from_address(address: Address) -> Self {
        let present = |field: Option<String>| field.filter(|s| !s.trim().is_empty());

        let city = present(address.city)
            .or_else(|| present(address.town))
            .or_else(|| present(address.village))
            .unwrap_or_else(|| UNKNOWN_CITY.to_string());
        let country = present(address.country).unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

        Self { city, country }
    }
}

/// Reverse geocoder speaking the Nominatim `reverse` API
pub struct NominatimGeocoder {
    url: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new(config: &LocationConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            url: config.geocoder_url.clone(),
            client: http_client(Duration::from_secs(15), &config.user_agent)?,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, at: Coordinates) -> Result<Place, LocateError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(RemoteError::from)?;
        let lookup: ReverseLookup = read_json(response).await?;
        Ok(Place::from_address(lookup.address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(json: &str) -> Place {
        let lookup: ReverseLookup = serde_json::from_str(json).unwrap();
        Place::from_address(lookup.address)
    }

    #[test]
    fn test_city_fallbacks() {
        assert_eq!(
            place(r#"{"address":{"city":"New York","town":"Hempstead","country":"USA"}}"#).city,
            "New York"
        );
        assert_eq!(
            place(r#"{"address":{"town":"Garden City","village":"X","country":"USA"}}"#).city,
            "Garden City"
        );
        assert_eq!(
            place(r#"{"address":{"village":"Sagaponack","country":"USA"}}"#).city,
            "Sagaponack"
        );
        assert_eq!(place(r#"{"address":{"country":"USA"}}"#).city, "Unknown City");
    }

    #[test]
    fn test_empty_fields_count_as_missing() {
        let p = place(r#"{"address":{"city":"","town":"Mineola","country":""}}"#);
        assert_eq!(p.city, "Mineola");
        assert_eq!(p.country, "Unknown Country");
    }

    #[test]
    fn test_missing_address_is_malformed() {
        assert!(serde_json::from_str::<ReverseLookup>(r#"{"error":"Unable to geocode"}"#).is_err());
    }

    #[test]
    fn test_ip_lookup_status() {
        let ok: IpLookup =
            serde_json::from_str(r#"{"status":"success","lat":40.7,"lon":-73.6}"#).unwrap();
        assert_eq!(
            ok.into_coordinates().unwrap(),
            Coordinates {
                latitude: 40.7,
                longitude: -73.6
            }
        );

        let failed: IpLookup =
            serde_json::from_str(r#"{"status":"fail","message":"reserved range"}"#).unwrap();
        match failed.into_coordinates() {
            Err(LocateError::Denied(msg)) => assert_eq!(msg, "reserved range"),
            other => panic!("expected denial, got {:?}", other),
        }
    }

    struct SlowLocator;

    #[async_trait]
    impl Locator for SlowLocator {
        async fn locate(&self) -> Result<Coordinates, LocateError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            })
        }
    }

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn reverse(&self, _at: Coordinates) -> Result<Place, LocateError> {
            Ok(Place {
                city: "Nowhere".to_string(),
                country: "Atlantis".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_locate_wait_is_bounded() {
        let result =
            resolve_place(&SlowLocator, &FixedGeocoder, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(LocateError::Timeout)));
    }

    #[tokio::test]
    async fn test_disabled_locator() {
        assert!(!DisabledLocator.is_supported());
        let result =
            resolve_place(&DisabledLocator, &FixedGeocoder, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(LocateError::Unsupported)));
    }
}
