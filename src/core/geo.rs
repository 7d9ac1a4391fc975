//! Geocoding: turning an address or zipcode into a GeoJSON point

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// GeoJSON point plus the address parts it was resolved from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    #[serde(rename = "type")]
    pub kind: String,

    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl GeoLocation {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Resolves free-form addresses or zipcodes
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the query is well-formed but unknown
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<GeoLocation>>;
}

/// One known place, as listed in the `geocoder.entries` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderEntry {
    pub zipcode: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl GeocoderEntry {
    fn formatted_address(&self) -> String {
        let locality = [self.state.as_deref(), Some(self.zipcode.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        [
            self.street.as_deref(),
            self.city.as_deref(),
            Some(locality.as_str()),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }

    fn to_location(&self) -> GeoLocation {
        GeoLocation {
            formatted_address: Some(self.formatted_address()),
            street: self.street.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zipcode: Some(self.zipcode.clone()),
            country: self.country.clone(),
            ..GeoLocation::point(self.longitude, self.latitude)
        }
    }
}

/// Offline geocoder backed by a fixed table of zipcodes
///
/// A query matches an entry when it is the entry's zipcode, or when the
/// zipcode appears as a separate token of an address.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: Vec<GeocoderEntry>,
}

impl StaticGeocoder {
    pub fn new(entries: Vec<GeocoderEntry>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, query: &str) -> Option<&GeocoderEntry> {
        let query = query.trim();
        let mut tokens = query
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());
        self.entries
            .iter()
            .find(|e| e.zipcode == query)
            .or_else(|| tokens.find_map(|t| self.entries.iter().find(|e| e.zipcode == t)))
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<GeoLocation>> {
        let found = self.lookup(query).map(GeocoderEntry::to_location);
        if found.is_none() {
            tracing::warn!(query, "geocoder has no entry for query");
        }
        Ok(found)
    }
}

/// Best-effort geocoding for write paths: failures leave the location unset
pub async fn locate(geocoder: &dyn Geocoder, address: &str) -> Option<GeoLocation> {
    match geocoder.geocode(address).await {
        Ok(location) => location,
        Err(e) => {
            tracing::warn!(address, error = %e, "geocoding failed");
            None
        }
    }
}
