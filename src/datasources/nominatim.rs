use crate::config::NominatimConfig;
use crate::error::{KisaanError, Result};
use crate::models::{Location, PlaceMatch};
use reqwest::header::USER_AGENT;
use serde::Deserialize;

const API_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const SEARCH_LIMIT: u32 = 10;
const MAX_MATCHES: usize = 8;
const WILDCARD_MIN_LEN: usize = 3;

/// OpenStreetMap geocoding, restricted to India.
pub struct NominatimClient {
    client: reqwest::Client,
    config: NominatimConfig,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    state_district: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl Address {
    fn locality(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| KisaanError::DataSourceUnavailable(format!("Nominatim: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KisaanError::DataSourceUnavailable(format!(
                "Nominatim returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            KisaanError::DataSourceUnavailable(format!("Failed to parse Nominatim response: {}", e))
        })
    }

    fn search_url(query: &str) -> String {
        format!(
            "{}/search?format=json&q={}&countrycodes=in&limit={}&addressdetails=1&accept-language=en&dedupe=1",
            API_BASE_URL,
            encode_query(query),
            SEARCH_LIMIT
        )
    }

    /// Places matching `query`, best first, at most eight.
    pub async fn search(&self, query: &str) -> Result<Vec<PlaceMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut items: Vec<SearchItem> = self.get(&Self::search_url(query)).await?;

        if items.is_empty() && query.chars().count() >= WILDCARD_MIN_LEN {
            tracing::debug!("No matches for '{}', retrying with wildcard", query);
            items = self.get(&Self::search_url(&format!("{}*", query))).await?;
        }

        Ok(filter_matches(items, query))
    }

    /// Human-readable name for a coordinate pair.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<String> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&addressdetails=1",
            API_BASE_URL, lat, lon
        );
        let response: ReverseResponse = self.get(&url).await?;
        Ok(reverse_name(response.address.unwrap_or_default(), lat, lon))
    }

    pub async fn test_connection(&self) -> Result<bool> {
        Ok(!self.search("Delhi").await?.is_empty())
    }
}

fn filter_matches(items: Vec<SearchItem>, query: &str) -> Vec<PlaceMatch> {
    let needle = query.to_lowercase();

    items
        .into_iter()
        .filter(|item| {
            let locality = item
                .address
                .as_ref()
                .and_then(|a| a.locality())
                .unwrap_or_default()
                .to_lowercase();
            locality.contains(&needle) || item.display_name.to_lowercase().contains(&needle)
        })
        .filter_map(|item| {
            let lat = item.lat.parse::<f64>().ok()?;
            let lon = item.lon.parse::<f64>().ok()?;
            let address = item.address.unwrap_or_default();
            let kind = item.kind.unwrap_or_else(|| {
                if address.village.is_some() {
                    "village".to_string()
                } else if address.city.is_some() {
                    "city".to_string()
                } else {
                    "location".to_string()
                }
            });
            Some(PlaceMatch {
                display_name: item.display_name,
                lat,
                lon,
                locality: address
                    .locality()
                    .or(address.state_district.as_deref())
                    .map(str::to_string),
                state: address.state,
                kind,
            })
        })
        .take(MAX_MATCHES)
        .collect()
}

fn reverse_name(address: Address, lat: f64, lon: f64) -> String {
    let city = address
        .locality()
        .or(address.state_district.as_deref())
        .map(str::to_string);

    match (city, address.state) {
        (Some(city), Some(state)) => format!("{}, {}", city, state),
        (Some(city), None) => city,
        (None, Some(state)) => state,
        (None, None) => Location::coordinates_label(lat, lon),
    }
}

/// Minimal form encoding for a free-text query.
fn encode_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_JSON: &str = r#"[
        {"display_name": "Pune, Pune District, Maharashtra, India", "lat": "18.5213738", "lon": "73.8545071",
         "type": "city", "address": {"city": "Pune", "state": "Maharashtra"}},
        {"display_name": "Punjab, India", "lat": "30.9", "lon": "75.8",
         "type": "administrative", "address": {"state": "Punjab"}},
        {"display_name": "Bad Coordinates, India", "lat": "n/a", "lon": "75.8"}
    ]"#;

    #[test]
    fn matches_are_filtered_by_query() {
        let items: Vec<SearchItem> = serde_json::from_str(SEARCH_JSON).unwrap();
        let matches = filter_matches(items, "Pune");

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].locality.as_deref(), Some("Pune"));
        assert_eq!(matches[0].state.as_deref(), Some("Maharashtra"));
        assert!((matches[0].lat - 18.5213738).abs() < 1e-9);
        assert_eq!(matches[0].kind, "city");
    }

    #[test]
    fn unparseable_coordinates_are_dropped() {
        let items: Vec<SearchItem> = serde_json::from_str(SEARCH_JSON).unwrap();
        let matches = filter_matches(items, "india");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn reverse_name_prefers_city_and_state() {
        let full = Address {
            town: Some("Nashik".into()),
            state: Some("Maharashtra".into()),
            ..Default::default()
        };
        assert_eq!(reverse_name(full, 20.0, 73.8), "Nashik, Maharashtra");

        let state_only = Address {
            state: Some("Goa".into()),
            ..Default::default()
        };
        assert_eq!(reverse_name(state_only, 15.3, 74.0), "Goa");

        assert_eq!(
            reverse_name(Address::default(), 15.3, 74.0),
            "Location 15.3000, 74.0000"
        );
    }

    #[test]
    fn query_encoding() {
        assert_eq!(encode_query("New Delhi"), "New+Delhi");
        assert_eq!(encode_query("Pune*"), "Pune%2A");
        assert!(NominatimClient::search_url("x").contains("countrycodes=in"));
    }
}
