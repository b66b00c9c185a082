use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    /// Name used when nothing better is known.
    pub fn coordinates_label(lat: f64, lon: f64) -> String {
        format!("Location {:.4}, {:.4}", lat, lon)
    }

    /// Key for per-location caching, stable to four decimal places.
    pub fn cache_key(&self) -> String {
        format!("{:.4},{:.4}", self.lat, self.lon)
    }

    /// First component of the name, e.g. "Pune" for "Pune, Maharashtra".
    pub fn short_name(&self) -> &str {
        self.name.split(',').next().unwrap_or(&self.name).trim()
    }
}

/// A geocoding search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub kind: String,
}

impl PlaceMatch {
    pub fn to_location(&self) -> Location {
        Location::new(self.display_name.clone(), self.lat, self.lon)
    }
}
