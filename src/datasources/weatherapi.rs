use crate::config::WeatherApiConfig;
use crate::error::{KisaanError, Result};
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.weatherapi.com/v1";

pub struct WeatherApiClient {
    client: reqwest::Client,
    config: WeatherApiConfig,
}

/// Current conditions from WeatherAPI.com.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherApiCurrent {
    pub place: Option<String>,
    pub country: Option<String>,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub precip_mm: f64,
    pub wind_kph: f64,
    pub wind_degree: f64,
    pub condition_text: String,
}

impl WeatherApiCurrent {
    /// First word of the condition text, e.g. "Patchy" for "Patchy rain possible".
    pub fn condition_word(&self) -> Option<&str> {
        self.condition_text.split_whitespace().next()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    location: Option<ApiLocation>,
    current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    #[serde(default)]
    feelslike_c: Option<f64>,
    humidity: f64,
    #[serde(default)]
    precip_mm: f64,
    #[serde(default)]
    wind_kph: f64,
    #[serde(default)]
    wind_degree: f64,
    #[serde(default)]
    condition: Option<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    #[serde(default)]
    text: String,
}

impl WeatherApiClient {
    pub fn new(config: WeatherApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn current_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/current.json?key={}&q={},{}&aqi=no",
            API_BASE_URL, self.config.api_key, lat, lon
        )
    }

    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<WeatherApiCurrent> {
        let response = self
            .client
            .get(self.current_url(lat, lon))
            .send()
            .await
            .map_err(|e| KisaanError::DataSourceUnavailable(format!("WeatherAPI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KisaanError::DataSourceUnavailable(format!(
                "WeatherAPI returned {}: {}",
                status, body
            )));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            KisaanError::DataSourceUnavailable(format!(
                "Failed to parse WeatherAPI response: {}",
                e
            ))
        })?;

        Ok(convert_response(api_response))
    }

    pub async fn test_connection(&self, lat: f64, lon: f64) -> Result<bool> {
        let response = self
            .client
            .get(self.current_url(lat, lon))
            .send()
            .await
            .map_err(|e| KisaanError::DataSourceUnavailable(format!("WeatherAPI: {}", e)))?;

        Ok(response.status().is_success())
    }
}

fn convert_response(response: ApiResponse) -> WeatherApiCurrent {
    let current = response.current;
    let (place, country) = response
        .location
        .map(|l| (l.name, l.country))
        .unwrap_or((None, None));

    WeatherApiCurrent {
        place,
        country,
        temp_c: current.temp_c,
        feels_like_c: current.feelslike_c.unwrap_or(current.temp_c),
        humidity_pct: current.humidity,
        precip_mm: current.precip_mm,
        wind_kph: current.wind_kph,
        wind_degree: current.wind_degree,
        condition_text: current.condition.map(|c| c.text).unwrap_or_default(),
    }
}
