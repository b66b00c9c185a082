use crate::config::OpenWeatherMapConfig;
use crate::error::{KisaanError, Result};
use crate::models::WeatherCondition;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const FORECAST_COUNT: u32 = 40;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

/// Current conditions as reported by OpenWeatherMap, metric units.
#[derive(Debug, Clone, PartialEq)]
pub struct OwmCurrent {
    pub place: Option<String>,
    pub country: Option<String>,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: f64,
    pub rain_1h_mm: Option<f64>,
    pub wind_speed_ms: Option<f64>,
    pub wind_deg: Option<f64>,
    pub condition: Option<WeatherCondition>,
    pub description: Option<String>,
}

/// One 3-hour forecast step.
#[derive(Debug, Clone, PartialEq)]
pub struct OwmForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub temp_c: f64,
    pub humidity_pct: f64,
    pub rain_3h_mm: f64,
    pub condition: WeatherCondition,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    #[serde(default)]
    name: Option<String>,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    rain: Option<OwmRain>,
    #[serde(default)]
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    #[serde(default)]
    rain: Option<OwmRain>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: u32,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    three_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response =
            self.client.get(url).send().await.map_err(|e| {
                KisaanError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KisaanError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            KisaanError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })
    }

    /// Fetch current weather for a coordinate pair
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Result<OwmCurrent> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, lat, lon, self.config.api_key
        );
        let response: OwmCurrentResponse = self.get(&url).await?;
        Ok(convert_current(response))
    }

    /// Fetch 5-day/3-hour forecast
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Vec<OwmForecastPoint>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric&cnt={}",
            API_BASE_URL, lat, lon, self.config.api_key, FORECAST_COUNT
        );
        let response: OwmForecastResponse = self.get(&url).await?;
        Ok(response.list.iter().filter_map(convert_forecast_item).collect())
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self, lat: f64, lon: f64) -> Result<bool> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, lat, lon, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                KisaanError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e))
            })?;

        Ok(response.status().is_success())
    }
}

fn convert_current(response: OwmCurrentResponse) -> OwmCurrent {
    let main = response.main;
    let weather = response.weather.first();
    let wind = response.wind.as_ref();

    OwmCurrent {
        place: response.name.filter(|n| !n.is_empty()),
        country: response.sys.and_then(|s| s.country),
        temp_c: main.temp,
        feels_like_c: main.feels_like.unwrap_or(main.temp),
        temp_min_c: main.temp_min.unwrap_or(main.temp),
        temp_max_c: main.temp_max.unwrap_or(main.temp),
        humidity_pct: main.humidity,
        rain_1h_mm: response.rain.and_then(|r| r.one_hour),
        wind_speed_ms: wind.and_then(|w| w.speed),
        wind_deg: wind.and_then(|w| w.deg),
        condition: weather.map(|w| WeatherCondition::from_owm_id(w.id)),
        description: weather
            .map(|w| w.description.clone())
            .filter(|d| !d.is_empty()),
    }
}

fn convert_forecast_item(item: &OwmForecastItem) -> Option<OwmForecastPoint> {
    let timestamp = DateTime::from_timestamp(item.dt, 0)?;

    let condition = item
        .weather
        .first()
        .map(|w| WeatherCondition::from_owm_id(w.id))
        .unwrap_or_default();

    Some(OwmForecastPoint {
        timestamp,
        temp_c: item.main.temp,
        humidity_pct: item.main.humidity,
        rain_3h_mm: item
            .rain
            .as_ref()
            .and_then(|r| r.three_hour)
            .unwrap_or(0.0),
        condition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> OpenWeatherMapConfig {
        OpenWeatherMapConfig {
            api_key: "test_key".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn client_creation() {
        let client = OpenWeatherMapClient::new(sample_config());
        assert!(client.config.enabled);
    }

    #[test]
    fn current_response_parses() {
        let json = r#"{
            "name": "Pune",
            "main": {"temp": 29.4, "feels_like": 31.0, "temp_min": 28.0, "temp_max": 30.1, "humidity": 74},
            "weather": [{"id": 501, "main": "Rain", "description": "moderate rain"}],
            "wind": {"speed": 5.0, "deg": 250},
            "rain": {"1h": 2.5},
            "sys": {"country": "IN"}
        }"#;
        let response: OwmCurrentResponse = serde_json::from_str(json).unwrap();
        let current = convert_current(response);

        assert_eq!(current.place.as_deref(), Some("Pune"));
        assert_eq!(current.country.as_deref(), Some("IN"));
        assert_eq!(current.humidity_pct, 74.0);
        assert_eq!(current.rain_1h_mm, Some(2.5));
        assert_eq!(current.wind_speed_ms, Some(5.0));
        assert_eq!(current.condition, Some(WeatherCondition::Rain));
        assert_eq!(current.description.as_deref(), Some("moderate rain"));
    }

    #[test]
    fn sparse_current_response_parses() {
        let json = r#"{"main": {"temp": 22.0, "humidity": 40}}"#;
        let response: OwmCurrentResponse = serde_json::from_str(json).unwrap();
        let current = convert_current(response);

        assert_eq!(current.feels_like_c, 22.0);
        assert!(current.rain_1h_mm.is_none());
        assert!(current.wind_speed_ms.is_none());
        assert!(current.condition.is_none());
    }

    #[test]
    fn forecast_items_convert() {
        let json = r#"{"list": [
            {"dt": 1751500800, "main": {"temp": 27.2, "humidity": 80},
             "weather": [{"id": 500, "description": "light rain"}], "rain": {"3h": 1.2}},
            {"dt": 1751511600, "main": {"temp": 25.9, "humidity": 85}, "weather": []}
        ]}"#;
        let response: OwmForecastResponse = serde_json::from_str(json).unwrap();
        let points: Vec<_> = response.list.iter().filter_map(convert_forecast_item).collect();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].rain_3h_mm, 1.2);
        assert_eq!(points[0].condition, WeatherCondition::Rain);
        assert_eq!(points[1].rain_3h_mm, 0.0);
        assert_eq!(points[1].condition, WeatherCondition::Clear);
    }
}
