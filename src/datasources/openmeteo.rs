use crate::error::{KisaanError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

const API_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
const FORECAST_DAYS: u32 = 7;

/// Topsoil moisture (0-1cm) from Open-Meteo. No API key required.
pub struct OpenMeteoClient {
    client: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoilMoistureSeries {
    /// Reading for the current hour, in percent.
    pub current_pct: f64,
    /// Mean of the hourly readings per UTC day, in percent.
    pub daily_mean_pct: BTreeMap<NaiveDate, f64>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    hourly: Option<Hourly>,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    soil_moisture_0_to_1cm: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn url(lat: f64, lon: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&hourly=soil_moisture_0_to_1cm&forecast_days={}",
            API_BASE_URL, lat, lon, FORECAST_DAYS
        )
    }

    /// Soil moisture series, or `None` when the response carries no readings.
    pub async fn fetch_soil_moisture(
        &self,
        lat: f64,
        lon: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<SoilMoistureSeries>> {
        let response = self
            .client
            .get(Self::url(lat, lon))
            .send()
            .await
            .map_err(|e| KisaanError::DataSourceUnavailable(format!("Open-Meteo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KisaanError::DataSourceUnavailable(format!(
                "Open-Meteo returned {}: {}",
                status, body
            )));
        }

        let parsed: OpenMeteoResponse = response.json().await.map_err(|e| {
            KisaanError::DataSourceUnavailable(format!("Failed to parse Open-Meteo response: {}", e))
        })?;

        Ok(parsed.hourly.and_then(|h| summarize(&h, now)))
    }

    pub async fn test_connection(&self, lat: f64, lon: f64) -> Result<bool> {
        let response = self
            .client
            .get(Self::url(lat, lon))
            .send()
            .await
            .map_err(|e| KisaanError::DataSourceUnavailable(format!("Open-Meteo: {}", e)))?;

        Ok(response.status().is_success())
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize(hourly: &Hourly, now: DateTime<Utc>) -> Option<SoilMoistureSeries> {
    let values = &hourly.soil_moisture_0_to_1cm;

    // Times are GMT, so the current hour of day indexes into the first day.
    let current = values
        .get(now.hour() as usize)
        .copied()
        .flatten()
        .or_else(|| values.first().copied().flatten())?;

    let mut sums: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for (time, value) in hourly.time.iter().zip(values) {
        let (Some(value), Ok(stamp)) = (value, NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M"))
        else {
            continue;
        };
        let entry = sums.entry(stamp.date()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let daily_mean_pct = sums
        .into_iter()
        .map(|(date, (sum, count))| (date, (sum / count as f64 * 100.0).round()))
        .collect();

    Some(SoilMoistureSeries {
        current_pct: (current * 100.0).round(),
        daily_mean_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly(values: Vec<Option<f64>>) -> Hourly {
        let time = (0..values.len())
            .map(|i| format!("2025-07-{:02}T{:02}:00", 1 + i / 24, i % 24))
            .collect();
        Hourly {
            time,
            soil_moisture_0_to_1cm: values,
        }
    }

    #[test]
    fn current_hour_is_selected() {
        let mut values = vec![Some(0.30); 48];
        values[9] = Some(0.42);
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 9, 15, 0).unwrap();

        let series = summarize(&hourly(values), now).unwrap();
        assert_eq!(series.current_pct, 42.0);
        assert_eq!(series.daily_mean_pct.len(), 2);
        assert_eq!(
            series.daily_mean_pct[&NaiveDate::from_ymd_opt(2025, 7, 2).unwrap()],
            30.0
        );
    }

    #[test]
    fn missing_hour_falls_back_to_first() {
        let mut values = vec![Some(0.25); 24];
        values[5] = None;
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 5, 0, 0).unwrap();
        let series = summarize(&hourly(values), now).unwrap();
        assert_eq!(series.current_pct, 25.0);
    }

    #[test]
    fn all_null_is_none() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 5, 0, 0).unwrap();
        assert!(summarize(&hourly(vec![None; 24]), now).is_none());
    }

    #[test]
    fn response_parses_nulls() {
        let json = r#"{"hourly": {"time": ["2025-07-01T00:00"], "soil_moisture_0_to_1cm": [null]}}"#;
        let parsed: OpenMeteoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.hourly.unwrap().soil_moisture_0_to_1cm, vec![None]);
    }
}
