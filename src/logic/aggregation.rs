use super::mock;
use super::soil::{estimate_soil_moisture, soil_advice};
use crate::cache::{Clock, ResponseCache, SystemClock, TtlCache};
use crate::config::Config;
use crate::datasources::{
    NominatimClient, OpenMeteoClient, OpenWeatherMapClient, OwmCurrent, OwmForecastPoint,
    SoilMoistureSeries, WeatherApiClient, WeatherApiCurrent,
};
use crate::error::{KisaanError, Result};
use crate::models::{
    ConsolidatedReport, CurrentWeather, DailyForecast, DataMode, Location, PlaceMatch,
    Precipitation, SoilReading, Temperature, WeatherCondition, Wind,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const MEASURED_SOIL_RELIABILITY: u8 = 97;
pub const ESTIMATED_SOIL_RELIABILITY: u8 = 95;
const MAX_FORECAST_DAYS: usize = 14;
const FALLBACK_FORECAST_BASE_C: f64 = 25.0;

/// Raw provider responses gathered for one location.
#[derive(Debug, Clone, Default)]
pub struct ProviderSnapshot {
    pub owm_current: Option<OwmCurrent>,
    pub weatherapi: Option<WeatherApiCurrent>,
    pub soil: Option<SoilMoistureSeries>,
    pub forecast: Option<Vec<OwmForecastPoint>>,
}

/// Merge provider responses into one report. Fails only when neither current
/// conditions source answered.
pub fn consolidate(
    location: &Location,
    snapshot: ProviderSnapshot,
    now: DateTime<Utc>,
) -> Result<ConsolidatedReport> {
    let owm = snapshot.owm_current.as_ref();
    let wapi = snapshot.weatherapi.as_ref();

    if owm.is_none() && wapi.is_none() {
        return Err(KisaanError::NoWeatherData);
    }

    let air_temp = owm
        .map(|o| o.temp_c)
        .or(wapi.map(|w| w.temp_c))
        .unwrap_or(25.0);
    let feels_like = owm
        .map(|o| o.feels_like_c)
        .or(wapi.map(|w| w.feels_like_c))
        .unwrap_or(25.0);
    let (min_c, max_c) = owm
        .map(|o| (o.temp_min_c, o.temp_max_c))
        .unwrap_or((air_temp - 5.0, air_temp + 5.0));

    let humidity = owm
        .map(|o| o.humidity_pct)
        .or(wapi.map(|w| w.humidity_pct))
        .unwrap_or(60.0);

    let wapi_precip = wapi.map(|w| w.precip_mm).filter(|p| *p > 0.0);
    let owm_rain = owm.and_then(|o| o.rain_1h_mm).filter(|r| *r > 0.0);
    let probability = match (wapi_precip, owm_rain) {
        (Some(mm), _) => (mm * 10.0).min(100.0),
        (None, Some(mm)) => (mm * 20.0).min(100.0),
        (None, None) => 20.0,
    };
    let amount = wapi_precip.or(owm_rain).unwrap_or(0.0);

    let wind_speed = owm
        .and_then(|o| o.wind_speed_ms)
        .map(|ms| ms * 3.6)
        .or(wapi.map(|w| w.wind_kph))
        .unwrap_or(10.0);
    let wind_direction = owm
        .and_then(|o| o.wind_deg)
        .or(wapi.map(|w| w.wind_degree))
        .unwrap_or(180.0);

    let measured = snapshot.soil.is_some();
    let moisture = match &snapshot.soil {
        Some(series) => series.current_pct,
        None => estimate_soil_moisture(location.lat, location.lon, humidity, now.month()).round(),
    };

    let condition = owm
        .and_then(|o| o.condition)
        .or_else(|| {
            wapi.and_then(|w| w.condition_word())
                .map(WeatherCondition::from_text)
        })
        .unwrap_or(WeatherCondition::Clear);
    let description = owm
        .and_then(|o| o.description.clone())
        .or_else(|| wapi.map(|w| w.condition_text.clone()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "Clear sky".to_string());

    let country = owm
        .and_then(|o| o.country.clone())
        .unwrap_or_else(|| "IN".to_string());
    let name = if location.name.trim().is_empty() {
        let place = owm
            .and_then(|o| o.place.clone())
            .unwrap_or_else(|| "Unknown Location".to_string());
        format!("{}, {}", place, country)
    } else {
        location.name.clone()
    };

    let forecast = match &snapshot.forecast {
        Some(points) if !points.is_empty() => {
            daily_forecast(points, snapshot.soil.as_ref(), moisture)
        }
        _ => mock::mock_forecast(
            FALLBACK_FORECAST_BASE_C,
            location.lat,
            location.lon,
            now.date_naive(),
        ),
    };

    let current = CurrentWeather {
        location: Location::new(name, location.lat, location.lon),
        country,
        temperature: Temperature {
            current_c: air_temp.round(),
            feels_like_c: feels_like.round(),
            min_c: min_c.round(),
            max_c: max_c.round(),
        },
        humidity_pct: humidity,
        precipitation: Precipitation {
            probability_pct: probability,
            amount_mm: amount,
        },
        wind: Wind {
            speed_kph: wind_speed.round(),
            direction_deg: wind_direction,
        },
        soil: SoilReading {
            moisture_pct: moisture,
            temperature_c: (air_temp - 3.0).round(),
            advice: soil_advice(moisture, amount),
            measured,
        },
        condition,
        description,
        observed_at: now,
    };

    Ok(ConsolidatedReport {
        current,
        forecast,
        reliability_score: if measured {
            MEASURED_SOIL_RELIABILITY
        } else {
            ESTIMATED_SOIL_RELIABILITY
        },
        origin: DataMode::RealTime,
    })
}

/// Collapse 3-hour steps into per-day summaries keyed on UTC date.
fn daily_forecast(
    points: &[OwmForecastPoint],
    soil: Option<&SoilMoistureSeries>,
    current_moisture: f64,
) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, DailyForecast> = BTreeMap::new();

    for point in points {
        let date = point.timestamp.date_naive();
        let temp = point.temp_c.round();
        days.entry(date)
            .and_modify(|day| {
                day.min_temp_c = day.min_temp_c.min(temp);
                day.max_temp_c = day.max_temp_c.max(temp);
                day.precipitation_mm = day.precipitation_mm.max(point.rain_3h_mm);
            })
            .or_insert_with(|| DailyForecast {
                date,
                min_temp_c: temp,
                max_temp_c: temp,
                humidity_pct: point.humidity_pct,
                precipitation_mm: point.rain_3h_mm,
                soil_moisture_pct: soil
                    .and_then(|s| s.daily_mean_pct.get(&date).copied())
                    .unwrap_or(current_moisture),
                condition: point.condition,
            });
    }

    days.into_values().take(MAX_FORECAST_DAYS).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub openweathermap: bool,
    pub weatherapi: bool,
    pub openmeteo: bool,
    pub nominatim: bool,
}

impl ConnectionStatus {
    pub fn all_connected(&self) -> bool {
        self.openweathermap && self.weatherapi && self.openmeteo && self.nominatim
    }

    pub fn any_connected(&self) -> bool {
        self.openweathermap || self.weatherapi || self.openmeteo || self.nominatim
    }

    /// At least one source of current conditions answers.
    pub fn weather_connected(&self) -> bool {
        self.openweathermap || self.weatherapi
    }
}

/// A report plus how it was obtained.
#[derive(Debug, Clone)]
pub struct WeatherOutcome {
    pub report: ConsolidatedReport,
    pub from_cache: bool,
    /// Set when live data was wanted but mock data was served.
    pub notice: Option<String>,
}

pub struct WeatherService {
    openweathermap_client: Option<OpenWeatherMapClient>,
    weatherapi_client: Option<WeatherApiClient>,
    openmeteo_client: Option<OpenMeteoClient>,
    nominatim_client: NominatimClient,
    mode: DataMode,
    cache: Box<dyn ResponseCache<String, ConsolidatedReport>>,
    clock: Arc<dyn Clock>,
}

impl WeatherService {
    pub fn new(config: &Config) -> Self {
        let openweathermap_client = config
            .openweathermap
            .as_ref()
            .filter(|_| config.openweathermap_key().is_some())
            .map(|c| {
                tracing::info!("OpenWeatherMap client configured");
                OpenWeatherMapClient::new(c.clone())
            });

        let weatherapi_client = config
            .weatherapi
            .as_ref()
            .filter(|_| config.weatherapi_key().is_some())
            .map(|c| {
                tracing::info!("WeatherAPI client configured");
                WeatherApiClient::new(c.clone())
            });

        if openweathermap_client.is_none() && weatherapi_client.is_none() {
            tracing::warn!("No weather API keys configured - mock data will be used");
        }

        let openmeteo_client = config.openmeteo.enabled.then(OpenMeteoClient::new);

        let ttl = chrono::Duration::minutes(config.data.cache_ttl_minutes.max(0));

        Self {
            openweathermap_client,
            weatherapi_client,
            openmeteo_client,
            nominatim_client: NominatimClient::new(config.nominatim.clone()),
            mode: config.data.mode,
            cache: Box::new(TtlCache::new(ttl)),
            clock: Arc::new(SystemClock),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    pub fn with_cache(mut self, cache: Box<dyn ResponseCache<String, ConsolidatedReport>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn set_mode(&mut self, mode: DataMode) {
        if self.mode != mode {
            tracing::info!("Data mode switched to {}", mode);
        }
        self.mode = mode;
    }

    pub fn has_live_provider(&self) -> bool {
        self.openweathermap_client.is_some() || self.weatherapi_client.is_some()
    }

    /// Drop any cached report for `location` so the next fetch goes to the network.
    pub fn invalidate(&mut self, location: &Location) {
        self.cache.remove(&location.cache_key());
    }

    pub async fn report(&mut self, location: &Location) -> WeatherOutcome {
        let now = self.clock.now();

        if self.mode == DataMode::Mock {
            return WeatherOutcome {
                report: mock::mock_report(location, now),
                from_cache: false,
                notice: None,
            };
        }

        if !self.has_live_provider() {
            return WeatherOutcome {
                report: mock::mock_report(location, now),
                from_cache: false,
                notice: Some("No weather API keys configured, showing mock data".into()),
            };
        }

        let key = location.cache_key();
        self.cache.purge_expired(now);
        if let Some(report) = self.cache.get(&key, now) {
            tracing::debug!("Cache hit for {}", key);
            return WeatherOutcome {
                report,
                from_cache: true,
                notice: None,
            };
        }

        let snapshot = self.fetch_snapshot(location, now).await;
        match consolidate(location, snapshot, now) {
            Ok(report) => {
                self.cache.insert(key, report.clone(), now);
                WeatherOutcome {
                    report,
                    from_cache: false,
                    notice: None,
                }
            }
            Err(e) => {
                tracing::warn!("Real-time weather fetch failed, falling back to mock data: {}", e);
                WeatherOutcome {
                    report: mock::mock_report(location, now),
                    from_cache: false,
                    notice: Some("Real-time data unavailable, showing mock data".into()),
                }
            }
        }
    }

    async fn fetch_snapshot(&self, location: &Location, now: DateTime<Utc>) -> ProviderSnapshot {
        let (lat, lon) = (location.lat, location.lon);

        let owm_current = async {
            match &self.openweathermap_client {
                Some(client) => log_failure("OpenWeatherMap", client.fetch_current(lat, lon).await),
                None => None,
            }
        };
        let owm_forecast = async {
            match &self.openweathermap_client {
                Some(client) => {
                    log_failure("OpenWeatherMap forecast", client.fetch_forecast(lat, lon).await)
                }
                None => None,
            }
        };
        let weatherapi = async {
            match &self.weatherapi_client {
                Some(client) => log_failure("WeatherAPI", client.fetch_current(lat, lon).await),
                None => None,
            }
        };
        let soil = async {
            match &self.openmeteo_client {
                Some(client) => {
                    log_failure("Open-Meteo", client.fetch_soil_moisture(lat, lon, now).await)
                        .flatten()
                }
                None => None,
            }
        };

        let (owm_current, forecast, weatherapi, soil) =
            tokio::join!(owm_current, owm_forecast, weatherapi, soil);

        if soil.is_none() {
            tracing::debug!("Soil moisture unavailable, estimating from humidity");
        }

        ProviderSnapshot {
            owm_current,
            weatherapi,
            soil,
            forecast,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PlaceMatch>> {
        self.nominatim_client.search(query).await
    }

    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> String {
        match self.nominatim_client.reverse(lat, lon).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                Location::coordinates_label(lat, lon)
            }
        }
    }

    pub async fn check_connections(&self, location: &Location) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();
        let (lat, lon) = (location.lat, location.lon);

        if let Some(ref client) = self.openweathermap_client {
            status.openweathermap = client.test_connection(lat, lon).await.unwrap_or(false);
        }

        if let Some(ref client) = self.weatherapi_client {
            status.weatherapi = client.test_connection(lat, lon).await.unwrap_or(false);
        }

        if let Some(ref client) = self.openmeteo_client {
            status.openmeteo = client.test_connection(lat, lon).await.unwrap_or(false);
        }

        status.nominatim = self.nominatim_client.test_connection().await.unwrap_or(false);

        status
    }
}

fn log_failure<T>(source: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to fetch {} data: {}", source, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::FixedClock;
    use crate::config::OpenWeatherMapConfig;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 6, 30, 0).unwrap()
    }

    fn pune() -> Location {
        Location::new("Pune, Maharashtra", 18.52, 73.86)
    }

    fn owm() -> OwmCurrent {
        OwmCurrent {
            place: Some("Pune".into()),
            country: Some("IN".into()),
            temp_c: 26.6,
            feels_like_c: 27.4,
            temp_min_c: 25.2,
            temp_max_c: 28.9,
            humidity_pct: 82.0,
            rain_1h_mm: Some(1.5),
            wind_speed_ms: Some(5.0),
            wind_deg: Some(260.0),
            condition: Some(WeatherCondition::Rain),
            description: Some("moderate rain".into()),
        }
    }

    fn weatherapi() -> WeatherApiCurrent {
        WeatherApiCurrent {
            place: Some("Pune".into()),
            country: Some("India".into()),
            temp_c: 30.0,
            feels_like_c: 33.0,
            humidity_pct: 55.0,
            precip_mm: 4.0,
            wind_kph: 12.0,
            wind_degree: 90.0,
            condition_text: "Partly cloudy".into(),
        }
    }

    fn point(hour_offset: i64, temp: f64, rain: f64) -> OwmForecastPoint {
        OwmForecastPoint {
            timestamp: Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap()
                + Duration::hours(hour_offset),
            temp_c: temp,
            humidity_pct: 80.0 + hour_offset as f64,
            rain_3h_mm: rain,
            condition: WeatherCondition::Clouds,
        }
    }

    #[test]
    fn no_current_source_is_an_error() {
        let result = consolidate(&pune(), ProviderSnapshot::default(), now());
        assert!(matches!(result, Err(KisaanError::NoWeatherData)));
    }

    #[test]
    fn owm_takes_priority() {
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            weatherapi: Some(weatherapi()),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        let current = &report.current;

        assert_eq!(current.temperature.current_c, 27.0);
        assert_eq!(current.temperature.min_c, 25.0);
        assert_eq!(current.humidity_pct, 82.0);
        assert_eq!(current.wind.speed_kph, 18.0);
        assert_eq!(current.wind.direction_deg, 260.0);
        assert_eq!(current.condition, WeatherCondition::Rain);
        // WeatherAPI precipitation wins for the probability.
        assert_eq!(current.precipitation.probability_pct, 40.0);
        assert_eq!(current.precipitation.amount_mm, 4.0);
        assert_eq!(current.location.name, "Pune, Maharashtra");
        assert_eq!(current.soil.temperature_c, 24.0);
        assert_eq!(report.origin, DataMode::RealTime);
    }

    #[test]
    fn weatherapi_alone_is_enough() {
        let snapshot = ProviderSnapshot {
            weatherapi: Some(weatherapi()),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        let current = &report.current;

        assert_eq!(current.temperature.current_c, 30.0);
        assert_eq!(current.temperature.min_c, 25.0);
        assert_eq!(current.temperature.max_c, 35.0);
        assert_eq!(current.humidity_pct, 55.0);
        assert_eq!(current.wind.speed_kph, 12.0);
        assert_eq!(current.condition, WeatherCondition::Other);
        assert_eq!(current.description, "Partly cloudy");
        assert_eq!(current.country, "IN");
    }

    #[test]
    fn rain_probability_falls_back_to_owm_then_default() {
        let mut dry_wapi = weatherapi();
        dry_wapi.precip_mm = 0.0;
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            weatherapi: Some(dry_wapi),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        assert_eq!(report.current.precipitation.probability_pct, 30.0);
        assert_eq!(report.current.precipitation.amount_mm, 1.5);

        let mut dry_owm = owm();
        dry_owm.rain_1h_mm = None;
        let snapshot = ProviderSnapshot {
            owm_current: Some(dry_owm),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        assert_eq!(report.current.precipitation.probability_pct, 20.0);
        assert_eq!(report.current.precipitation.amount_mm, 0.0);
    }

    #[test]
    fn measured_soil_raises_reliability() {
        let series = SoilMoistureSeries {
            current_pct: 41.0,
            daily_mean_pct: BTreeMap::new(),
        };
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            soil: Some(series),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        assert_eq!(report.reliability_score, 97);
        assert_eq!(report.current.soil.moisture_pct, 41.0);
        assert!(report.current.soil.measured);
    }

    #[test]
    fn estimated_soil_uses_humidity() {
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        assert_eq!(report.reliability_score, 95);
        assert!(!report.current.soil.measured);
        let expected = estimate_soil_moisture(18.52, 73.86, 82.0, 8).round();
        assert_eq!(report.current.soil.moisture_pct, expected);
    }

    #[test]
    fn blank_name_uses_provider_place() {
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            ..Default::default()
        };
        let nameless = Location::new("", 18.52, 73.86);
        let report = consolidate(&nameless, snapshot, now()).unwrap();
        assert_eq!(report.current.location.name, "Pune, IN");
    }

    #[test]
    fn forecast_groups_by_day() {
        let mut daily = BTreeMap::new();
        daily.insert(NaiveDate::from_ymd_opt(2025, 8, 11).unwrap(), 44.0);
        let series = SoilMoistureSeries {
            current_pct: 38.0,
            daily_mean_pct: daily,
        };
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            soil: Some(series),
            forecast: Some(vec![
                point(0, 24.4, 0.0),
                point(3, 27.6, 2.0),
                point(6, 29.2, 0.5),
                point(24, 23.0, 0.0),
            ]),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();

        assert_eq!(report.forecast.len(), 2);
        let first = &report.forecast[0];
        assert_eq!(first.min_temp_c, 24.0);
        assert_eq!(first.max_temp_c, 29.0);
        assert_eq!(first.precipitation_mm, 2.0);
        assert_eq!(first.humidity_pct, 80.0);
        assert_eq!(first.soil_moisture_pct, 38.0);
        assert_eq!(report.forecast[1].soil_moisture_pct, 44.0);
    }

    #[test]
    fn missing_forecast_is_synthesized() {
        let snapshot = ProviderSnapshot {
            owm_current: Some(owm()),
            ..Default::default()
        };
        let report = consolidate(&pune(), snapshot, now()).unwrap();
        assert_eq!(report.forecast.len(), 14);
        assert_eq!(report.forecast[0].date, now().date_naive());
    }

    #[test]
    fn connection_status_helpers() {
        let status = ConnectionStatus {
            weatherapi: true,
            ..Default::default()
        };
        assert!(status.any_connected());
        assert!(status.weather_connected());
        assert!(!status.all_connected());
        assert!(!ConnectionStatus::default().any_connected());
    }

    #[tokio::test]
    async fn mock_mode_never_touches_the_network() {
        let mut config = Config::default();
        config.data.mode = DataMode::Mock;
        let clock = Arc::new(FixedClock::at(now()));
        let mut service = WeatherService::new(&config).with_clock(clock);

        let outcome = service.report(&pune()).await;
        assert_eq!(outcome.report.origin, DataMode::Mock);
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.report.current.observed_at, now());
    }

    #[tokio::test]
    async fn missing_keys_fall_back_with_notice() {
        let config = Config::default();
        let mut service =
            WeatherService::new(&config).with_clock(Arc::new(FixedClock::at(now())));

        let outcome = service.report(&pune()).await;
        assert_eq!(outcome.report.origin, DataMode::Mock);
        assert!(outcome.notice.is_some());
    }

    #[tokio::test]
    async fn fresh_cache_entry_is_served() {
        let mut config = Config::default();
        config.openweathermap = Some(OpenWeatherMapConfig {
            api_key: "test".into(),
            enabled: true,
        });
        let clock = Arc::new(FixedClock::at(now()));

        let mut cached = consolidate(
            &pune(),
            ProviderSnapshot {
                owm_current: Some(owm()),
                ..Default::default()
            },
            now(),
        )
        .unwrap();
        cached.reliability_score = 42;

        let mut cache: TtlCache<String, ConsolidatedReport> = TtlCache::default();
        cache.insert(pune().cache_key(), cached, now());

        let mut service = WeatherService::new(&config)
            .with_clock(clock.clone())
            .with_cache(Box::new(cache));

        clock.advance(Duration::minutes(5));
        let outcome = service.report(&pune()).await;
        assert!(outcome.from_cache);
        assert_eq!(outcome.report.reliability_score, 42);
    }
}
