//! Deterministic, location-seeded weather used when live providers are
//! unavailable or mock mode is selected.

use crate::models::{
    ConsolidatedReport, CurrentWeather, DailyForecast, DataMode, Location, Precipitation,
    SoilReading, Temperature, WeatherCondition, Wind,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::f64::consts::PI;

pub const MOCK_RELIABILITY: u8 = 88;
pub const FORECAST_DAYS: usize = 14;
const FORECAST_SEED_OFFSET: u64 = 100;

/// Pseudo-random sequence keyed on coordinates.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: f64,
    counter: u64,
}

impl SeededRng {
    pub fn for_location(lat: f64, lon: f64) -> Self {
        Self {
            seed: ((lat * 1000.0 + lon * 1000.0) * 1000.0).floor(),
            counter: 0,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.counter = offset;
        self
    }

    /// Next value in [0, 1).
    pub fn next_value(&mut self) -> f64 {
        let x = (self.seed + self.counter as f64).sin() * 10000.0;
        self.counter += 1;
        x - x.floor()
    }
}

pub fn region_name(lat: f64, lon: f64) -> String {
    let within = |lat_lo: f64, lat_hi: f64, lon_lo: f64, lon_hi: f64| {
        lat > lat_lo && lat < lat_hi && lon > lon_lo && lon < lon_hi
    };
    if within(28.0, 32.0, 76.0, 78.0) {
        "Delhi Region".to_string()
    } else if within(18.0, 20.0, 72.0, 74.0) {
        "Mumbai Region".to_string()
    } else if within(12.0, 14.0, 77.0, 78.0) {
        "Bangalore Region".to_string()
    } else if within(13.0, 14.0, 80.0, 81.0) {
        "Chennai Region".to_string()
    } else {
        format!("Location {:.2}, {:.2}", lat, lon)
    }
}

pub fn regional_soil_note(lat: f64) -> &'static str {
    if lat > 20.0 {
        "Northern region soil conditions. Monitor for winter crop suitability."
    } else if lat < 15.0 {
        "Southern region soil conditions. Optimal for tropical crop cultivation."
    } else {
        "Central region soil conditions. Suitable for diverse crop varieties."
    }
}

/// Typical sky for the month (1-indexed).
pub fn seasonal_condition(month: u32) -> (WeatherCondition, &'static str) {
    match month {
        7..=10 => (
            WeatherCondition::Rain,
            "Monsoon season with scattered showers",
        ),
        11 | 12 | 1..=3 => (WeatherCondition::Clear, "Clear skies with pleasant weather"),
        _ => (
            WeatherCondition::Clouds,
            "Partly cloudy with warm temperatures",
        ),
    }
}

/// Fourteen days of synthetic forecast starting at `start`.
pub fn mock_forecast(base_temp_c: f64, lat: f64, lon: f64, start: NaiveDate) -> Vec<DailyForecast> {
    let mut rng = SeededRng::for_location(lat, lon).with_offset(FORECAST_SEED_OFFSET);
    const CONDITIONS: [WeatherCondition; 3] = [
        WeatherCondition::Clear,
        WeatherCondition::Clouds,
        WeatherCondition::Rain,
    ];

    (0..FORECAST_DAYS)
        .map(|day| {
            let variation = (rng.next_value() - 0.5) * 6.0;
            let humidity = (50.0 + (rng.next_value() - 0.5) * 30.0).round();
            let precipitation = rng.next_value() * 12.0;
            let soil = (25.0 + rng.next_value() * 35.0).round();
            let pick = ((rng.next_value() * 3.0).floor() as usize).min(2);

            DailyForecast {
                date: start + Duration::days(day as i64),
                min_temp_c: (base_temp_c - 4.0 + variation).round(),
                max_temp_c: (base_temp_c + 6.0 + variation).round(),
                humidity_pct: humidity,
                precipitation_mm: precipitation,
                soil_moisture_pct: soil,
                condition: CONDITIONS[pick],
            }
        })
        .collect()
}

/// Full synthetic report for a location at the given instant.
pub fn mock_report(location: &Location, now: DateTime<Utc>) -> ConsolidatedReport {
    let (lat, lon) = (location.lat, location.lon);
    let mut rng = SeededRng::for_location(lat, lon);

    let base = 30.0 - (lat - 20.0).abs() * 0.5 + (rng.next_value() - 0.5) * 8.0;
    let humidity = 45.0 + (lat - 15.0).abs() * 1.5 + rng.next_value() * 20.0;
    let wind_speed = 8.0 + rng.next_value() * 12.0;

    let month = now.month();
    let month0 = month as f64 - 1.0;
    let seasonal = ((month0 - 3.0) * PI / 6.0).sin() * 8.0;
    let temp = (base + seasonal).round();

    let feels_like = (temp + (rng.next_value() - 0.5) * 6.0).round();
    let probability = (rng.next_value() * 100.0).round();
    let amount = rng.next_value() * 8.0;
    let direction = (rng.next_value() * 360.0).round();
    // Second bearing draw, unused.
    rng.next_value();
    let moisture = (25.0 + rng.next_value() * 35.0).round();

    let name = if location.name.trim().is_empty() {
        region_name(lat, lon)
    } else {
        location.name.clone()
    };
    let (condition, description) = seasonal_condition(month);

    let current = CurrentWeather {
        location: Location::new(name, lat, lon),
        country: "IN".to_string(),
        temperature: Temperature {
            current_c: temp,
            feels_like_c: feels_like,
            min_c: temp - 5.0,
            max_c: temp + 8.0,
        },
        humidity_pct: humidity.clamp(30.0, 90.0).round(),
        precipitation: Precipitation {
            probability_pct: probability,
            amount_mm: amount,
        },
        wind: Wind {
            speed_kph: wind_speed.round(),
            direction_deg: direction,
        },
        soil: SoilReading {
            moisture_pct: moisture,
            temperature_c: temp - 2.0,
            advice: regional_soil_note(lat).to_string(),
            measured: false,
        },
        condition,
        description: description.to_string(),
        observed_at: now,
    };

    ConsolidatedReport {
        current,
        forecast: mock_forecast(temp, lat, lon, now.date_naive()),
        reliability_score: MOCK_RELIABILITY,
        origin: DataMode::Mock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn july() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 15, 6, 0, 0).unwrap()
    }

    #[test]
    fn rng_is_deterministic_and_bounded() {
        let mut a = SeededRng::for_location(28.61, 77.21);
        let mut b = SeededRng::for_location(28.61, 77.21);
        for _ in 0..50 {
            let (x, y) = (a.next_value(), b.next_value());
            assert_eq!(x, y);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn same_location_same_report() {
        let delhi = Location::new("New Delhi", 28.61, 77.21);
        assert_eq!(mock_report(&delhi, july()), mock_report(&delhi, july()));
    }

    #[test]
    fn report_values_are_plausible() {
        let pune = Location::new("Pune", 18.52, 73.86);
        let report = mock_report(&pune, july());
        let current = &report.current;

        assert_eq!(report.origin, DataMode::Mock);
        assert_eq!(report.reliability_score, 88);
        assert_eq!(report.forecast.len(), 14);
        assert!((30.0..=90.0).contains(&current.humidity_pct));
        assert!((0.0..=100.0).contains(&current.precipitation.probability_pct));
        assert!((25.0..=60.0).contains(&current.soil.moisture_pct));
        assert!((8.0..=20.0).contains(&current.wind.speed_kph));
        assert_eq!(current.temperature.max_c - current.temperature.min_c, 13.0);
        assert_eq!(current.condition, WeatherCondition::Rain);
        assert!(!current.soil.measured);
        assert!(current.conditions().is_finite());
    }

    #[test]
    fn soil_moisture_is_the_ninth_draw() {
        let (lat, lon) = (22.57, 88.36);
        let report = mock_report(&Location::new("Kolkata", lat, lon), july());

        let mut rng = SeededRng::for_location(lat, lon);
        let draws: Vec<f64> = (0..9).map(|_| rng.next_value()).collect();

        assert_eq!(report.current.wind.direction_deg, (draws[6] * 360.0).round());
        assert_eq!(
            report.current.soil.moisture_pct,
            (25.0 + draws[8] * 35.0).round()
        );
    }

    #[test]
    fn forecast_starts_today_and_is_consecutive() {
        let report = mock_report(&Location::new("Chennai", 13.08, 80.27), july());
        let start = july().date_naive();
        for (i, day) in report.forecast.iter().enumerate() {
            assert_eq!(day.date, start + Duration::days(i as i64));
            assert!(day.max_temp_c - day.min_temp_c == 10.0);
        }
    }

    #[test]
    fn region_names() {
        assert_eq!(region_name(28.6, 77.2), "Delhi Region");
        assert_eq!(region_name(19.0, 72.8), "Mumbai Region");
        assert_eq!(region_name(12.9, 77.5), "Bangalore Region");
        assert_eq!(region_name(13.5, 80.5), "Chennai Region");
        assert_eq!(region_name(22.57, 88.36), "Location 22.57, 88.36");
    }

    #[test]
    fn empty_name_uses_region() {
        let report = mock_report(&Location::new("", 28.6, 77.2), july());
        assert_eq!(report.current.location.name, "Delhi Region");
    }

    #[test]
    fn seasonal_sky() {
        assert_eq!(seasonal_condition(8).0, WeatherCondition::Rain);
        assert_eq!(seasonal_condition(1).0, WeatherCondition::Clear);
        assert_eq!(seasonal_condition(12).0, WeatherCondition::Clear);
        assert_eq!(seasonal_condition(5).0, WeatherCondition::Clouds);
    }
}
