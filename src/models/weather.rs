use super::conditions::CurrentConditions;
use super::location::Location;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where weather readings come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataMode {
    #[default]
    RealTime,
    Mock,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::RealTime => "Live Data",
            DataMode::Mock => "Mock Data",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DataMode::RealTime => DataMode::Mock,
            DataMode::Mock => DataMode::RealTime,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            DataMode::RealTime => "real_time",
            DataMode::Mock => "mock",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "real_time" | "real-time" | "live" => Some(DataMode::RealTime),
            "mock" => Some(DataMode::Mock),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weather condition categories shared by all providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Other,
}

impl WeatherCondition {
    pub fn from_owm_id(id: u32) -> Self {
        match id {
            200..=232 => WeatherCondition::Thunderstorm,
            300..=321 => WeatherCondition::Drizzle,
            500..=531 => WeatherCondition::Rain,
            600..=622 => WeatherCondition::Snow,
            701 => WeatherCondition::Mist,
            741 => WeatherCondition::Fog,
            800 => WeatherCondition::Clear,
            801..=804 => WeatherCondition::Clouds,
            _ => WeatherCondition::Other,
        }
    }

    /// Parse a free-text condition such as OWM's `main` or WeatherAPI's text.
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("thunder") {
            WeatherCondition::Thunderstorm
        } else if lower.contains("drizzle") {
            WeatherCondition::Drizzle
        } else if lower.contains("rain") || lower.contains("shower") {
            WeatherCondition::Rain
        } else if lower.contains("snow") || lower.contains("sleet") {
            WeatherCondition::Snow
        } else if lower.contains("fog") {
            WeatherCondition::Fog
        } else if lower.contains("mist") || lower.contains("haze") {
            WeatherCondition::Mist
        } else if lower.contains("cloud") || lower.contains("overcast") {
            WeatherCondition::Clouds
        } else if lower.contains("clear") || lower.contains("sunny") {
            WeatherCondition::Clear
        } else {
            WeatherCondition::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Clouds => "Cloudy",
            WeatherCondition::Rain => "Rain",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Thunderstorm => "Thunderstorm",
            WeatherCondition::Snow => "Snow",
            WeatherCondition::Mist => "Mist",
            WeatherCondition::Fog => "Fog",
            WeatherCondition::Other => "Other",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "☀",
            WeatherCondition::Clouds => "☁",
            WeatherCondition::Rain => "🌧",
            WeatherCondition::Drizzle => "🌦",
            WeatherCondition::Thunderstorm => "⛈",
            WeatherCondition::Snow => "❄",
            WeatherCondition::Mist => "🌫",
            WeatherCondition::Fog => "🌫",
            WeatherCondition::Other => "?",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub current_c: f64,
    pub feels_like_c: f64,
    pub min_c: f64,
    pub max_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    pub probability_pct: f64,
    pub amount_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_kph: f64,
    pub direction_deg: f64,
}

impl Wind {
    pub fn compass(&self) -> &'static str {
        const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
        let index = (self.direction_deg.rem_euclid(360.0) / 45.0).round() as usize % 8;
        DIRECTIONS[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilStatus {
    Dry,
    Moderate,
    Optimal,
}

impl SoilStatus {
    pub fn from_moisture(moisture_pct: f64) -> Self {
        if moisture_pct < 20.0 {
            SoilStatus::Dry
        } else if moisture_pct < 40.0 {
            SoilStatus::Moderate
        } else {
            SoilStatus::Optimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilStatus::Dry => "Dry",
            SoilStatus::Moderate => "Moderate",
            SoilStatus::Optimal => "Optimal",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            SoilStatus::Dry => Color::Red,
            SoilStatus::Moderate => Color::Yellow,
            SoilStatus::Optimal => Color::Green,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub moisture_pct: f64,
    pub temperature_c: f64,
    pub advice: String,
    /// False when moisture was estimated rather than measured.
    pub measured: bool,
}

impl SoilReading {
    pub fn status(&self) -> SoilStatus {
        SoilStatus::from_moisture(self.moisture_pct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub country: String,
    pub temperature: Temperature,
    pub humidity_pct: f64,
    pub precipitation: Precipitation,
    pub wind: Wind,
    pub soil: SoilReading,
    pub condition: WeatherCondition,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

impl CurrentWeather {
    /// The four readings the crop advisor scores against.
    pub fn conditions(&self) -> CurrentConditions {
        CurrentConditions::new(
            self.temperature.current_c,
            self.humidity_pct,
            self.precipitation.probability_pct,
            self.soil.moisture_pct,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub humidity_pct: f64,
    pub precipitation_mm: f64,
    pub soil_moisture_pct: f64,
    pub condition: WeatherCondition,
}

impl DailyForecast {
    pub fn avg_temp_c(&self) -> f64 {
        (self.min_temp_c + self.max_temp_c) / 2.0
    }
}

/// Merged current conditions plus forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub current: CurrentWeather,
    pub forecast: Vec<DailyForecast>,
    pub reliability_score: u8,
    pub origin: DataMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_points() {
        let wind = |deg| Wind {
            speed_kph: 10.0,
            direction_deg: deg,
        };
        assert_eq!(wind(0.0).compass(), "N");
        assert_eq!(wind(44.0).compass(), "NE");
        assert_eq!(wind(180.0).compass(), "S");
        assert_eq!(wind(350.0).compass(), "N");
        assert_eq!(wind(315.0).compass(), "NW");
    }

    #[test]
    fn soil_status_bands() {
        assert_eq!(SoilStatus::from_moisture(19.9), SoilStatus::Dry);
        assert_eq!(SoilStatus::from_moisture(20.0), SoilStatus::Moderate);
        assert_eq!(SoilStatus::from_moisture(39.0), SoilStatus::Moderate);
        assert_eq!(SoilStatus::from_moisture(40.0), SoilStatus::Optimal);
    }

    #[test]
    fn condition_from_text() {
        assert_eq!(WeatherCondition::from_text("Patchy rain possible"), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_text("Partly cloudy"), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::from_text("Sunny"), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_owm_id(501), WeatherCondition::Rain);
    }

    #[test]
    fn data_mode_round_trips_through_key() {
        for mode in [DataMode::RealTime, DataMode::Mock] {
            assert_eq!(DataMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(DataMode::RealTime.toggled(), DataMode::Mock);
    }
}
