use super::conditions::CurrentConditions;
use super::season::Season;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive `[low, high]` range. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

impl From<[f64; 2]> for Band {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

impl From<Band> for [f64; 2] {
    fn from(band: Band) -> Self {
        [band.low, band.high]
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Agronomic envelope a crop is viable within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub temperature_c: Band,
    pub humidity_pct: Band,
    pub soil_moisture_pct: Band,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainPreference {
    #[default]
    Indifferent,
    Wet,
    Dry,
    /// Prefers rain while Kharif is active, dry weather otherwise.
    Monsoonal,
}

impl RainPreference {
    /// Collapse to the tri-state the evaluator scores against.
    pub fn resolve(&self, kharif_active: bool) -> Option<bool> {
        match self {
            RainPreference::Indifferent => None,
            RainPreference::Wet => Some(true),
            RainPreference::Dry => Some(false),
            RainPreference::Monsoonal => Some(kharif_active),
        }
    }
}

/// Scalar guard checked after scoring. Every set bound must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraGate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_humidity_pct: Option<f64>,
}

impl ExtraGate {
    pub fn allows(&self, conditions: &CurrentConditions) -> bool {
        if let Some(min) = self.min_temperature_c {
            if conditions.temperature_c < min {
                return false;
            }
        }
        if let Some(max) = self.max_temperature_c {
            if conditions.temperature_c > max {
                return false;
            }
        }
        if let Some(min) = self.min_humidity_pct {
            if conditions.humidity_pct < min {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropCategory {
    Cereal,
    Pulse,
    Oilseed,
    Vegetable,
    Spice,
    Fruit,
    CashCrop,
    Fodder,
    Specialty,
}

impl CropCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropCategory::Cereal => "Cereal",
            CropCategory::Pulse => "Pulse",
            CropCategory::Oilseed => "Oilseed",
            CropCategory::Vegetable => "Vegetable",
            CropCategory::Spice => "Spice",
            CropCategory::Fruit => "Fruit",
            CropCategory::CashCrop => "Cash Crop",
            CropCategory::Fodder => "Fodder",
            CropCategory::Specialty => "Specialty",
        }
    }
}

impl std::fmt::Display for CropCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterRequirement {
    Low,
    Medium,
    High,
}

impl WaterRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterRequirement::Low => "Low",
            WaterRequirement::Medium => "Medium",
            WaterRequirement::High => "High",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            WaterRequirement::Low => Color::Yellow,
            WaterRequirement::Medium => Color::Green,
            WaterRequirement::High => Color::LightBlue,
        }
    }
}

/// Reference text carried through to suggestions untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDetails {
    /// Fixed label. Rotating crops leave this unset and get "<Season> season".
    #[serde(default)]
    pub season: Option<String>,
    pub sowing_time: String,
    pub harvest_time: String,
    pub water_requirement: WaterRequirement,
    pub expected_yield: String,
    pub market_price: String,
    pub soil_requirement: String,
    pub climate_requirement: String,
    pub spacing: String,
    pub seeds: String,
    pub fertilizer: String,
    pub pest_management: String,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Per-season overrides of the calendar text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonVariant {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub sowing_time: Option<String>,
    #[serde(default)]
    pub harvest_time: Option<String>,
}

fn default_gated() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropTemplate {
    pub name: String,
    pub category: CropCategory,
    pub envelope: Envelope,
    #[serde(default)]
    pub rain: RainPreference,
    /// Candidate seasons. The last entry is the fallback label for ungated crops.
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default = "default_gated")]
    pub gated: bool,
    /// Label for an ungated crop when none of its seasons is active.
    #[serde(default)]
    pub off_season: Option<String>,
    #[serde(default)]
    pub perennial: bool,
    #[serde(default)]
    pub extra_gate: Option<ExtraGate>,
    pub details: CropDetails,
    #[serde(default)]
    pub variants: BTreeMap<Season, SeasonVariant>,
}

impl CropTemplate {
    /// Whether the season gate restricts evaluation.
    pub fn is_gated(&self) -> bool {
        self.gated && !self.seasons.is_empty()
    }

    /// Reasons this template cannot be scored, empty when well-formed.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push("name is empty".to_string());
        }

        let bands = [
            ("temperature_c", self.envelope.temperature_c),
            ("humidity_pct", self.envelope.humidity_pct),
            ("soil_moisture_pct", self.envelope.soil_moisture_pct),
        ];
        for (label, band) in bands {
            if !band.is_valid() {
                problems.push(format!(
                    "{} band [{}, {}] must be finite with low <= high",
                    label, band.low, band.high
                ));
            }
        }

        if self.seasons.is_empty() && !self.perennial {
            problems.push("no seasons listed and not perennial".to_string());
        }

        if (self.perennial || self.seasons.len() == 1) && self.details.season.is_none() {
            problems.push("fixed-season crop needs a details.season label".to_string());
        }

        for season in self.variants.keys() {
            if !self.seasons.contains(season) {
                problems.push(format!("variant for unlisted season {}", season));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
name: "Rice (Paddy)"
category: cereal
envelope:
  temperature_c: [20, 37]
  humidity_pct: [50, 85]
  soil_moisture_pct: [60, 90]
rain: wet
seasons: [kharif]
details:
  season: "Kharif (Monsoon)"
  sowing_time: "June-July"
  harvest_time: "November-December"
  water_requirement: high
  expected_yield: "4-6 tons/hectare"
  market_price: "2,000-2,500/quintal"
  soil_requirement: "Clay loam"
  climate_requirement: "20-37C"
  spacing: "20cm x 15cm"
  seeds: "25-30 kg/hectare"
  fertilizer: "NPK 120:60:40"
  pest_management: "Stem borer"
"#;

    #[test]
    fn template_parses_with_defaults() {
        let template: CropTemplate = serde_yaml::from_str(TEMPLATE).unwrap();
        assert_eq!(template.envelope.temperature_c, Band::new(20.0, 37.0));
        assert_eq!(template.rain, RainPreference::Wet);
        assert!(template.gated);
        assert!(template.is_gated());
        assert!(!template.perennial);
        assert!(template.extra_gate.is_none());
        assert!(template.variants.is_empty());
        assert!(template.details.tips.is_empty());
        assert!(template.problems().is_empty());
    }

    #[test]
    fn inverted_band_is_reported() {
        let mut template: CropTemplate = serde_yaml::from_str(TEMPLATE).unwrap();
        template.envelope.humidity_pct = Band::new(80.0, 50.0);
        let problems = template.problems();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("humidity_pct"));
    }

    #[test]
    fn band_bounds_are_inclusive() {
        let band = Band::new(20.0, 30.0);
        assert!(band.contains(20.0));
        assert!(band.contains(30.0));
        assert!(!band.contains(30.01));
        assert!((band.midpoint() - 25.0).abs() < 1e-9);
        assert!((band.width() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn monsoonal_rain_follows_kharif() {
        assert_eq!(RainPreference::Monsoonal.resolve(true), Some(true));
        assert_eq!(RainPreference::Monsoonal.resolve(false), Some(false));
        assert_eq!(RainPreference::Indifferent.resolve(true), None);
        assert_eq!(RainPreference::Dry.resolve(true), Some(false));
    }

    #[test]
    fn extra_gate_checks_every_bound() {
        let gate = ExtraGate {
            min_temperature_c: Some(20.0),
            max_temperature_c: None,
            min_humidity_pct: Some(75.0),
        };
        assert!(gate.allows(&CurrentConditions::new(20.0, 75.0, 0.0, 50.0)));
        assert!(!gate.allows(&CurrentConditions::new(19.9, 80.0, 0.0, 50.0)));
        assert!(!gate.allows(&CurrentConditions::new(25.0, 74.0, 0.0, 50.0)));

        let apple = ExtraGate {
            max_temperature_c: Some(24.0),
            ..Default::default()
        };
        assert!(apple.allows(&CurrentConditions::new(24.0, 70.0, 0.0, 70.0)));
        assert!(!apple.allows(&CurrentConditions::new(24.5, 70.0, 0.0, 70.0)));
    }
}
