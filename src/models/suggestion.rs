use super::crop::{CropCategory, WaterRequirement};
use super::season::CropType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuitabilityTier {
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl SuitabilityTier {
    /// Map a rounded confidence to its tier.
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            85.. => SuitabilityTier::Excellent,
            70..=84 => SuitabilityTier::Good,
            55..=69 => SuitabilityTier::Moderate,
            _ => SuitabilityTier::Poor,
        }
    }

    /// Sort rank, higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            SuitabilityTier::Excellent => 4,
            SuitabilityTier::Good => 3,
            SuitabilityTier::Moderate => 2,
            SuitabilityTier::Poor => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuitabilityTier::Excellent => "Excellent",
            SuitabilityTier::Good => "Good",
            SuitabilityTier::Moderate => "Moderate",
            SuitabilityTier::Poor => "Poor",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            SuitabilityTier::Excellent => Color::Green,
            SuitabilityTier::Good => Color::Cyan,
            SuitabilityTier::Moderate => Color::Yellow,
            SuitabilityTier::Poor => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SuitabilityTier::Excellent => "★",
            SuitabilityTier::Good => "●",
            SuitabilityTier::Moderate => "◐",
            SuitabilityTier::Poor => "○",
        }
    }
}

impl std::fmt::Display for SuitabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weighted contribution of each factor to the confidence total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub rain: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.temperature + self.humidity + self.soil_moisture + self.rain
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSuggestion {
    pub name: String,
    #[serde(rename = "type")]
    pub crop_type: CropType,
    pub suitability: SuitabilityTier,
    pub confidence: u8,
    pub season: String,
    pub category: CropCategory,
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
    pub challenges: Vec<String>,
    pub benefits: Vec<String>,
    pub tips: Vec<String>,
    pub breakdown: ScoreBreakdown,
    pub rationale: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(SuitabilityTier::from_confidence(100), SuitabilityTier::Excellent);
        assert_eq!(SuitabilityTier::from_confidence(85), SuitabilityTier::Excellent);
        assert_eq!(SuitabilityTier::from_confidence(84), SuitabilityTier::Good);
        assert_eq!(SuitabilityTier::from_confidence(70), SuitabilityTier::Good);
        assert_eq!(SuitabilityTier::from_confidence(69), SuitabilityTier::Moderate);
        assert_eq!(SuitabilityTier::from_confidence(55), SuitabilityTier::Moderate);
        assert_eq!(SuitabilityTier::from_confidence(54), SuitabilityTier::Poor);
        assert_eq!(SuitabilityTier::from_confidence(0), SuitabilityTier::Poor);
    }

    #[test]
    fn tier_rank_matches_ordering() {
        let mut tiers = vec![
            SuitabilityTier::Good,
            SuitabilityTier::Poor,
            SuitabilityTier::Excellent,
            SuitabilityTier::Moderate,
        ];
        tiers.sort();
        let ranks: Vec<u8> = tiers.iter().map(|t| t.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&SuitabilityTier::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
    }
}
