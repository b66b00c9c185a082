use serde::{Deserialize, Serialize};

/// Precipitation probability above which rain counts as expected.
pub const RAIN_EXPECTED_THRESHOLD_PCT: f64 = 50.0;

/// Normalized readings the crop advisor scores against.
///
/// All fields must be finite. Callers check `is_finite` before ranking;
/// the advisor itself does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub precipitation_probability_pct: f64,
    pub soil_moisture_pct: f64,
}

impl CurrentConditions {
    pub fn new(
        temperature_c: f64,
        humidity_pct: f64,
        precipitation_probability_pct: f64,
        soil_moisture_pct: f64,
    ) -> Self {
        Self {
            temperature_c,
            humidity_pct,
            precipitation_probability_pct,
            soil_moisture_pct,
        }
    }

    pub fn rain_expected(&self) -> bool {
        self.precipitation_probability_pct > RAIN_EXPECTED_THRESHOLD_PCT
    }

    pub fn is_finite(&self) -> bool {
        self.temperature_c.is_finite()
            && self.humidity_pct.is_finite()
            && self.precipitation_probability_pct.is_finite()
            && self.soil_moisture_pct.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_expected_is_strictly_above_half() {
        assert!(!CurrentConditions::new(25.0, 60.0, 50.0, 40.0).rain_expected());
        assert!(CurrentConditions::new(25.0, 60.0, 50.1, 40.0).rain_expected());
    }

    #[test]
    fn non_finite_readings_are_detected() {
        assert!(CurrentConditions::new(25.0, 60.0, 20.0, 40.0).is_finite());
        assert!(!CurrentConditions::new(f64::NAN, 60.0, 20.0, 40.0).is_finite());
        assert!(!CurrentConditions::new(25.0, 60.0, 20.0, f64::INFINITY).is_finite());
    }
}
