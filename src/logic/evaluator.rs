//! Weighted partial-credit scoring of one crop envelope against current conditions.
//!
//! Four independent sub-scores, each in 0..=100, are weighted and summed:
//!
//! - Temperature (40%): inside the band, 100 at the midpoint falling linearly
//!   to 75 at either edge. Outside the band, `20 - 2 * |t - low|`, floored at 0.
//!   The penalty is measured from the low bound even when the reading is above
//!   the high bound.
//! - Humidity (25%) and soil moisture (25%): 100 inside the band, otherwise
//!   `50 - |x - low|`, floored at 0.
//! - Rain (10%): 75 when the crop is indifferent, 100 when the preference
//!   matches whether rain is expected, 50 when it does not.

use crate::models::{
    Band, CurrentConditions, Envelope, ScoreBreakdown, SuitabilityTier,
};

pub const TEMPERATURE_WEIGHT: f64 = 0.40;
pub const HUMIDITY_WEIGHT: f64 = 0.25;
pub const SOIL_MOISTURE_WEIGHT: f64 = 0.25;
pub const RAIN_WEIGHT: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub confidence: u8,
    pub tier: SuitabilityTier,
    pub breakdown: ScoreBreakdown,
}

pub fn temperature_score(band: &Band, temperature_c: f64) -> f64 {
    if band.contains(temperature_c) {
        let width = band.width();
        if width == 0.0 {
            return 100.0;
        }
        100.0 - (temperature_c - band.midpoint()).abs() / width * 50.0
    } else {
        (20.0 - (temperature_c - band.low).abs() * 2.0).max(0.0)
    }
}

/// Flat credit inside the band, linear decay from the low bound outside it.
pub fn band_score(band: &Band, value: f64) -> f64 {
    if band.contains(value) {
        100.0
    } else {
        (50.0 - (value - band.low).abs()).max(0.0)
    }
}

pub fn rain_score(preference: Option<bool>, rain_expected: bool) -> f64 {
    match preference {
        None => 75.0,
        Some(wants_rain) if wants_rain == rain_expected => 100.0,
        Some(_) => 50.0,
    }
}

pub fn evaluate(
    envelope: &Envelope,
    rain_preference: Option<bool>,
    conditions: &CurrentConditions,
) -> Evaluation {
    let breakdown = ScoreBreakdown {
        temperature: temperature_score(&envelope.temperature_c, conditions.temperature_c)
            * TEMPERATURE_WEIGHT,
        humidity: band_score(&envelope.humidity_pct, conditions.humidity_pct) * HUMIDITY_WEIGHT,
        soil_moisture: band_score(&envelope.soil_moisture_pct, conditions.soil_moisture_pct)
            * SOIL_MOISTURE_WEIGHT,
        rain: rain_score(rain_preference, conditions.rain_expected()) * RAIN_WEIGHT,
    };

    let confidence = breakdown.total().round().clamp(0.0, 100.0) as u8;

    Evaluation {
        confidence,
        tier: SuitabilityTier::from_confidence(confidence),
        breakdown,
    }
}

/// Human-readable reasons behind a score.
pub fn rationale(
    envelope: &Envelope,
    rain_preference: Option<bool>,
    conditions: &CurrentConditions,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);

    lines.push(describe_band(
        "Temperature",
        conditions.temperature_c,
        "°C",
        &envelope.temperature_c,
    ));
    lines.push(describe_band(
        "Humidity",
        conditions.humidity_pct,
        "%",
        &envelope.humidity_pct,
    ));
    lines.push(describe_band(
        "Soil moisture",
        conditions.soil_moisture_pct,
        "%",
        &envelope.soil_moisture_pct,
    ));

    let chance = conditions.precipitation_probability_pct;
    let rain = match (rain_preference, conditions.rain_expected()) {
        (None, _) => format!("Rain chance {:.0}%, crop is not sensitive to rain", chance),
        (Some(true), true) => format!("Rain likely ({:.0}%), which this crop welcomes", chance),
        (Some(true), false) => format!("Rain unlikely ({:.0}%), crop prefers wet spells", chance),
        (Some(false), false) => format!("Dry outlook ({:.0}% rain), which this crop prefers", chance),
        (Some(false), true) => format!("Rain likely ({:.0}%), crop prefers dry weather", chance),
    };
    lines.push(rain);

    lines
}

fn describe_band(label: &str, value: f64, unit: &str, band: &Band) -> String {
    let placement = if band.contains(value) {
        "within"
    } else if value < band.low {
        "below"
    } else {
        "above"
    };
    format!(
        "{} {:.1}{} is {} the {}{} range",
        label, value, unit, placement, band, unit
    )
}
