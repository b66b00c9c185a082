//! Soil moisture advisory text and the humidity-based estimate used when no
//! measured moisture is available.

pub fn soil_advice(moisture_pct: f64, precipitation_mm: f64) -> String {
    let advice = if moisture_pct < 20.0 {
        if precipitation_mm > 5.0 {
            "Soil is dry but rain expected. Monitor closely and prepare for irrigation if needed."
        } else {
            "Soil moisture critically low. Immediate irrigation recommended for optimal crop growth."
        }
    } else if moisture_pct < 40.0 {
        if precipitation_mm > 10.0 {
            "Moderate soil moisture with good rain forecast. No immediate irrigation needed."
        } else {
            "Soil moisture moderate. Consider light irrigation or wait for forecasted rain."
        }
    } else if moisture_pct < 60.0 {
        "Soil moisture is optimal for most crops. Good conditions for sowing and growth."
    } else {
        "High soil moisture detected. Avoid overwatering and ensure proper drainage."
    };
    advice.to_string()
}

fn in_coastal_belt(lat: f64, lon: f64) -> bool {
    let kerala = lat > 8.0 && lat < 13.0 && lon > 76.0 && lon < 78.0;
    let konkan = lat > 18.0 && lat < 20.0 && lon > 72.0 && lon < 74.0;
    kerala || konkan
}

/// Rough topsoil moisture (%) from humidity, region and month (1-indexed).
pub fn estimate_soil_moisture(lat: f64, lon: f64, humidity_pct: f64, month: u32) -> f64 {
    let mut moisture = humidity_pct * 0.6;

    if lat > 20.0 {
        moisture *= 0.8;
    } else if lat < 15.0 {
        moisture *= 1.2;
    }

    if in_coastal_belt(lat, lon) {
        moisture *= 1.3;
    }

    match month {
        7..=10 => moisture *= 1.4,
        4..=6 => moisture *= 0.7,
        _ => {}
    }

    moisture.clamp(15.0, 80.0)
}
