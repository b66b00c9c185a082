use serde::{Deserialize, Serialize};

/// Indian cropping seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Monsoon-sown, June to October.
    Kharif,
    /// Winter-sown, November to March.
    Rabi,
    /// Short summer catch crops, April to June.
    Zaid,
}

impl Season {
    /// Order used to pick a label when several seasons are active at once.
    pub const PREFERENCE: [Season; 3] = [Season::Kharif, Season::Zaid, Season::Rabi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
        }
    }

    /// Default label text, e.g. "Kharif season".
    pub fn label(&self) -> String {
        format!("{} season", self.as_str())
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Season tag attached to a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Kharif,
    Rabi,
    Zaid,
    Perennial,
}

impl CropType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Kharif => "Kharif",
            CropType::Rabi => "Rabi",
            CropType::Zaid => "Zaid",
            CropType::Perennial => "Perennial",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            CropType::Kharif => Color::Green,
            CropType::Rabi => Color::LightBlue,
            CropType::Zaid => Color::Yellow,
            CropType::Perennial => Color::Magenta,
        }
    }
}

impl From<Season> for CropType {
    fn from(season: Season) -> Self {
        match season {
            Season::Kharif => CropType::Kharif,
            Season::Rabi => CropType::Rabi,
            Season::Zaid => CropType::Zaid,
        }
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_order() {
        assert_eq!(
            Season::PREFERENCE,
            [Season::Kharif, Season::Zaid, Season::Rabi]
        );
    }

    #[test]
    fn crop_type_serializes_lowercase() {
        let json = serde_json::to_string(&CropType::Perennial).unwrap();
        assert_eq!(json, "\"perennial\"");
        assert_eq!(CropType::from(Season::Zaid), CropType::Zaid);
    }
}
