use serde::{Deserialize, Serialize};

/// Chemical class being applied. Each class carries the wind thresholds
/// (in mph) that separate ideal from marginal from unsafe conditions:
/// fine droplets (herbicide) drift at lower wind speeds than coarse ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprayType {
    Herbicide,
    Fungicide,
    Insecticide,
}

impl SprayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprayType::Herbicide => "Herbicide",
            SprayType::Fungicide => "Fungicide",
            SprayType::Insecticide => "Insecticide",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "herbicide" => Some(SprayType::Herbicide),
            "fungicide" => Some(SprayType::Fungicide),
            "insecticide" => Some(SprayType::Insecticide),
            _ => None,
        }
    }

    /// Resolve a free-text label. Unknown labels fall back to the
    /// herbicide profile, the strictest of the three.
    pub fn from_label(s: &str) -> Self {
        Self::from_str(s).unwrap_or(SprayType::Herbicide)
    }

    pub fn all() -> &'static [SprayType] {
        &[
            SprayType::Herbicide,
            SprayType::Fungicide,
            SprayType::Insecticide,
        ]
    }

    /// Upper wind bound (mph) for ideal spraying conditions.
    pub fn perfect_max_mph(&self) -> f64 {
        match self {
            SprayType::Herbicide => 10.0,
            SprayType::Fungicide => 12.0,
            SprayType::Insecticide => 15.0,
        }
    }

    /// Upper wind bound (mph) for marginal-but-tolerable conditions.
    pub fn risky_max_mph(&self) -> f64 {
        match self {
            SprayType::Herbicide => 15.0,
            SprayType::Fungicide => 16.0,
            SprayType::Insecticide => 18.0,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SprayType::Herbicide => SprayType::Fungicide,
            SprayType::Fungicide => SprayType::Insecticide,
            SprayType::Insecticide => SprayType::Herbicide,
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            SprayType::Herbicide => Color::Yellow,
            SprayType::Fungicide => Color::Magenta,
            SprayType::Insecticide => Color::Red,
        }
    }
}

impl std::fmt::Display for SprayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spray-safety classification of a single 3-hour forecast interval.
/// Only Perfect and Risky intervals form windows; DontSpray and Night
/// terminate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprayStatus {
    Perfect,
    Risky,
    DontSpray,
    Night,
}

impl SprayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprayStatus::Perfect => "Perfect",
            SprayStatus::Risky => "Risky",
            SprayStatus::DontSpray => "Don't Spray",
            SprayStatus::Night => "Night",
        }
    }

    pub fn is_sprayable(&self) -> bool {
        matches!(self, SprayStatus::Perfect | SprayStatus::Risky)
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            SprayStatus::Perfect => Color::Green,
            SprayStatus::Risky => Color::Yellow,
            SprayStatus::DontSpray => Color::Red,
            SprayStatus::Night => Color::DarkGray,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SprayStatus::Perfect => "✓",
            SprayStatus::Risky => "~",
            SprayStatus::DontSpray => "✗",
            SprayStatus::Night => "·",
        }
    }
}

impl std::fmt::Display for SprayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spray_type_from_str_valid() {
        assert_eq!(
            SprayType::from_str("herbicide"),
            Some(SprayType::Herbicide)
        );
        assert_eq!(
            SprayType::from_str("Fungicide"),
            Some(SprayType::Fungicide)
        );
        assert_eq!(
            SprayType::from_str("INSECTICIDE"),
            Some(SprayType::Insecticide)
        );
    }

    #[test]
    fn spray_type_from_str_invalid() {
        assert_eq!(SprayType::from_str("fertilizer"), None);
        assert_eq!(SprayType::from_str(""), None);
    }

    #[test]
    fn spray_type_from_label_defaults_to_herbicide() {
        assert_eq!(SprayType::from_label("insecticide"), SprayType::Insecticide);
        assert_eq!(SprayType::from_label("mystery"), SprayType::Herbicide);
        assert_eq!(SprayType::from_label(""), SprayType::Herbicide);
    }

    #[test]
    fn spray_type_round_trip() {
        for spray_type in SprayType::all() {
            let debug_str = format!("{:?}", spray_type);
            assert_eq!(
                SprayType::from_str(&debug_str),
                Some(*spray_type),
                "Round-trip failed for {:?}",
                spray_type
            );
        }
    }

    #[test]
    fn spray_type_wind_thresholds_ordered() {
        for spray_type in SprayType::all() {
            assert!(
                spray_type.perfect_max_mph() < spray_type.risky_max_mph(),
                "{:?} thresholds out of order",
                spray_type
            );
        }
        // Herbicide is the strictest profile
        assert_eq!(SprayType::Herbicide.perfect_max_mph(), 10.0);
        assert_eq!(SprayType::Herbicide.risky_max_mph(), 15.0);
        assert_eq!(SprayType::Insecticide.perfect_max_mph(), 15.0);
        assert_eq!(SprayType::Insecticide.risky_max_mph(), 18.0);
    }

    #[test]
    fn spray_type_next_cycles() {
        let mut t = SprayType::Herbicide;
        t = t.next();
        assert_eq!(t, SprayType::Fungicide);
        t = t.next();
        assert_eq!(t, SprayType::Insecticide);
        t = t.next();
        assert_eq!(t, SprayType::Herbicide);
    }

    #[test]
    fn spray_status_sprayable() {
        assert!(SprayStatus::Perfect.is_sprayable());
        assert!(SprayStatus::Risky.is_sprayable());
        assert!(!SprayStatus::DontSpray.is_sprayable());
        assert!(!SprayStatus::Night.is_sprayable());
    }
}
