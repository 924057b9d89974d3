use crate::models::SprayType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A farm with a fixed location used for forecast lookups and as the
/// parent record for logged field operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmProfile {
    pub id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub area_hectares: Option<f64>,
    pub default_spray_type: SprayType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FarmProfile {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.to_string(),
            latitude,
            longitude,
            area_hectares: None,
            default_spray_type: SprayType::Herbicide,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_area(mut self, hectares: f64) -> Self {
        self.area_hectares = Some(hectares);
        self
    }

    pub fn with_default_spray_type(mut self, spray_type: SprayType) -> Self {
        self.default_spray_type = spray_type;
        self
    }
}

impl Default for FarmProfile {
    fn default() -> Self {
        Self::new("Home Farm", 41.5868, -93.6250)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_profile_new_defaults() {
        let profile = FarmProfile::new("River Bottom", 44.98, -93.27);
        assert_eq!(profile.name, "River Bottom");
        assert!(profile.id.is_none());
        assert!(profile.area_hectares.is_none());
        assert_eq!(profile.default_spray_type, SprayType::Herbicide);
    }

    #[test]
    fn farm_profile_builder_pattern() {
        let profile = FarmProfile::new("River Bottom", 44.98, -93.27)
            .with_area(160.0)
            .with_default_spray_type(SprayType::Fungicide);
        assert_eq!(profile.area_hectares, Some(160.0));
        assert_eq!(profile.default_spray_type, SprayType::Fungicide);
    }
}
