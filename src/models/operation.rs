use crate::models::SprayType;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Herbicide,
    Fungicide,
    Insecticide,
    Fertilizer,
    Seeding,
    Irrigation,
    Fuel,
    Harvest,
    Other,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Herbicide => "Herbicide",
            OperationType::Fungicide => "Fungicide",
            OperationType::Insecticide => "Insecticide",
            OperationType::Fertilizer => "Fertilizer",
            OperationType::Seeding => "Seeding",
            OperationType::Irrigation => "Irrigation",
            OperationType::Fuel => "Fuel",
            OperationType::Harvest => "Harvest",
            OperationType::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "herbicide" => Some(OperationType::Herbicide),
            "fungicide" => Some(OperationType::Fungicide),
            "insecticide" => Some(OperationType::Insecticide),
            "fertilizer" => Some(OperationType::Fertilizer),
            "seeding" => Some(OperationType::Seeding),
            "irrigation" => Some(OperationType::Irrigation),
            "fuel" => Some(OperationType::Fuel),
            "harvest" => Some(OperationType::Harvest),
            "other" => Some(OperationType::Other),
            _ => None,
        }
    }

    pub fn all() -> &'static [OperationType] {
        &[
            OperationType::Herbicide,
            OperationType::Fungicide,
            OperationType::Insecticide,
            OperationType::Fertilizer,
            OperationType::Seeding,
            OperationType::Irrigation,
            OperationType::Fuel,
            OperationType::Harvest,
            OperationType::Other,
        ]
    }

    /// Whether this operation applies an agrochemical and should carry a
    /// conditions snapshot when logged.
    pub fn is_spray(&self) -> bool {
        matches!(
            self,
            OperationType::Herbicide | OperationType::Fungicide | OperationType::Insecticide
        )
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            OperationType::Herbicide => Color::Yellow,
            OperationType::Fungicide => Color::Magenta,
            OperationType::Insecticide => Color::Red,
            OperationType::Fertilizer => Color::Green,
            OperationType::Seeding => Color::Cyan,
            OperationType::Irrigation => Color::Blue,
            OperationType::Fuel => Color::LightRed,
            OperationType::Harvest => Color::LightYellow,
            OperationType::Other => Color::Gray,
        }
    }
}

impl From<SprayType> for OperationType {
    fn from(spray_type: SprayType) -> Self {
        match spray_type {
            SprayType::Herbicide => OperationType::Herbicide,
            SprayType::Fungicide => OperationType::Fungicide,
            SprayType::Insecticide => OperationType::Insecticide,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forecast conditions captured at the time an operation was logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionsSnapshot {
    pub wind_mph: Option<f64>,
    pub temp_c: Option<f64>,
    pub rain_percent: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOperation {
    pub id: Option<i64>,
    pub farm_profile_id: i64,
    pub operation_type: OperationType,
    pub product: Option<String>,
    pub operation_date: NaiveDate,
    pub area_hectares: Option<f64>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub conditions: Option<ConditionsSnapshot>,
    pub created_at: chrono::DateTime<Utc>,
}

impl FieldOperation {
    pub fn new(farm_profile_id: i64, operation_type: OperationType, date: NaiveDate) -> Self {
        Self {
            id: None,
            farm_profile_id,
            operation_type,
            product: None,
            operation_date: date,
            area_hectares: None,
            cost: None,
            notes: None,
            conditions: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_product(mut self, product: &str) -> Self {
        self.product = Some(product.to_string());
        self
    }

    pub fn with_area(mut self, hectares: f64) -> Self {
        self.area_hectares = Some(hectares);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionsSnapshot) -> Self {
        self.conditions = Some(conditions);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_type_from_str_valid() {
        assert_eq!(
            OperationType::from_str("herbicide"),
            Some(OperationType::Herbicide)
        );
        assert_eq!(
            OperationType::from_str("Fertilizer"),
            Some(OperationType::Fertilizer)
        );
        assert_eq!(OperationType::from_str("FUEL"), Some(OperationType::Fuel));
    }

    #[test]
    fn operation_type_from_str_invalid() {
        assert_eq!(OperationType::from_str("unknown"), None);
        assert_eq!(OperationType::from_str(""), None);
    }

    #[test]
    fn operation_type_round_trip() {
        for op_type in OperationType::all() {
            let debug_str = format!("{:?}", op_type);
            assert_eq!(
                OperationType::from_str(&debug_str),
                Some(*op_type),
                "Round-trip failed for {:?}",
                op_type
            );
        }
    }

    #[test]
    fn operation_type_spray_classes() {
        assert!(OperationType::Herbicide.is_spray());
        assert!(OperationType::Fungicide.is_spray());
        assert!(OperationType::Insecticide.is_spray());
        assert!(!OperationType::Fertilizer.is_spray());
        assert!(!OperationType::Fuel.is_spray());
    }

    #[test]
    fn operation_type_from_spray_type() {
        assert_eq!(
            OperationType::from(SprayType::Herbicide),
            OperationType::Herbicide
        );
        assert_eq!(
            OperationType::from(SprayType::Insecticide),
            OperationType::Insecticide
        );
    }

    #[test]
    fn field_operation_builder_pattern() {
        let op = FieldOperation::new(
            1,
            OperationType::Herbicide,
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        )
        .with_product("Glyphosate 360")
        .with_area(12.5)
        .with_cost(184.0)
        .with_notes("North field");

        assert_eq!(op.farm_profile_id, 1);
        assert_eq!(op.operation_type, OperationType::Herbicide);
        assert_eq!(op.product, Some("Glyphosate 360".to_string()));
        assert_eq!(op.area_hectares, Some(12.5));
        assert_eq!(op.cost, Some(184.0));
        assert_eq!(op.notes, Some("North field".to_string()));
        assert!(op.conditions.is_none());
    }
}
