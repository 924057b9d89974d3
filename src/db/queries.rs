use crate::db::Database;
use crate::error::{FarmOpsError, Result};
use crate::models::{ConditionsSnapshot, FarmProfile, FieldOperation, OperationType, SprayType};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

// Farm Profile Queries

impl Database {
    pub fn create_farm_profile(&self, profile: &FarmProfile) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO farm_profiles
                    (name, latitude, longitude, area_hectares, default_spray_type, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    profile.name,
                    profile.latitude,
                    profile.longitude,
                    profile.area_hectares,
                    format!("{:?}", profile.default_spray_type),
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_default_farm_profile(&self) -> Result<Option<FarmProfile>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM farm_profiles ORDER BY id LIMIT 1",
                [],
                row_to_farm_profile,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn update_farm_profile(&self, profile: &FarmProfile) -> Result<()> {
        let id = profile
            .id
            .ok_or_else(|| FarmOpsError::InvalidData("Profile has no ID".into()))?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                UPDATE farm_profiles SET
                    name = ?1, latitude = ?2, longitude = ?3, area_hectares = ?4,
                    default_spray_type = ?5, updated_at = ?6
                WHERE id = ?7
                "#,
                params![
                    profile.name,
                    profile.latitude,
                    profile.longitude,
                    profile.area_hectares,
                    format!("{:?}", profile.default_spray_type),
                    Utc::now().to_rfc3339(),
                    id,
                ],
            )?;
            Ok(())
        })
    }
}

fn row_to_farm_profile(row: &Row) -> rusqlite::Result<FarmProfile> {
    let spray_type_str: String = row.get("default_spray_type")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    let default_spray_type = SprayType::from_str(&spray_type_str).unwrap_or_else(|| {
        warn!(
            spray_type = %spray_type_str,
            "Unknown default_spray_type in database, defaulting to Herbicide"
        );
        SprayType::Herbicide
    });

    Ok(FarmProfile {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        area_hectares: row.get("area_hectares")?,
        default_spray_type,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

// Field Operation Queries

impl Database {
    pub fn create_field_operation(&self, operation: &FieldOperation) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO field_operations
                    (farm_profile_id, operation_type, product, operation_date,
                     area_hectares, cost, notes, wind_mph, temp_c, rain_percent, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    operation.farm_profile_id,
                    format!("{:?}", operation.operation_type),
                    operation.product,
                    operation.operation_date.format("%Y-%m-%d").to_string(),
                    operation.area_hectares,
                    operation.cost,
                    operation.notes,
                    operation.conditions.as_ref().and_then(|c| c.wind_mph),
                    operation.conditions.as_ref().and_then(|c| c.temp_c),
                    operation.conditions.as_ref().and_then(|c| c.rain_percent),
                    operation.created_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_operations_for_profile(&self, profile_id: i64) -> Result<Vec<FieldOperation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM field_operations WHERE farm_profile_id = ?1 ORDER BY operation_date DESC, id DESC",
            )?;
            let operations = stmt
                .query_map([profile_id], row_to_field_operation)?
                .filter_map(|r| r.ok())
                .collect();
            Ok(operations)
        })
    }

    pub fn delete_field_operation(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM field_operations WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(FarmOpsError::NotFound(format!("Field operation {}", id)));
            }
            Ok(())
        })
    }
}

fn row_to_field_operation(row: &Row) -> rusqlite::Result<FieldOperation> {
    let op_type_str: String = row.get("operation_type")?;
    let date_str: String = row.get("operation_date")?;
    let created_at_str: String = row.get("created_at")?;

    let wind_mph: Option<f64> = row.get("wind_mph")?;
    let temp_c: Option<f64> = row.get("temp_c")?;
    let rain_percent: Option<u8> = row.get("rain_percent")?;

    let conditions = if wind_mph.is_some() || temp_c.is_some() || rain_percent.is_some() {
        Some(ConditionsSnapshot {
            wind_mph,
            temp_c,
            rain_percent,
        })
    } else {
        None
    };

    let operation_type = OperationType::from_str(&op_type_str).unwrap_or_else(|| {
        warn!(
            operation_type = %op_type_str,
            "Unknown operation_type in database, defaulting to Other"
        );
        OperationType::Other
    });

    Ok(FieldOperation {
        id: Some(row.get("id")?),
        farm_profile_id: row.get("farm_profile_id")?,
        operation_type,
        product: row.get("product")?,
        operation_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| chrono::Local::now().date_naive()),
        area_hectares: row.get("area_hectares")?,
        cost: row.get("cost")?,
        notes: row.get("notes")?,
        conditions,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

// Settings Queries

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn farm_profile_create_and_read_back() {
        let db = test_db();
        assert!(db.get_default_farm_profile().unwrap().is_none());

        let profile = FarmProfile::new("River Bottom", 44.98, -93.27)
            .with_area(160.0)
            .with_default_spray_type(SprayType::Fungicide);
        let id = db.create_farm_profile(&profile).unwrap();
        assert!(id > 0);

        let loaded = db.get_default_farm_profile().unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.name, "River Bottom");
        assert_eq!(loaded.area_hectares, Some(160.0));
        assert_eq!(loaded.default_spray_type, SprayType::Fungicide);
    }

    #[test]
    fn farm_profile_update() {
        let db = test_db();
        let id = db
            .create_farm_profile(&FarmProfile::new("Old Name", 41.0, -93.0))
            .unwrap();

        let mut profile = db.get_default_farm_profile().unwrap().unwrap();
        profile.name = "New Name".to_string();
        profile.default_spray_type = SprayType::Insecticide;
        db.update_farm_profile(&profile).unwrap();

        let loaded = db.get_default_farm_profile().unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.name, "New Name");
        assert_eq!(loaded.default_spray_type, SprayType::Insecticide);
    }

    #[test]
    fn field_operations_round_trip_with_conditions() {
        let db = test_db();
        let profile_id = db.create_farm_profile(&FarmProfile::default()).unwrap();

        let operation = FieldOperation::new(
            profile_id,
            OperationType::Herbicide,
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        )
        .with_product("Glyphosate 360")
        .with_conditions(ConditionsSnapshot {
            wind_mph: Some(4.8),
            temp_c: Some(18.2),
            rain_percent: Some(3),
        });
        db.create_field_operation(&operation).unwrap();

        let operations = db.get_operations_for_profile(profile_id).unwrap();
        assert_eq!(operations.len(), 1);
        let loaded = &operations[0];
        assert_eq!(loaded.operation_type, OperationType::Herbicide);
        assert_eq!(loaded.product, Some("Glyphosate 360".to_string()));
        let conditions = loaded.conditions.as_ref().unwrap();
        assert_eq!(conditions.rain_percent, Some(3));
        assert!((conditions.wind_mph.unwrap() - 4.8).abs() < f64::EPSILON);
    }

    #[test]
    fn field_operations_listed_most_recent_first() {
        let db = test_db();
        let profile_id = db.create_farm_profile(&FarmProfile::default()).unwrap();

        for (day, op_type) in [
            (3, OperationType::Seeding),
            (9, OperationType::Fertilizer),
            (6, OperationType::Irrigation),
        ] {
            let op = FieldOperation::new(
                profile_id,
                op_type,
                NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            );
            db.create_field_operation(&op).unwrap();
        }

        let operations = db.get_operations_for_profile(profile_id).unwrap();
        let types: Vec<OperationType> = operations.iter().map(|o| o.operation_type).collect();
        assert_eq!(
            types,
            vec![
                OperationType::Fertilizer,
                OperationType::Irrigation,
                OperationType::Seeding
            ]
        );
    }

    #[test]
    fn field_operation_delete() {
        let db = test_db();
        let profile_id = db.create_farm_profile(&FarmProfile::default()).unwrap();
        let op = FieldOperation::new(
            profile_id,
            OperationType::Fuel,
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        );
        db.create_field_operation(&op).unwrap();

        let id = db.get_operations_for_profile(profile_id).unwrap()[0]
            .id
            .unwrap();
        db.delete_field_operation(id).unwrap();
        assert!(db.get_operations_for_profile(profile_id).unwrap().is_empty());
        assert!(db.delete_field_operation(id).is_err());
    }

    #[test]
    fn settings_set_and_overwrite() {
        let db = test_db();
        assert!(db.get_setting("spray_type").unwrap().is_none());

        db.set_setting("spray_type", "herbicide").unwrap();
        assert_eq!(
            db.get_setting("spray_type").unwrap(),
            Some("herbicide".to_string())
        );

        db.set_setting("spray_type", "fungicide").unwrap();
        assert_eq!(
            db.get_setting("spray_type").unwrap(),
            Some("fungicide".to_string())
        );
    }
}
