//! # Orphanage Repository
//!
//! Validation of raw submissions and CRUD access to the `orphanages` table.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryOrder, Set,
};
use std::str::FromStr;

use crate::entities::orphanage::{self, round_coordinate};
use crate::entities::Orphanage;
use crate::error::{AppError, ValidationErrors};

/// Largest magnitude a `DECIMAL(10, 2)` column can hold, exclusive.
const COORDINATE_LIMIT: i64 = 100_000_000;

/// A submission exactly as it arrives over the wire: every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanageForm {
    pub name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub about: Option<String>,
    pub instructions: Option<String>,
    pub opening_hours: Option<String>,
    pub open_on_weekends: Option<String>,
}

/// A validated submission, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrphanage {
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub about: String,
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
}

impl OrphanageForm {
    /// Assigns a text field by its wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "name" => &mut self.name,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "about" => &mut self.about,
            "instructions" => &mut self.instructions,
            "opening_hours" => &mut self.opening_hours,
            "open_on_weekends" => &mut self.open_on_weekends,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Checks every field and collects all failures before giving up.
    pub fn validate(self) -> Result<NewOrphanage, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match self.name {
            Some(name) if !name.trim().is_empty() => Some(name),
            Some(_) => {
                errors.add("name", "must not be blank");
                None
            }
            None => {
                errors.add("name", "is required");
                None
            }
        };
        let latitude = parse_coordinate("latitude", self.latitude, &mut errors);
        let longitude = parse_coordinate("longitude", self.longitude, &mut errors);
        let about = required_text("about", self.about, &mut errors);
        let instructions = required_text("instructions", self.instructions, &mut errors);
        let opening_hours = required_text("opening_hours", self.opening_hours, &mut errors);
        let open_on_weekends = match self.open_on_weekends {
            None => Some(false),
            Some(raw) => {
                let parsed = parse_flag(&raw);
                if parsed.is_none() {
                    errors.add("open_on_weekends", "must be true or false");
                }
                parsed
            }
        };

        match (
            name,
            latitude,
            longitude,
            about,
            instructions,
            opening_hours,
            open_on_weekends,
        ) {
            (
                Some(name),
                Some(latitude),
                Some(longitude),
                Some(about),
                Some(instructions),
                Some(opening_hours),
                Some(open_on_weekends),
            ) if errors.is_empty() => Ok(NewOrphanage {
                name,
                latitude,
                longitude,
                about,
                instructions,
                opening_hours,
                open_on_weekends,
            }),
            _ => Err(errors),
        }
    }
}

fn required_text(
    field: &str,
    value: Option<String>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    if value.is_none() {
        errors.add(field, "is required");
    }
    value
}

fn parse_coordinate(
    field: &str,
    value: Option<String>,
    errors: &mut ValidationErrors,
) -> Option<Decimal> {
    let Some(raw) = value else {
        errors.add(field, "is required");
        return None;
    };

    let raw = raw.trim();
    let parsed = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(round_coordinate);
    match parsed {
        Ok(value) if value.abs() < Decimal::from(COORDINATE_LIMIT) => Some(value),
        Ok(_) => {
            errors.add(field, "is out of range");
            None
        }
        Err(_) => {
            errors.add(field, "must be a decimal number");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Repository for orphanage rows. Owns the row lifecycle.
pub struct OrphanageRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrphanageRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates the submission and persists it, returning the stored record.
    pub async fn insert(&self, form: OrphanageForm) -> Result<orphanage::Model, AppError> {
        let new = form.validate()?;
        self.create(new).await
    }

    /// Persists an already validated record.
    pub async fn create(&self, new: NewOrphanage) -> Result<orphanage::Model, AppError> {
        let row = orphanage::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            about: Set(new.about),
            instructions: Set(new.instructions),
            opening_hours: Set(new.opening_hours),
            open_on_weekends: Set(new.open_on_weekends),
        };

        let model = row.insert(self.db).await?;
        tracing::info!(id = model.id, name = %model.name, "Orphanage created");
        Ok(model.with_stored_scale())
    }

    /// Every row, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<orphanage::Model>, AppError> {
        let rows = Orphanage::find()
            .order_by_asc(orphanage::Column::Id)
            .all(self.db)
            .await?;
        Ok(rows.into_iter().map(orphanage::Model::with_stored_scale).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<orphanage::Model, AppError> {
        Orphanage::find_by_id(id)
            .one(self.db)
            .await?
            .map(orphanage::Model::with_stored_scale)
            .ok_or_else(|| AppError::NotFound(format!("Orphanage {} not found", id)))
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(Orphanage::find().count(self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn lar_feliz() -> OrphanageForm {
        OrphanageForm {
            name: Some("Lar Feliz".to_string()),
            latitude: Some("-27.21".to_string()),
            longitude: Some("-49.64".to_string()),
            about: Some("Casa de acolhimento".to_string()),
            instructions: Some("bring ID".to_string()),
            opening_hours: Some("08:00-18:00".to_string()),
            open_on_weekends: Some("true".to_string()),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let new = lar_feliz().validate().unwrap();
        assert_eq!(new.name, "Lar Feliz");
        assert_eq!(new.latitude, Decimal::new(-2721, 2));
        assert_eq!(new.longitude, Decimal::new(-4964, 2));
        assert!(new.open_on_weekends);
    }

    #[test]
    fn test_validate_rounds_coordinates_to_two_digits() {
        let form = OrphanageForm {
            latitude: Some("-27.2092052".to_string()),
            longitude: Some("-49.6401092".to_string()),
            ..lar_feliz()
        };
        let new = form.validate().unwrap();
        assert_eq!(new.latitude, Decimal::new(-2721, 2));
        assert_eq!(new.longitude, Decimal::new(-4964, 2));
    }

    #[test]
    fn test_validate_defaults_open_on_weekends_to_false() {
        let form = OrphanageForm {
            open_on_weekends: None,
            ..lar_feliz()
        };
        assert!(!form.validate().unwrap().open_on_weekends);
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let form = OrphanageForm {
            name: Some("   ".to_string()),
            latitude: Some("north".to_string()),
            longitude: None,
            open_on_weekends: Some("sometimes".to_string()),
            ..lar_feliz()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("must not be blank"));
        assert_eq!(errors.get("latitude"), Some("must be a decimal number"));
        assert_eq!(errors.get("longitude"), Some("is required"));
        assert_eq!(errors.get("open_on_weekends"), Some("must be true or false"));
        assert_eq!(errors.get("about"), None);
    }

    #[test]
    fn test_validate_rejects_coordinates_too_wide_for_column() {
        let form = OrphanageForm {
            latitude: Some("123456789".to_string()),
            ..lar_feliz()
        };
        assert_eq!(
            form.validate().unwrap_err().get("latitude"),
            Some("is out of range")
        );
    }

    #[test]
    fn test_validate_checks_range_after_rounding() {
        let form = OrphanageForm {
            latitude: Some("99999999.999".to_string()),
            longitude: Some("-99999999.994".to_string()),
            ..lar_feliz()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("latitude"), Some("is out of range"));
        assert_eq!(errors.get("longitude"), None);
    }

    #[test]
    fn test_validate_rounds_midpoints_away_from_zero() {
        let form = OrphanageForm {
            latitude: Some("0.125".to_string()),
            longitude: Some("-49.645".to_string()),
            ..lar_feliz()
        };
        let new = form.validate().unwrap();
        assert_eq!(new.latitude, Decimal::new(13, 2));
        assert_eq!(new.longitude, Decimal::new(-4965, 2));
    }

    #[test]
    fn test_validate_keeps_name_as_submitted() {
        let form = OrphanageForm {
            name: Some("  Lar Feliz ".to_string()),
            ..lar_feliz()
        };
        assert_eq!(form.validate().unwrap().name, "  Lar Feliz ");
    }

    #[test]
    fn test_set_field_ignores_unknown_names() {
        let mut form = OrphanageForm::default();
        assert!(form.set_field("name", "Lar".to_string()));
        assert!(!form.set_field("phone", "555".to_string()));
        assert_eq!(form.name.as_deref(), Some("Lar"));
    }

    #[tokio::test]
    async fn test_insert_then_list_adds_exactly_one_row() {
        let db = setup_db().await;
        let repo = OrphanageRepository::new(&db);

        let created = repo.insert(lar_feliz()).await.unwrap();
        assert!(created.id > 0);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all, vec![created.clone()]);
        assert_eq!(all[0].latitude, Decimal::new(-2721, 2));
        assert_eq!(all[0].opening_hours, "08:00-18:00");
    }

    #[tokio::test]
    async fn test_insert_missing_field_persists_nothing() {
        let db = setup_db().await;
        let repo = OrphanageRepository::new(&db);

        let form = OrphanageForm {
            name: None,
            ..lar_feliz()
        };
        let err = repo.insert(form).await.unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors.get("name"), Some("is required")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = setup_db().await;
        let repo = OrphanageRepository::new(&db);

        let created = repo.insert(lar_feliz()).await.unwrap();
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), created);

        match repo.get_by_id(created.id + 100).await {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_all_keeps_insertion_order() {
        let db = setup_db().await;
        let repo = OrphanageRepository::new(&db);

        for name in ["Primeiro", "Segundo", "Terceiro"] {
            let form = OrphanageForm {
                name: Some(name.to_string()),
                ..lar_feliz()
            };
            repo.insert(form).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["Primeiro", "Segundo", "Terceiro"]);
    }
}
