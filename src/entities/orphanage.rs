use rust_decimal::RoundingStrategy;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fractional digits kept for `latitude` and `longitude` (`DECIMAL(10, 2)`).
pub const COORDINATE_SCALE: u32 = 2;

/// Rounds to [`COORDINATE_SCALE`] digits, half away from zero like SQL `NUMERIC`.
pub fn round_coordinate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(COORDINATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize, ToSchema)]
#[sea_orm(table_name = "orphanages")]
#[schema(as = Orphanage)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = -27.21)]
    pub latitude: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = -49.64)]
    pub longitude: Decimal,
    #[sea_orm(column_type = "Text")]
    pub about: String,
    #[sea_orm(column_type = "Text")]
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Normalizes coordinates to the stored scale. Backends without a native
    /// decimal type (SQLite) hand them back through `f64`.
    pub fn with_stored_scale(mut self) -> Self {
        self.latitude = round_coordinate(self.latitude);
        self.longitude = round_coordinate(self.longitude);
        self
    }
}
