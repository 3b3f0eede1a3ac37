use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pickup_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickupStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SCHEDULED")]
    Scheduled,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl std::fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickupStatus::Pending => write!(f, "PENDING"),
            PickupStatus::Scheduled => write!(f, "SCHEDULED"),
            PickupStatus::Completed => write!(f, "COMPLETED"),
            PickupStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl PickupStatus {
    /// A courier can still be (re)assigned.
    pub fn is_assignable(self) -> bool {
        matches!(self, PickupStatus::Pending | PickupStatus::Scheduled)
    }

    pub fn is_cancellable(self) -> bool {
        matches!(self, PickupStatus::Pending | PickupStatus::Scheduled)
    }
}

/// Oil collection visit.
/// - volume: planned liters given when the pickup is requested
/// - actual_volume: liters weighed on completion, overrides `volume` everywhere once set
/// - total_price / courier_fee / affiliate_fee: derived on completion from the settings rates
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pickups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub status: PickupStatus,
    pub scheduled_date: DateTime<Utc>,
    pub actual_date: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub volume: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub actual_volume: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub courier_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub affiliate_fee: Decimal,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Liters that count for money: the weighed volume when known, else the planned one.
    pub fn effective_volume(&self) -> Decimal {
        self.actual_volume.unwrap_or(self.volume)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
