use crate::entities::{PickupStatus, pickup_entity as pickups};
use crate::models::UserSummary;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PickupResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub status: PickupStatus,
    pub scheduled_date: DateTime<Utc>,
    pub actual_date: Option<DateTime<Utc>>,
    pub volume: Decimal,
    pub actual_volume: Option<Decimal>,
    pub total_price: Decimal,
    pub courier_fee: Decimal,
    pub affiliate_fee: Decimal,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier: Option<UserSummary>,
}

impl From<pickups::Model> for PickupResponse {
    fn from(p: pickups::Model) -> Self {
        Self {
            id: p.id,
            customer_id: p.customer_id,
            courier_id: p.courier_id,
            status: p.status,
            scheduled_date: p.scheduled_date,
            actual_date: p.actual_date,
            volume: p.volume,
            actual_volume: p.actual_volume,
            total_price: p.total_price,
            courier_fee: p.courier_fee,
            affiliate_fee: p.affiliate_fee,
            address: p.address,
            notes: p.notes,
            created_at: p.created_at,
            customer: None,
            courier: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PickupQuery {
    pub status: Option<PickupStatus>,
    /// YYYY-MM-DD, matched against the scheduled date
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePickupRequest {
    /// Required for ADMIN / WAREHOUSE, ignored for customers
    pub customer_id: Option<Uuid>,
    /// YYYY-MM-DD or RFC 3339
    #[schema(example = "2025-03-01")]
    pub scheduled_date: String,
    /// Planned liters
    pub volume: Decimal,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignCourierRequest {
    pub courier_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompletePickupRequest {
    /// Liters actually collected
    pub actual_volume: Decimal,
}
