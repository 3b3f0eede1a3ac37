use crate::entities::{CommissionStatus, CommissionType, commission_entity as commissions};
use crate::models::{PickupResponse, UserSummary};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommissionResponse {
    pub id: Uuid,
    pub pickup_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub commission_type: CommissionType,
    pub amount: Decimal,
    pub status: CommissionStatus,
    pub paid_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<PickupResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl From<commissions::Model> for CommissionResponse {
    fn from(c: commissions::Model) -> Self {
        Self {
            id: c.id,
            pickup_id: c.pickup_id,
            user_id: c.user_id,
            commission_type: c.commission_type,
            amount: c.amount,
            status: c.status,
            paid_date: c.paid_date,
            created_at: c.created_at,
            pickup: None,
            user: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CommissionQuery {
    pub status: Option<CommissionStatus>,
    #[serde(rename = "type")]
    pub commission_type: Option<CommissionType>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommissionRequest {
    pub status: CommissionStatus,
}
