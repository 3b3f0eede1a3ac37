use crate::entities::{BillStatus, bill_entity as bills};
use crate::models::{PickupResponse, UserSummary};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillResponse {
    pub id: Uuid,
    pub pickup_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub status: BillStatus,
    pub paid_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<PickupResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl From<bills::Model> for BillResponse {
    fn from(b: bills::Model) -> Self {
        Self {
            id: b.id,
            pickup_id: b.pickup_id,
            user_id: b.user_id,
            amount: b.amount,
            status: b.status,
            paid_date: b.paid_date,
            created_at: b.created_at,
            pickup: None,
            user: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct BillQuery {
    pub status: Option<BillStatus>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateBillRequest {
    pub status: BillStatus,
}
