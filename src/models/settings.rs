use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Effective per-liter rates (defaults already applied).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub selling_price_per_liter: Decimal,
    pub investor_fee_per_liter: Decimal,
    pub buy_price_per_liter: Decimal,
    pub courier_fee_per_liter: Decimal,
    pub affiliate_fee_per_liter: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub selling_price_per_liter: Option<Decimal>,
    pub investor_fee_per_liter: Option<Decimal>,
    pub buy_price_per_liter: Option<Decimal>,
    pub courier_fee_per_liter: Option<Decimal>,
    pub affiliate_fee_per_liter: Option<Decimal>,
}
