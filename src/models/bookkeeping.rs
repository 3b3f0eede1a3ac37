use crate::models::{BillResponse, CommissionResponse, OtherExpenseResponse, PickupResponse};
use crate::utils::{DateRange, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct BookkeepingQuery {
    pub period: Option<Period>,
    /// Used when `period` is `custom` (or absent while both dates are given)
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookkeepingSummary {
    pub revenue: Decimal,
    pub total_volume: Decimal,
    pub customer_payments: Decimal,
    pub commissions: Decimal,
    pub investor_fee: Decimal,
    pub other_expenses: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub selling_price_per_liter: Decimal,
    pub investor_fee_per_liter: Decimal,
}

impl BookkeepingQuery {
    /// An explicit period wins; otherwise two dates mean a custom range.
    pub fn effective_period(&self) -> Period {
        match (self.period, &self.start_date, &self.end_date) {
            (Some(period), _, _) => period,
            (None, Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => Period::Custom,
            _ => Period::default(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookkeepingReport {
    pub period: DateRange,
    pub summary: BookkeepingSummary,
    pub pickups: Vec<PickupResponse>,
    pub bills: Vec<BillResponse>,
    pub commissions: Vec<CommissionResponse>,
    pub other_expenses: Vec<OtherExpenseResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessQuery {
    #[schema(example = "/admin/pembukuan")]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_period() {
        let q: BookkeepingQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.effective_period(), Period::ThisMonth);

        let q: BookkeepingQuery =
            serde_json::from_str(r#"{"startDate":"2025-01-01","endDate":"2025-01-31"}"#).unwrap();
        assert_eq!(q.effective_period(), Period::Custom);

        let q: BookkeepingQuery = serde_json::from_str(
            r#"{"period":"last_month","start_date":"2025-01-01","end_date":"2025-01-31"}"#,
        )
        .unwrap();
        assert_eq!(q.effective_period(), Period::LastMonth);
    }
}
