use crate::entities::other_expense_entity as other_expenses;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtherExpenseResponse {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<other_expenses::Model> for OtherExpenseResponse {
    fn from(e: other_expenses::Model) -> Self {
        Self {
            id: e.id,
            description: e.description,
            amount: e.amount,
            date: e.date,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OtherExpenseQuery {
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

/// Body of both create and update. The form posts the amount as text, so a
/// numeric string is accepted as well as a number.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OtherExpenseRequest {
    #[schema(example = "Beli jerigen")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    /// YYYY-MM-DD or RFC 3339; defaults to now on create, unchanged on update
    pub date: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(Decimal),
    Text(String),
}

/// `25000`, `25000.5` and `"25000"` all parse; an empty string is treated as absent.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(t)) if t.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(t)) => Decimal::from_str(t.trim())
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid amount '{t}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_forms() {
        let parse = |body: &str| serde_json::from_str::<OtherExpenseRequest>(body).unwrap().amount;
        assert_eq!(parse(r#"{"amount": 25000}"#), Some(dec!(25000)));
        assert_eq!(parse(r#"{"amount": "12500.50"}"#), Some(dec!(12500.50)));
        assert_eq!(parse(r#"{"amount": ""}"#), None);
        assert_eq!(parse(r#"{"amount": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
        assert!(serde_json::from_str::<OtherExpenseRequest>(r#"{"amount": "abc"}"#).is_err());
    }
}
