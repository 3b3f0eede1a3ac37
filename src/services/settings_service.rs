use crate::entities::settings_entity::{self as settings, SETTINGS_ROW_ID};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

pub const DEFAULT_SELLING_PRICE_PER_LITER: Decimal = Decimal::from_parts(8000, 0, 0, false, 0);
pub const DEFAULT_INVESTOR_FEE_PER_LITER: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
pub const DEFAULT_BUY_PRICE_PER_LITER: Decimal = Decimal::from_parts(6000, 0, 0, false, 0);
pub const DEFAULT_COURIER_FEE_PER_LITER: Decimal = Decimal::from_parts(300, 0, 0, false, 0);
pub const DEFAULT_AFFILIATE_FEE_PER_LITER: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Per-liter rates with defaults already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    pub selling_price_per_liter: Decimal,
    pub investor_fee_per_liter: Decimal,
    pub buy_price_per_liter: Decimal,
    pub courier_fee_per_liter: Decimal,
    pub affiliate_fee_per_liter: Decimal,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            selling_price_per_liter: DEFAULT_SELLING_PRICE_PER_LITER,
            investor_fee_per_liter: DEFAULT_INVESTOR_FEE_PER_LITER,
            buy_price_per_liter: DEFAULT_BUY_PRICE_PER_LITER,
            courier_fee_per_liter: DEFAULT_COURIER_FEE_PER_LITER,
            affiliate_fee_per_liter: DEFAULT_AFFILIATE_FEE_PER_LITER,
        }
    }
}

fn positive_or(value: Option<Decimal>, default: Decimal) -> Decimal {
    match value {
        Some(v) if v > Decimal::ZERO => v,
        _ => default,
    }
}

impl From<Option<&settings::Model>> for Rates {
    fn from(row: Option<&settings::Model>) -> Self {
        let d = Rates::default();
        let Some(row) = row else {
            return d;
        };
        Self {
            selling_price_per_liter: positive_or(
                row.selling_price_per_liter,
                d.selling_price_per_liter,
            ),
            investor_fee_per_liter: positive_or(
                row.investor_fee_per_liter,
                d.investor_fee_per_liter,
            ),
            buy_price_per_liter: positive_or(row.buy_price_per_liter, d.buy_price_per_liter),
            courier_fee_per_liter: positive_or(row.courier_fee_per_liter, d.courier_fee_per_liter),
            affiliate_fee_per_liter: positive_or(
                row.affiliate_fee_per_liter,
                d.affiliate_fee_per_liter,
            ),
        }
    }
}

/// Reads the settings row; a missing row means all defaults.
pub async fn load_rates<C>(db: &C) -> AppResult<Rates>
where
    C: ConnectionTrait,
{
    let row = settings::Entity::find_by_id(SETTINGS_ROW_ID).one(db).await?;
    Ok(Rates::from(row.as_ref()))
}

fn to_response(row: Option<&settings::Model>) -> SettingsResponse {
    let rates = Rates::from(row);
    SettingsResponse {
        selling_price_per_liter: rates.selling_price_per_liter,
        investor_fee_per_liter: rates.investor_fee_per_liter,
        buy_price_per_liter: rates.buy_price_per_liter,
        courier_fee_per_liter: rates.courier_fee_per_liter,
        affiliate_fee_per_liter: rates.affiliate_fee_per_liter,
        updated_at: row.map(|r| r.updated_at),
    }
}

pub struct SettingsService {
    pool: DatabaseConnection,
}

impl SettingsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> AppResult<SettingsResponse> {
        let row = settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?;
        Ok(to_response(row.as_ref()))
    }

    pub async fn update(&self, request: UpdateSettingsRequest) -> AppResult<SettingsResponse> {
        let fields = [
            request.selling_price_per_liter,
            request.investor_fee_per_liter,
            request.buy_price_per_liter,
            request.courier_fee_per_liter,
            request.affiliate_fee_per_liter,
        ];
        if fields.iter().flatten().any(|v| *v < Decimal::ZERO) {
            return Err(AppError::ValidationError(
                "Rates must not be negative".to_string(),
            ));
        }

        let existing = settings::Entity::find_by_id(SETTINGS_ROW_ID)
            .one(&self.pool)
            .await?;

        let is_new = existing.is_none();
        let mut model = match existing {
            Some(row) => settings::ActiveModel::from(row),
            None => settings::ActiveModel {
                id: Set(SETTINGS_ROW_ID),
                selling_price_per_liter: Set(None),
                investor_fee_per_liter: Set(None),
                buy_price_per_liter: Set(None),
                courier_fee_per_liter: Set(None),
                affiliate_fee_per_liter: Set(None),
                updated_at: Set(Utc::now()),
            },
        };

        if let Some(v) = request.selling_price_per_liter {
            model.selling_price_per_liter = Set(Some(v));
        }
        if let Some(v) = request.investor_fee_per_liter {
            model.investor_fee_per_liter = Set(Some(v));
        }
        if let Some(v) = request.buy_price_per_liter {
            model.buy_price_per_liter = Set(Some(v));
        }
        if let Some(v) = request.courier_fee_per_liter {
            model.courier_fee_per_liter = Set(Some(v));
        }
        if let Some(v) = request.affiliate_fee_per_liter {
            model.affiliate_fee_per_liter = Set(Some(v));
        }
        model.updated_at = Set(Utc::now());

        let saved = if is_new {
            model.insert(&self.pool).await?
        } else {
            model.update(&self.pool).await?
        };
        log::info!("Settings updated: {:?}", Rates::from(Some(&saved)));
        Ok(to_response(Some(&saved)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn stored(selling: Option<Decimal>, investor: Option<Decimal>) -> settings::Model {
        settings::Model {
            id: SETTINGS_ROW_ID,
            selling_price_per_liter: selling,
            investor_fee_per_liter: investor,
            buy_price_per_liter: None,
            courier_fee_per_liter: Some(dec!(350)),
            affiliate_fee_per_liter: Some(dec!(-5)),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_row_yields_defaults() {
        let rates = Rates::from(None::<&settings::Model>);
        assert_eq!(rates.selling_price_per_liter, dec!(8000));
        assert_eq!(rates.investor_fee_per_liter, dec!(500));
        assert_eq!(rates.buy_price_per_liter, dec!(6000));
        assert_eq!(rates.courier_fee_per_liter, dec!(300));
        assert_eq!(rates.affiliate_fee_per_liter, dec!(200));
    }

    #[test]
    fn test_unset_or_non_positive_values_fall_back() {
        let row = stored(Some(dec!(0)), Some(dec!(750)));
        let rates = Rates::from(Some(&row));
        assert_eq!(rates.selling_price_per_liter, dec!(8000));
        assert_eq!(rates.investor_fee_per_liter, dec!(750));
        assert_eq!(rates.buy_price_per_liter, dec!(6000));
        assert_eq!(rates.courier_fee_per_liter, dec!(350));
        assert_eq!(rates.affiliate_fee_per_liter, dec!(200));
    }

    #[actix_web::test]
    async fn test_update_rejects_negative_rate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = SettingsService::new(db);
        let err = service
            .update(UpdateSettingsRequest {
                buy_price_per_liter: Some(dec!(-1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn test_update_changes_only_given_fields() {
        let before = stored(Some(dec!(9000)), None);
        let after = settings::Model {
            investor_fee_per_liter: Some(dec!(600)),
            ..before.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![before], vec![after]])
            .into_connection();
        let service = SettingsService::new(db);

        let resp = service
            .update(UpdateSettingsRequest {
                investor_fee_per_liter: Some(dec!(600)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(resp.selling_price_per_liter, dec!(9000));
        assert_eq!(resp.investor_fee_per_liter, dec!(600));
    }
}
