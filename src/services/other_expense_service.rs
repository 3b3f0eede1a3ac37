use crate::entities::other_expense_entity as other_expenses;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{DateRange, parse_datetime};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

const REQUIRED_FIELDS_MESSAGE: &str = "Keterangan dan nominal wajib diisi";

/// Description and a non-zero amount are both mandatory.
fn validate(request: &OtherExpenseRequest) -> AppResult<(String, Decimal)> {
    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let amount = request.amount.filter(|a| !a.is_zero());

    match (description, amount) {
        (Some(d), Some(a)) => Ok((d.to_string(), a)),
        _ => Err(AppError::ValidationError(REQUIRED_FIELDS_MESSAGE.to_string())),
    }
}

pub struct OtherExpenseService {
    pool: DatabaseConnection,
}

impl OtherExpenseService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &OtherExpenseQuery) -> AppResult<Vec<OtherExpenseResponse>> {
        let range = DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref())?;

        let mut select = other_expenses::Entity::find();
        if let Some(range) = range {
            select = select
                .filter(other_expenses::Column::Date.gte(range.starts_at()))
                .filter(other_expenses::Column::Date.lt(range.ends_before()));
        }

        let rows = select
            .order_by_desc(other_expenses::Column::Date)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(OtherExpenseResponse::from).collect())
    }

    pub async fn create(&self, request: OtherExpenseRequest) -> AppResult<OtherExpenseResponse> {
        let (description, amount) = validate(&request)?;
        let now = Utc::now();
        let date = match request.date.as_deref().filter(|d| !d.is_empty()) {
            Some(d) => parse_datetime(d)?,
            None => now,
        };

        let expense = other_expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(description),
            amount: Set(amount),
            date: Set(date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Other expense {} recorded: {}", expense.id, expense.amount);
        Ok(expense.into())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: OtherExpenseRequest,
    ) -> AppResult<OtherExpenseResponse> {
        let (description, amount) = validate(&request)?;
        let date = request
            .date
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(parse_datetime)
            .transpose()?;

        let mut model = other_expenses::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?
            .into_active_model();
        model.description = Set(description);
        model.amount = Set(amount);
        if let Some(date) = date {
            model.date = Set(date);
        }
        model.updated_at = Set(Utc::now());

        let expense = model.update(&self.pool).await?;
        Ok(expense.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let expense = other_expenses::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;
        expense.delete(&self.pool).await?;

        log::info!("Other expense {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn expense() -> other_expenses::Model {
        let now = Utc::now();
        other_expenses::Model {
            id: Uuid::new_v4(),
            description: "Beli jerigen".to_string(),
            amount: dec!(150000),
            date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_requires_description_and_amount() {
        let cases = [
            OtherExpenseRequest {
                description: Some("  ".to_string()),
                amount: Some(dec!(1000)),
                date: None,
            },
            OtherExpenseRequest {
                description: Some("Bensin".to_string()),
                amount: None,
                date: None,
            },
            OtherExpenseRequest {
                description: Some("Bensin".to_string()),
                amount: Some(dec!(0)),
                date: None,
            },
        ];
        for request in cases {
            let err = validate(&request).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(ref m) if m == REQUIRED_FIELDS_MESSAGE));
        }
    }

    #[test]
    fn test_amount_accepts_numeric_string() {
        let request: OtherExpenseRequest =
            serde_json::from_str(r#"{"description":"Bensin","amount":"25000"}"#).unwrap();
        assert_eq!(validate(&request).unwrap(), ("Bensin".to_string(), dec!(25000)));
    }

    #[actix_web::test]
    async fn test_delete_missing_expense() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<other_expenses::Model>::new()])
            .into_connection();
        let service = OtherExpenseService::new(db);

        let err = service.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_delete_existing_expense() {
        let row = expense();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = OtherExpenseService::new(db);

        assert!(service.delete(row.id).await.is_ok());
    }

    #[actix_web::test]
    async fn test_update_keeps_date_when_absent() {
        let row = expense();
        let updated = other_expenses::Model {
            description: "Beli jerigen besar".to_string(),
            amount: dec!(175000),
            ..row.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row.clone()], vec![updated]])
            .into_connection();
        let service = OtherExpenseService::new(db);

        let resp = service
            .update(
                row.id,
                OtherExpenseRequest {
                    description: Some("Beli jerigen besar".to_string()),
                    amount: Some(dec!(175000)),
                    date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.date, row.date);
        assert_eq!(resp.amount, dec!(175000));
    }
}
